//! Systèmes de référence spatiale identifiés par leur code EPSG

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::GeofilterError;

/// Code EPSG du système de référence d'OSM (longitude/latitude WGS84)
pub const WGS84_EPSG: u32 = 4326;

/// Système de référence spatiale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpatialRef {
    /// Code EPSG
    pub epsg: u32,
}

impl SpatialRef {
    pub const fn from_epsg(epsg: u32) -> Self {
        Self { epsg }
    }

    pub const fn wgs84() -> Self {
        Self::from_epsg(WGS84_EPSG)
    }

    /// Compare deux systèmes (même code EPSG)
    pub fn is_same(&self, other: &SpatialRef) -> bool {
        self.epsg == other.epsg
    }
}

impl fmt::Display for SpatialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

fn epsg_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // EPSG:2154, urn:ogc:def:crs:EPSG::2154, urn:ogc:def:crs:EPSG:6.6:2154,
    // http://www.opengis.net/def/crs/EPSG/0/2154
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)EPSG[:/]+(?:[\d.]+[:/]+)?(\d+)$").expect("valid EPSG pattern")
    })
}

fn crs84_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)CRS:?84$").expect("valid CRS84 pattern"))
}

/// Autorité EPSG de l'élément racine d'un WKT (`AUTHORITY["EPSG","2154"]]`
/// en WKT1, `ID["EPSG",2154]]` en WKT2)
fn wkt_authority_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)(?:AUTHORITY|ID)\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]\s*\]\s*$"#)
            .expect("valid WKT authority pattern")
    })
}

fn wkt_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)^\s*(?:GEOGCS|PROJCS|GEOGCRS|PROJCRS)\[\s*"([^"]+)""#)
            .expect("valid WKT name pattern")
    })
}

/// Noms ESRI/OGC courants des `.prj` sans autorité
const KNOWN_WKT_NAMES: [(&str, u32); 8] = [
    ("GCS_WGS_1984", 4326),
    ("WGS 84", 4326),
    ("WGS_1984_Web_Mercator_Auxiliary_Sphere", 3857),
    ("WGS 84 / Pseudo-Mercator", 3857),
    ("GCS_RGF_1993", 4171),
    ("RGF93", 4171),
    ("RGF93_Lambert_93", 2154),
    ("RGF93 / Lambert-93", 2154),
];

impl SpatialRef {
    /// Identifie le système décrit par un WKT de CRS (contenu d'un `.prj`).
    pub fn from_wkt(wkt: &str) -> Result<Self, GeofilterError> {
        let wkt = wkt.trim();

        if let Some(epsg) = wkt_authority_pattern()
            .captures(wkt)
            .and_then(|caps| caps.get(1))
            .and_then(|code| code.as_str().parse().ok())
        {
            return Ok(Self::from_epsg(epsg));
        }

        wkt_name_pattern()
            .captures(wkt)
            .and_then(|caps| caps.get(1))
            .and_then(|name| {
                KNOWN_WKT_NAMES
                    .iter()
                    .find(|(known, _)| known.eq_ignore_ascii_case(name.as_str()))
            })
            .map(|(_, epsg)| Self::from_epsg(*epsg))
            .ok_or_else(|| GeofilterError::UnknownReference(wkt.to_string()))
    }
}

impl FromStr for SpatialRef {
    type Err = GeofilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // CRS84 = WGS84 en ordre longitude/latitude
        if crs84_pattern().is_match(s) {
            return Ok(Self::wgs84());
        }

        epsg_pattern()
            .captures(s)
            .and_then(|caps| caps.get(1))
            .and_then(|code| code.as_str().parse().ok())
            .map(Self::from_epsg)
            .ok_or_else(|| GeofilterError::UnknownReference(s.to_string()))
    }
}
