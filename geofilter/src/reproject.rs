//! Reprojection des polygones avec PROJ
//!
//! `Reprojector` n'existe qu'avec le feature `reproject`; sans lui, toute
//! feature hors EPSG:4326 fait échouer l'agrégation.

use crate::srs::SpatialRef;
use crate::GeofilterError;

#[cfg(feature = "reproject")]
use geo::{Coord, LineString, Polygon};
#[cfg(feature = "reproject")]
use proj::Proj;

/// Système de référence cible, importé une fois avant l'agrégation
#[derive(Debug, Clone, Copy)]
pub struct TargetReference {
    srs: SpatialRef,
}

impl TargetReference {
    /// Importe le système cible depuis son code EPSG
    #[cfg(feature = "reproject")]
    pub fn import(epsg: u32) -> Result<Self, GeofilterError> {
        let srs = SpatialRef::from_epsg(epsg);
        Proj::new(&srs.to_string())
            .map_err(|e| GeofilterError::TargetReference(format!("{} ({})", srs, e)))?;
        Ok(Self { srs })
    }

    /// Sans PROJ, seul un code EPSG non nul est vérifié
    #[cfg(not(feature = "reproject"))]
    pub fn import(epsg: u32) -> Result<Self, GeofilterError> {
        if epsg == 0 {
            return Err(GeofilterError::TargetReference("EPSG:0".to_string()));
        }
        Ok(Self {
            srs: SpatialRef::from_epsg(epsg),
        })
    }

    pub fn srs(&self) -> SpatialRef {
        self.srs
    }
}

/// Reprojection de polygones vers un système cible
#[cfg(feature = "reproject")]
pub struct Reprojector {
    proj: Proj,
    source_epsg: u32,
}

#[cfg(feature = "reproject")]
impl Reprojector {
    /// Crée un nouveau reprojector entre deux EPSG
    pub fn new(source: SpatialRef, target: SpatialRef) -> Result<Self, GeofilterError> {
        let proj = Proj::new_known_crs(&source.to_string(), &target.to_string(), None)
            .map_err(|e| {
                GeofilterError::reprojection(
                    source.epsg,
                    format!("failed to create projection to {}: {}", target, e),
                )
            })?;

        Ok(Self {
            proj,
            source_epsg: source.epsg,
        })
    }

    /// Transforme un Polygon (extérieur et trous)
    pub fn transform_polygon(&self, p: &Polygon) -> Result<Polygon, GeofilterError> {
        let exterior = self.transform_linestring(p.exterior())?;
        let interiors = p
            .interiors()
            .iter()
            .map(|ls| self.transform_linestring(ls))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Polygon::new(exterior, interiors))
    }

    /// Transforme une LineString (batch conversion)
    fn transform_linestring(&self, ls: &LineString) -> Result<LineString, GeofilterError> {
        let mut coords: Vec<(f64, f64)> = ls.0.iter().map(|c| (c.x, c.y)).collect();

        self.proj
            .convert_array(&mut coords)
            .map_err(|e| GeofilterError::reprojection(self.source_epsg, e.to_string()))?;

        Ok(LineString::new(
            coords.into_iter().map(|(x, y)| Coord { x, y }).collect(),
        ))
    }
}
