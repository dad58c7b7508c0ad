//! Lecture WKT / EWKT: une géométrie par ligne, préfixe `SRID=n;` optionnel

use std::path::Path;

use geozero::wkt::Wkt;
use geozero::ToGeo;

use crate::srs::SpatialRef;
use crate::types::{Feature, Layer};
use crate::GeofilterError;

/// Lit toutes les géométries d'un fichier WKT
pub fn read_layer(path: &Path, content: &str, name: String) -> Result<Layer, GeofilterError> {
    let mut features = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let wkt_error = |reason: String| GeofilterError::Wkt {
            path: path.to_path_buf(),
            line: index + 1,
            reason,
        };

        let (srs, body) = split_srid(line).map_err(wkt_error)?;
        let geometry = Wkt(body).to_geo().map_err(|e| wkt_error(e.to_string()))?;

        features.push(Feature::new(geometry, srs));
    }

    Ok(Layer { name, features })
}

/// Sépare le préfixe EWKT `SRID=n;` du corps WKT
fn split_srid(line: &str) -> Result<(Option<SpatialRef>, &str), String> {
    let Some((prefix, body)) = line.split_once(';') else {
        return Ok((None, line));
    };

    let code = prefix
        .split_once('=')
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("SRID"))
        .map(|(_, code)| code)
        .ok_or_else(|| format!("invalid EWKT prefix '{}'", prefix))?;

    let epsg: u32 = code
        .trim()
        .parse()
        .map_err(|_| format!("invalid SRID '{}'", code))?;

    Ok((Some(SpatialRef::from_epsg(epsg)), body.trim()))
}
