//! Lecture Shapefile: géométries du `.shp`, système de référence du `.prj` voisin

use std::fs;
use std::io::{Cursor, ErrorKind};
use std::path::Path;

use geo::Geometry;
use shapefile::{Shape, ShapeReader};
use tracing::debug;

use crate::srs::SpatialRef;
use crate::types::{Feature, Layer};
use crate::GeofilterError;

/// Code de fichier en tête de tout `.shp` (9994, big endian)
pub const SHP_MAGIC: [u8; 4] = [0x00, 0x00, 0x27, 0x0a];

/// Lit toutes les formes d'un `.shp` déjà chargé en mémoire
pub fn read_layer(path: &Path, bytes: Vec<u8>, name: String) -> Result<Layer, GeofilterError> {
    let shapefile_error = |reason: String| GeofilterError::Shapefile {
        path: path.to_path_buf(),
        reason,
    };

    let srs = read_prj(path)?;
    let shapes = ShapeReader::new(Cursor::new(bytes))
        .and_then(|reader| reader.read())
        .map_err(|e| shapefile_error(e.to_string()))?;

    let mut features = Vec::with_capacity(shapes.len());
    for shape in shapes {
        // Enregistrement sans géométrie
        if matches!(shape, Shape::NullShape) {
            continue;
        }
        let geometry =
            Geometry::<f64>::try_from(shape).map_err(|e| shapefile_error(e.to_string()))?;
        features.push(Feature::new(geometry, srs));
    }

    Ok(Layer { name, features })
}

/// Système de référence du `.prj`; absent = coordonnées prises telles quelles
fn read_prj(path: &Path) -> Result<Option<SpatialRef>, GeofilterError> {
    let prj = path.with_extension("prj");
    match fs::read_to_string(&prj) {
        Ok(wkt) => SpatialRef::from_wkt(&wkt).map(Some),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No .prj next to the shapefile");
            Ok(None)
        }
        Err(source) => Err(GeofilterError::Open { path: prj, source }),
    }
}
