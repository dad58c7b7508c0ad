//! Lecture des datasets vectoriels servant de filtre spatial

pub mod geojson;
pub mod shp;
pub mod wkt;

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::types::Layer;
use crate::GeofilterError;

/// Formats de dataset reconnus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    GeoJson,
    Wkt,
    Shapefile,
}

impl DatasetFormat {
    /// Détermine le format depuis l'extension, sinon depuis le contenu
    pub fn detect(path: &Path, content: &[u8]) -> Result<Self, GeofilterError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("geojson") | Some("json") => Ok(Self::GeoJson),
            Some("wkt") | Some("ewkt") => Ok(Self::Wkt),
            Some("shp") => Ok(Self::Shapefile),
            _ => Self::sniff(content).ok_or_else(|| {
                GeofilterError::UnsupportedFormat(path.display().to_string())
            }),
        }
    }

    fn sniff(content: &[u8]) -> Option<Self> {
        if content.starts_with(&shp::SHP_MAGIC) {
            return Some(Self::Shapefile);
        }

        let first = std::str::from_utf8(content)
            .ok()?
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty() && !l.starts_with('#'))?;

        if first.starts_with('{') {
            return Some(Self::GeoJson);
        }

        let upper = first.to_ascii_uppercase();
        let body = upper.split_once(';').map_or(upper.as_str(), |(_, b)| b);
        const WKT_TYPES: [&str; 7] = [
            "POINT",
            "LINESTRING",
            "POLYGON",
            "MULTIPOINT",
            "MULTILINESTRING",
            "MULTIPOLYGON",
            "GEOMETRYCOLLECTION",
        ];
        WKT_TYPES
            .iter()
            .any(|t| body.trim_start().starts_with(t))
            .then_some(Self::Wkt)
    }
}

/// Dataset vectoriel ouvert
#[derive(Debug)]
pub struct Dataset {
    pub format: DatasetFormat,
    pub layers: Vec<Layer>,
}

impl Dataset {
    /// Ouvre et lit un dataset
    pub fn open(path: &Path) -> Result<Self, GeofilterError> {
        let open_error = |source| GeofilterError::Open {
            path: path.to_path_buf(),
            source,
        };
        let content = fs::read(path).map_err(open_error)?;

        let format = DatasetFormat::detect(path, &content)?;
        let layer_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("layer")
            .to_string();

        let layer = match format {
            DatasetFormat::Shapefile => shp::read_layer(path, content, layer_name)?,
            DatasetFormat::GeoJson | DatasetFormat::Wkt => {
                let text = String::from_utf8(content)
                    .map_err(|e| open_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;
                if format == DatasetFormat::GeoJson {
                    geojson::read_layer(path, &text, layer_name)?
                } else {
                    wkt::read_layer(path, &text, layer_name)?
                }
            }
        };

        debug!(
            path = %path.display(),
            format = ?format,
            features = layer.features.len(),
            "Dataset opened"
        );

        Ok(Self {
            format,
            layers: vec![layer],
        })
    }

    /// Première couche du dataset, les suivantes sont ignorées
    pub fn into_first_layer(self) -> Option<Layer> {
        if self.layers.len() > 1 {
            debug!(ignored = self.layers.len() - 1, "Only the first layer is used");
        }
        self.layers.into_iter().next()
    }
}
