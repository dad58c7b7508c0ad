//! Types d'erreurs pour le crate geofilter

use std::path::PathBuf;

use thiserror::Error;

/// Erreurs pouvant survenir lors de l'agrégation d'un filtre spatial
#[derive(Debug, Error)]
pub enum GeofilterError {
    /// Erreur d'I/O lors de l'ouverture du dataset
    #[error("Could not open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// GeoJSON illisible
    #[error("Invalid GeoJSON in {path}: {source}")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },

    /// Ligne WKT illisible
    #[error("Invalid WKT in {path} at line {line}: {reason}")]
    Wkt {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Shapefile illisible
    #[error("Invalid shapefile {path}: {reason}")]
    Shapefile { path: PathBuf, reason: String },

    /// Format de fichier non reconnu
    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(String),

    /// Le dataset ne contient aucune couche
    #[error("Dataset {0} has no layer")]
    NoLayer(PathBuf),

    /// Type de géométrie autre que Polygon / MultiPolygon
    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometryType(String),

    /// Système de référence cible impossible à importer
    #[error("Could not import {0} spatial reference")]
    TargetReference(String),

    /// Système de référence source non reconnu
    #[error("Unknown spatial reference: {0}")]
    UnknownReference(String),

    /// Échec de reprojection
    #[error("Reprojection from EPSG:{source_epsg} failed: {reason}")]
    Reprojection { source_epsg: u32, reason: String },
}

impl GeofilterError {
    /// Crée une erreur de reprojection avec contexte
    pub fn reprojection(source_epsg: u32, reason: impl Into<String>) -> Self {
        Self::Reprojection {
            source_epsg,
            reason: reason.into(),
        }
    }

    /// Vrai pour les erreurs de lecture du dataset (ouverture, format)
    pub fn is_read_error(&self) -> bool {
        matches!(
            self,
            Self::Open { .. }
                | Self::GeoJson { .. }
                | Self::Wkt { .. }
                | Self::Shapefile { .. }
                | Self::UnsupportedFormat(_)
                | Self::NoLayer(_)
        )
    }
}
