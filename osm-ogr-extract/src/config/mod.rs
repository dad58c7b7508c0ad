//! Options d'extraction et table des valeurs par défaut
//!
//! `ExtractOptions::default()` est l'unique source des valeurs par défaut,
//! partagée par `osm_ogr_extract` et la CLI.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Format OGR de sortie par défaut
pub const DEFAULT_FORMAT_NAME: &str = "ESRI Shapefile";

/// Nom de la couche exportée par défaut
pub const DEFAULT_LAYER_NAME: &str = "export";

/// Stratégie `osmium extract` par défaut
pub const DEFAULT_STRATEGY: &str = "complete_ways";

/// Programme d'extraction
pub const DEFAULT_OSMIUM: &str = "osmium";

/// Programme de conversion OSM → OGR
pub const DEFAULT_CONVERTER: &str = "osm2ogr_with_tags";

/// Paramètres d'une extraction
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Dataset vectoriel servant de filtre spatial (Polygon / MultiPolygon)
    pub geofilter: Option<PathBuf>,

    /// Format OGR de sortie (voir `ogrinfo --formats`)
    pub format_name: String,

    /// Nom de la couche exportée
    pub layer_name: String,

    /// Ajouter un champ longueur (ways uniquement, en mètres)
    pub length: bool,

    /// Convertir les ways au lieu des nodes
    pub ways: bool,

    /// Tags exportés en colonnes
    pub tags: Vec<String>,

    /// Stratégie passée à `osmium extract -s`
    pub strategy: String,

    /// Répertoire de base du dossier temporaire
    pub tempdir: PathBuf,

    /// Programme d'extraction
    pub osmium: String,

    /// Programme de conversion
    pub converter: String,

    /// Passer `-p` (barre de progression) au programme de conversion
    pub progress: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            geofilter: None,
            format_name: DEFAULT_FORMAT_NAME.to_string(),
            layer_name: DEFAULT_LAYER_NAME.to_string(),
            length: false,
            ways: false,
            tags: Vec::new(),
            strategy: DEFAULT_STRATEGY.to_string(),
            tempdir: std::env::temp_dir(),
            osmium: DEFAULT_OSMIUM.to_string(),
            converter: DEFAULT_CONVERTER.to_string(),
            progress: true,
        }
    }
}

impl ExtractOptions {
    /// Charge des options depuis un fichier JSON (champs absents = défaut)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_json(&content)
            .context(format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse options JSON")
    }
}
