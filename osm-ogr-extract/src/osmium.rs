//! Configuration et ligne de commande de `osmium extract`

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geofilter::ExtractionArea;
use serde::{Deserialize, Serialize};

use crate::process::ToolCommand;

/// Nom du fichier de configuration dans le répertoire temporaire
pub const CONFIG_FILE_NAME: &str = "cfg.json";

/// Fichier produit par l'extraction, relatif à `directory`
pub const EXTRACT_OUTPUT: &str = "o.pbf";

/// Format natif d'osmium
pub const OUTPUT_FORMAT: &str = "pbf";

pub const DESCRIPTION: &str = "auto-extracted subset";

/// Document JSON lu par `osmium extract -c`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsmiumConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    pub extracts: Vec<ExtractSpec>,
}

/// Un extrait. osmium traite différemment `polygon` et `multipolygon`,
/// au plus une des deux clés est présente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractSpec {
    pub output: String,
    pub output_format: String,
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multipolygon: Option<serde_json::Value>,
}

impl ExtractSpec {
    pub fn new(output: impl Into<String>, area: Option<&ExtractionArea>) -> Self {
        let mut spec = Self {
            output: output.into(),
            output_format: OUTPUT_FORMAT.to_string(),
            description: DESCRIPTION.to_string(),
            polygon: None,
            multipolygon: None,
        };

        match area {
            Some(area @ ExtractionArea::Polygon(_)) => spec.polygon = Some(area.coordinates()),
            Some(area @ ExtractionArea::MultiPolygon(_)) => {
                spec.multipolygon = Some(area.coordinates())
            }
            None => {}
        }
        spec
    }
}

impl OsmiumConfig {
    /// Configuration à un seul extrait
    pub fn new(
        output: impl Into<String>,
        directory: Option<&Path>,
        area: Option<&ExtractionArea>,
    ) -> Self {
        Self {
            directory: directory.map(|d| d.to_string_lossy().into_owned()),
            extracts: vec![ExtractSpec::new(output, area)],
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize osmium config")
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)
            .context(format!("Failed to write osmium config: {}", path.display()))
    }
}

/// `<osmium> extract -c <config> <input> -s <strategy>`
pub fn extract_command(
    program: &str,
    config_file: &Path,
    input: &Path,
    strategy: &str,
) -> ToolCommand {
    ToolCommand::new(program)
        .arg("extract")
        .arg("-c")
        .arg(config_file)
        .arg(input)
        .arg("-s")
        .arg(strategy)
}
