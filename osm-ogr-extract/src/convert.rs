//! Requête de conversion OSM → OGR (`osm2ogr_with_tags`)

use std::path::PathBuf;

use crate::config::ExtractOptions;
use crate::process::ToolCommand;

/// Type d'objets OSM exportés
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeometryClass {
    /// Nodes → points (défaut)
    #[default]
    Nodes,
    /// Ways → lignes
    Ways,
}

/// Paramètres du programme de conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub geometry: GeometryClass,
    pub format_name: String,
    pub layer_name: String,
    pub length: bool,
    pub tags: Vec<String>,
    pub progress: bool,
}

impl ConversionRequest {
    pub fn new(input: PathBuf, output: PathBuf, options: &ExtractOptions) -> Self {
        Self {
            input,
            output,
            geometry: if options.ways {
                GeometryClass::Ways
            } else {
                GeometryClass::Nodes
            },
            format_name: options.format_name.clone(),
            layer_name: options.layer_name.clone(),
            length: options.length,
            tags: options.tags.clone(),
            progress: options.progress,
        }
    }

    /// `<converter> -i <input> -o <output> [-p] [--ways] [--length]
    /// [--format_name f] [--layer_name l] [--tag t]...`
    pub fn command(&self, program: &str) -> ToolCommand {
        let mut cmd = ToolCommand::new(program)
            .arg("-i")
            .arg(&self.input)
            .arg("-o")
            .arg(&self.output);

        if self.progress {
            cmd = cmd.arg("-p");
        }
        if self.geometry == GeometryClass::Ways {
            cmd = cmd.arg("--ways");
        }
        if self.length {
            cmd = cmd.arg("--length");
        }
        // Chaîne vide = laisser le défaut du programme
        if !self.format_name.is_empty() {
            cmd = cmd.arg("--format_name").arg(&self.format_name);
        }
        if !self.layer_name.is_empty() {
            cmd = cmd.arg("--layer_name").arg(&self.layer_name);
        }
        for tag in &self.tags {
            cmd = cmd.arg("--tag").arg(tag);
        }
        cmd
    }
}
