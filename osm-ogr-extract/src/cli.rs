//! Arguments de la ligne de commande
//!
//! Les options absentes de la ligne de commande gardent la valeur de
//! `--config` si fourni, sinon celle de `ExtractOptions::default()`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use osm_ogr_extract::config::{
    DEFAULT_CONVERTER, DEFAULT_FORMAT_NAME, DEFAULT_LAYER_NAME, DEFAULT_OSMIUM, DEFAULT_STRATEGY,
};
use osm_ogr_extract::ExtractOptions;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// OSM input file
    #[arg(value_name = "OSM_INPUT_FILE")]
    pub osm_input_file: PathBuf,

    /// OGR output file
    #[arg(value_name = "OGR_OUTPUT_FILE")]
    pub ogr_output_file: PathBuf,

    /// Vector dataset to use as a spatial filter. Geometry type must be polygon or multipolygon.
    #[arg(long, value_name = "FILE")]
    pub geofilter: Option<PathBuf>,

    #[arg(
        short = 'f',
        long = "format_name",
        value_name = "FORMAT",
        help = format!(
            "Output format. For a list of supported formats see the output of the \"ogrinfo --formats\" command [default: {}]",
            DEFAULT_FORMAT_NAME
        )
    )]
    pub format_name: Option<String>,

    #[arg(
        short = 'l',
        long = "layer_name",
        value_name = "NAME",
        help = format!("Layer name of the exported layer [default: {}]", DEFAULT_LAYER_NAME)
    )]
    pub layer_name: Option<String>,

    /// Add a field containing the length of features. Only applies when ways are exported. The units are meters.
    #[arg(long)]
    pub length: bool,

    /// Convert ways instead of nodes. Default is nodes.
    #[arg(short, long)]
    pub ways: bool,

    /// Tags to create columns for
    #[arg(short, long, value_name = "TAG", num_args = 1..)]
    pub tags: Option<Vec<String>>,

    #[arg(
        short,
        long,
        help = format!(
            "Strategy to create geographical extracts. See the \"osmium extract\" manual [default: {}]",
            DEFAULT_STRATEGY
        )
    )]
    pub strategy: Option<String>,

    /// Base directory for the temporary working directory [default: system temp dir]
    #[arg(long, value_name = "DIR")]
    pub tempdir: Option<PathBuf>,

    /// JSON file with extraction options; command-line flags take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "BIN",
        help = format!("Extraction program [default: {}]", DEFAULT_OSMIUM)
    )]
    pub osmium: Option<String>,

    #[arg(
        long,
        value_name = "BIN",
        help = format!("Conversion program [default: {}]", DEFAULT_CONVERTER)
    )]
    pub converter: Option<String>,

    /// Do not ask the conversion program for a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl ExtractArgs {
    /// Construit les options: défauts ← fichier `--config` ← ligne de commande
    pub fn to_options(&self) -> Result<ExtractOptions> {
        let mut options = match &self.config {
            Some(path) => ExtractOptions::load(path)?,
            None => ExtractOptions::default(),
        };
        self.apply(&mut options);
        Ok(options)
    }

    fn apply(&self, options: &mut ExtractOptions) {
        if let Some(geofilter) = &self.geofilter {
            options.geofilter = Some(geofilter.clone());
        }
        if let Some(format_name) = &self.format_name {
            options.format_name = format_name.clone();
        }
        if let Some(layer_name) = &self.layer_name {
            options.layer_name = layer_name.clone();
        }
        options.length |= self.length;
        options.ways |= self.ways;
        if let Some(tags) = &self.tags {
            options.tags = tags.clone();
        }
        if let Some(strategy) = &self.strategy {
            options.strategy = strategy.clone();
        }
        if let Some(tempdir) = &self.tempdir {
            options.tempdir = tempdir.clone();
        }
        if let Some(osmium) = &self.osmium {
            options.osmium = osmium.clone();
        }
        if let Some(converter) = &self.converter {
            options.converter = converter.clone();
        }
        if self.no_progress {
            options.progress = false;
        }
    }
}
