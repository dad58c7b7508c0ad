//! Point d'entrée CLI pour osm-ogr-extract

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::ExtractArgs;

/// Extract geographical subsets from an OSM-PBF file and export the data to a GIS format
#[derive(Parser)]
#[command(name = "osm-ogr-extract")]
#[command(author, version)]
#[command(about = "Extract geographical subsets from an OSM-PBF file and export the data to a GIS format.")]
#[command(long_about = "Extract geographical subsets from an OSM-PBF file and export the data to a GIS format.\n\nRequires the `osmium` and `osm2ogr_with_tags` command line tools.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    extract: ExtractArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let options = cli.extract.to_options()?;
    debug!(options = ?options, "Options resolved");

    osm_ogr_extract::osm_ogr_extract(
        &cli.extract.osm_input_file,
        &cli.extract.ogr_output_file,
        &options,
    )
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
