//! Orchestration: filtre spatial → `osmium extract` → conversion OGR

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::ExtractOptions;
use crate::convert::ConversionRequest;
use crate::osmium::{self, OsmiumConfig, CONFIG_FILE_NAME, EXTRACT_OUTPUT};
use crate::workdir::{TempDirGuard, WorkdirLock};

/// Convertit un fichier OSM vers un format OGR, avec extraction
/// géographique préalable si `options.geofilter` est fourni.
///
/// Les chemins relatifs sont résolus par rapport au répertoire courant à
/// l'appel, lu sous le verrou du répertoire courant: deux appels dans le même
/// process s'exécutent l'un après l'autre. Le répertoire courant est restauré
/// et le dossier temporaire supprimé à la sortie, y compris en cas d'erreur.
pub fn osm_ogr_extract(
    osm_input_file: &Path,
    ogr_output_file: &Path,
    options: &ExtractOptions,
) -> Result<()> {
    let lock = WorkdirLock::acquire();
    let former_workdir = lock.current_dir()?;
    let input = former_workdir.join(osm_input_file);
    let output = former_workdir.join(ogr_output_file);
    let geofilter = options.geofilter.as_ref().map(|p| former_workdir.join(p));
    let osmium_program = resolve_program(&former_workdir, &options.osmium);
    let converter_program = resolve_program(&former_workdir, &options.converter);

    info!(
        input = %input.display(),
        output = %output.display(),
        geofilter = ?geofilter,
        "Starting extraction"
    );

    let tdir = TempDirGuard::create(&former_workdir.join(&options.tempdir))?;
    let _cwd = lock.enter(tdir.path())?;

    let input = match geofilter {
        Some(filter) => extract_region(&filter, &input, tdir.path(), &osmium_program, options)?,
        None => input,
    };

    info!("Converting to vector format");
    ConversionRequest::new(input, output.clone(), options)
        .command(&converter_program)
        .run()
        .context("Conversion to vector format failed")?;

    info!(output = %output.display(), "Export complete");
    Ok(())
}

/// Agrège le filtre, écrit `cfg.json` et lance `osmium extract`.
/// Retourne le chemin du fichier extrait.
fn extract_region(
    filter: &Path,
    input: &Path,
    tdir: &Path,
    osmium_program: &str,
    options: &ExtractOptions,
) -> Result<PathBuf> {
    let area = geofilter::aggregate_file(filter)
        .context(format!("Failed to read spatial filter {}", filter.display()))?;

    if area.is_none() {
        info!(filter = %filter.display(), "Spatial filter has no area, extracting without polygon");
    }

    let config = OsmiumConfig::new(EXTRACT_OUTPUT, Some(tdir), area.as_ref());
    config.write(&tdir.join(CONFIG_FILE_NAME))?;
    debug!(config = %config.to_json()?, "Osmium config written");

    info!("Extracting region from the input data");
    osmium::extract_command(osmium_program, Path::new(CONFIG_FILE_NAME), input, &options.strategy)
        .run()
        .context("Extracting region from the input data failed")?;

    Ok(tdir.join(EXTRACT_OUTPUT))
}

/// Un programme donné par un chemin relatif (`./bin/osmium`) est résolu
/// avant le changement de répertoire; un nom nu reste cherché dans le PATH.
fn resolve_program(base: &Path, program: &str) -> String {
    let path = Path::new(program);
    if path.is_absolute() || path.components().count() < 2 {
        return program.to_string();
    }
    base.join(path).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_program() {
        let base = Path::new("/work");
        assert_eq!(resolve_program(base, "osmium"), "osmium");
        assert_eq!(resolve_program(base, "/usr/bin/osmium"), "/usr/bin/osmium");
        assert_eq!(resolve_program(base, "bin/osmium"), "/work/bin/osmium");
    }
}
