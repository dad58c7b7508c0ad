//! Tests de bout en bout avec des outils externes factices (scripts shell)

#![cfg(unix)]

use std::env;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use tracing_subscriber::fmt::MakeWriter;

use geofilter::GeofilterError;
use osm_ogr_extract::workdir::WorkdirLock;
use osm_ogr_extract::{osm_ogr_extract, ExtractOptions, ProcessError};

/// Ces tests observent le répertoire courant du process
static TEST_LOCK: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Dossier de test isolé, avec outils factices et journal des appels
struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let root = env::temp_dir().join(format!("osm-extract-test-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(root.join("tmp")).unwrap();
        fs::create_dir_all(root.join("log")).unwrap();
        fs::write(root.join("in.osm.pbf"), b"fake pbf").unwrap();
        let root = root.canonicalize().unwrap();
        Self { root }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn log(&self, name: &str) -> PathBuf {
        self.root.join("log").join(name)
    }

    fn script(&self, name: &str, body: &str) -> String {
        let path = self.path(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    /// osmium factice: journalise ses arguments, son cwd et la config, crée o.pbf
    fn osmium(&self, exit_code: i32) -> String {
        let log = self.root.join("log");
        self.script(
            "osmium",
            &format!(
                "printf '%s\\n' \"$@\" > '{log}/osmium.args'\n\
                 pwd > '{log}/osmium.cwd'\n\
                 cp cfg.json '{log}/cfg.json'\n\
                 touch o.pbf\n\
                 exit {exit_code}",
                log = log.display(),
                exit_code = exit_code
            ),
        )
    }

    /// Convertisseur factice: journalise ses arguments et crée le fichier `-o`
    fn converter(&self, exit_code: i32) -> String {
        let log = self.root.join("log");
        self.script(
            "osm2ogr_with_tags",
            &format!(
                "printf '%s\\n' \"$@\" > '{log}/converter.args'\n\
                 out=''\n\
                 while [ $# -gt 0 ]; do\n\
                   if [ \"$1\" = '-o' ]; then out=\"$2\"; fi\n\
                   shift\n\
                 done\n\
                 touch \"$out\"\n\
                 exit {exit_code}",
                log = log.display(),
                exit_code = exit_code
            ),
        )
    }

    fn options(&self, osmium_exit: i32, converter_exit: i32) -> ExtractOptions {
        ExtractOptions {
            tempdir: self.path("tmp"),
            osmium: self.osmium(osmium_exit),
            converter: self.converter(converter_exit),
            ..Default::default()
        }
    }

    fn logged_args(&self, name: &str) -> Option<Vec<String>> {
        fs::read_to_string(self.log(name))
            .ok()
            .map(|s| s.lines().map(str::to_string).collect())
    }

    /// Le dossier temporaire doit avoir été supprimé
    fn assert_tempdir_cleaned(&self) {
        let leftovers: Vec<_> = fs::read_dir(self.path("tmp")).unwrap().collect();
        assert!(leftovers.is_empty(), "temporary directory left behind");
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.root).ok();
    }
}

/// Journal capturé en mémoire
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn write_filter(sandbox: &Sandbox, name: &str, content: &str) -> PathBuf {
    let path = sandbox.path(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_nodes_without_filter() {
    let _serial = serial();
    let sandbox = Sandbox::new();
    let options = sandbox.options(0, 0);
    let before = env::current_dir().unwrap();

    osm_ogr_extract(&sandbox.path("in.osm.pbf"), &sandbox.path("out.shp"), &options).unwrap();

    assert_eq!(env::current_dir().unwrap(), before);
    assert!(sandbox.path("out.shp").exists());
    assert!(sandbox.logged_args("osmium.args").is_none(), "osmium must not run");

    let args = sandbox.logged_args("converter.args").unwrap();
    let input = sandbox.path("in.osm.pbf").to_string_lossy().into_owned();
    let output = sandbox.path("out.shp").to_string_lossy().into_owned();
    assert_eq!(
        args,
        vec![
            "-i",
            input.as_str(),
            "-o",
            output.as_str(),
            "-p",
            "--format_name",
            "ESRI Shapefile",
            "--layer_name",
            "export",
        ]
    );
    assert!(!args.iter().any(|a| a == "--ways" || a == "--tag"));
    sandbox.assert_tempdir_cleaned();
}

#[test]
fn test_relative_paths_resolved_against_caller_directory() {
    let _serial = serial();
    let sandbox = Sandbox::new();
    let options = ExtractOptions {
        tempdir: PathBuf::from("tmp"),
        ..sandbox.options(0, 0)
    };

    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();

    let before = env::current_dir().unwrap();
    env::set_current_dir(&sandbox.root).unwrap();
    let result = tracing::subscriber::with_default(subscriber, || {
        osm_ogr_extract(Path::new("in.osm.pbf"), Path::new("out.shp"), &options)
    });
    let after = env::current_dir().unwrap();
    env::set_current_dir(&before).unwrap();

    result.unwrap();
    assert_eq!(after, sandbox.root);

    // Le journal de fin donne le chemin de sortie résolu
    let output_field = format!("output={}", sandbox.path("out.shp").display());
    let lines = logs.lines();
    let complete = lines
        .iter()
        .find(|l| l.contains("Export complete"))
        .expect("completion logged");
    assert!(complete.contains(&output_field), "{complete}");

    let args = sandbox.logged_args("converter.args").unwrap();
    assert_eq!(args[1], sandbox.path("in.osm.pbf").to_string_lossy());
    assert_eq!(args[3], sandbox.path("out.shp").to_string_lossy());
    assert!(sandbox.path("out.shp").exists());
    sandbox.assert_tempdir_cleaned();
}

#[test]
fn test_relative_paths_wait_for_concurrent_directory_change() {
    let _serial = serial();
    let sandbox = Sandbox::new();
    let elsewhere = sandbox.path("elsewhere");
    fs::create_dir(&elsewhere).unwrap();
    let options = ExtractOptions {
        tempdir: PathBuf::from("tmp"),
        ..sandbox.options(0, 0)
    };

    let before = env::current_dir().unwrap();
    env::set_current_dir(&sandbox.root).unwrap();

    // Une autre extraction du process occupe le répertoire courant
    let lock = WorkdirLock::acquire();
    let cwd = lock.enter(&elsewhere).unwrap();
    let worker = thread::spawn(move || {
        osm_ogr_extract(Path::new("in.osm.pbf"), Path::new("out.shp"), &options)
    });
    thread::sleep(Duration::from_millis(200));
    drop(cwd);
    drop(lock);

    let result = worker.join().unwrap();
    let after = env::current_dir().unwrap();
    env::set_current_dir(&before).unwrap();

    result.unwrap();
    assert_eq!(after, sandbox.root);

    let args = sandbox.logged_args("converter.args").unwrap();
    assert_eq!(args[1], sandbox.path("in.osm.pbf").to_string_lossy());
    assert_eq!(args[3], sandbox.path("out.shp").to_string_lossy());
    assert!(sandbox.path("out.shp").exists());
    assert!(fs::read_dir(&elsewhere).unwrap().next().is_none());
    sandbox.assert_tempdir_cleaned();
}

#[test]
fn test_filter_with_two_disjoint_parts() {
    let _serial = serial();
    let sandbox = Sandbox::new();
    let filter = write_filter(
        &sandbox,
        "zone.geojson",
        r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[8.0, 48.0], [8.1, 48.0], [8.1, 48.1], [8.0, 48.1], [8.0, 48.0]]],
                    [[[9.0, 49.0], [9.1, 49.0], [9.1, 49.1], [9.0, 49.1], [9.0, 49.0]]]
                 ]}}
            ]
        }"#,
    );
    let options = ExtractOptions {
        geofilter: Some(filter),
        strategy: "bbox".to_string(),
        ways: true,
        tags: vec!["highway".to_string()],
        ..sandbox.options(0, 0)
    };
    let before = env::current_dir().unwrap();

    osm_ogr_extract(&sandbox.path("in.osm.pbf"), &sandbox.path("roads.shp"), &options).unwrap();

    assert_eq!(env::current_dir().unwrap(), before);

    // osmium extract -c cfg.json <input> -s bbox
    let osmium_args = sandbox.logged_args("osmium.args").unwrap();
    let input = sandbox.path("in.osm.pbf").to_string_lossy().into_owned();
    assert_eq!(
        osmium_args,
        vec!["extract", "-c", "cfg.json", input.as_str(), "-s", "bbox"]
    );

    // osmium tourne dans le dossier temporaire déclaré dans la config
    let cwd = fs::read_to_string(sandbox.log("osmium.cwd")).unwrap();
    let config: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(sandbox.log("cfg.json")).unwrap()).unwrap();
    let directory = config["directory"].as_str().unwrap();
    assert_eq!(cwd.trim(), directory);
    assert!(Path::new(directory).starts_with(sandbox.path("tmp")));

    let extract = &config["extracts"][0];
    assert_eq!(extract["output"], "o.pbf");
    assert_eq!(extract["output_format"], "pbf");
    assert!(extract.get("polygon").is_none());
    assert_eq!(extract["multipolygon"].as_array().unwrap().len(), 2);

    // La conversion lit le fichier extrait
    let converter_args = sandbox.logged_args("converter.args").unwrap();
    assert_eq!(
        converter_args[1],
        Path::new(directory).join("o.pbf").to_string_lossy()
    );
    assert!(converter_args.contains(&"--ways".to_string()));
    assert!(converter_args.ends_with(&["--tag".to_string(), "highway".to_string()]));

    assert!(sandbox.path("roads.shp").exists());
    sandbox.assert_tempdir_cleaned();
}

#[test]
fn test_filter_without_area_omits_geometry() {
    let _serial = serial();
    let sandbox = Sandbox::new();
    let filter = write_filter(
        &sandbox,
        "empty.geojson",
        r#"{"type": "FeatureCollection", "features": []}"#,
    );
    let options = ExtractOptions {
        geofilter: Some(filter),
        ..sandbox.options(0, 0)
    };

    osm_ogr_extract(&sandbox.path("in.osm.pbf"), &sandbox.path("out.shp"), &options).unwrap();

    let config: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(sandbox.log("cfg.json")).unwrap()).unwrap();
    let extract = &config["extracts"][0];
    assert!(extract.get("polygon").is_none());
    assert!(extract.get("multipolygon").is_none());
    assert_eq!(
        sandbox.logged_args("osmium.args").unwrap().last().unwrap(),
        "complete_ways"
    );
}

#[test]
fn test_extraction_failure_stops_before_conversion() {
    let _serial = serial();
    let sandbox = Sandbox::new();
    let filter = write_filter(&sandbox, "zone.wkt", "POLYGON((8 48,9 48,9 49,8 49,8 48))\n");
    let options = ExtractOptions {
        geofilter: Some(filter),
        ..sandbox.options(3, 0)
    };
    let before = env::current_dir().unwrap();

    let err = osm_ogr_extract(&sandbox.path("in.osm.pbf"), &sandbox.path("out.shp"), &options)
        .unwrap_err();

    assert_eq!(env::current_dir().unwrap(), before);
    assert!(format!("{:#}", err).contains("Extracting region from the input data failed"));
    let process_error = err
        .chain()
        .find_map(|e| e.downcast_ref::<ProcessError>())
        .unwrap();
    match process_error {
        ProcessError::Failed { status, .. } => assert_eq!(status.code(), Some(3)),
        other => panic!("unexpected error: {other}"),
    }

    assert!(sandbox.logged_args("osmium.args").is_some());
    assert!(sandbox.logged_args("converter.args").is_none(), "conversion must not run");
    assert!(!sandbox.path("out.shp").exists());
    sandbox.assert_tempdir_cleaned();
}

#[test]
fn test_conversion_failure_restores_state() {
    let _serial = serial();
    let sandbox = Sandbox::new();
    let options = sandbox.options(0, 1);
    let before = env::current_dir().unwrap();

    let err = osm_ogr_extract(&sandbox.path("in.osm.pbf"), &sandbox.path("out.shp"), &options)
        .unwrap_err();

    assert_eq!(env::current_dir().unwrap(), before);
    assert!(format!("{:#}", err).contains("Conversion to vector format failed"));
    sandbox.assert_tempdir_cleaned();
}

#[test]
fn test_unsupported_filter_geometry() {
    let _serial = serial();
    let sandbox = Sandbox::new();
    let filter = write_filter(
        &sandbox,
        "lines.wkt",
        "POLYGON((8 48,9 48,9 49,8 49,8 48))\nLINESTRING(8 48,9 49)\n",
    );
    let options = ExtractOptions {
        geofilter: Some(filter),
        ..sandbox.options(0, 0)
    };
    let before = env::current_dir().unwrap();

    let err = osm_ogr_extract(&sandbox.path("in.osm.pbf"), &sandbox.path("out.shp"), &options)
        .unwrap_err();

    assert_eq!(env::current_dir().unwrap(), before);
    let geofilter_error = err
        .chain()
        .find_map(|e| e.downcast_ref::<GeofilterError>())
        .unwrap();
    assert!(matches!(
        geofilter_error,
        GeofilterError::UnsupportedGeometryType(t) if t == "LineString"
    ));
    assert!(sandbox.logged_args("osmium.args").is_none());
    assert!(sandbox.logged_args("converter.args").is_none());
    sandbox.assert_tempdir_cleaned();
}

#[test]
fn test_missing_converter_program() {
    let _serial = serial();
    let sandbox = Sandbox::new();
    let options = ExtractOptions {
        converter: sandbox.path("missing-converter").to_string_lossy().into_owned(),
        ..sandbox.options(0, 0)
    };
    let before = env::current_dir().unwrap();

    let err = osm_ogr_extract(&sandbox.path("in.osm.pbf"), &sandbox.path("out.shp"), &options)
        .unwrap_err();

    assert_eq!(env::current_dir().unwrap(), before);
    assert!(err
        .chain()
        .any(|e| matches!(e.downcast_ref::<ProcessError>(), Some(ProcessError::Spawn { .. }))));
    sandbox.assert_tempdir_cleaned();
}
