//! # osm-ogr-extract
//!
//! Extraction de sous-ensembles géographiques d'un fichier OSM-PBF et export
//! vers un format OGR avec les tags choisis en colonnes.
//!
//! ## Dépendances externes
//!
//! - `osmium` ([osmium-tool](https://github.com/osmcode/osmium-tool))
//! - `osm2ogr_with_tags`
//!
//! ## Usage CLI
//!
//! ```bash
//! # Tous les nodes, en shapefile
//! osm-ogr-extract planet.osm.pbf nodes.shp
//!
//! # Ways découpées sur une zone, en GeoPackage
//! osm-ogr-extract --geofilter zone.geojson -w -f GPKG -t highway name in.osm.pbf roads.gpkg
//! ```

pub mod config;
pub mod convert;
pub mod extract;
pub mod osmium;
pub mod process;
pub mod workdir;

pub use config::ExtractOptions;
pub use convert::{ConversionRequest, GeometryClass};
pub use extract::osm_ogr_extract;
pub use osmium::OsmiumConfig;
pub use process::{ProcessError, ToolCommand};
