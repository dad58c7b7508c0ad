//! # geofilter
//!
//! Agrégation d'un dataset vectoriel en une zone d'extraction unique pour
//! `osmium extract`.
//!
//! ## Features
//!
//! - Lecture GeoJSON (membre `crs` historique), WKT/EWKT et Shapefile (`.prj`)
//! - Reprojection vers EPSG:4326 avec PROJ (feature `reproject`, activé par défaut)
//! - Union des Polygon/MultiPolygon avec `geo::BooleanOps`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geofilter::aggregate_file;
//! use std::path::Path;
//!
//! match aggregate_file(Path::new("zone.geojson"))? {
//!     Some(area) => println!("{}: {}", area.key(), area.coordinates()),
//!     None => println!("Aucune surface"),
//! }
//! ```

pub mod aggregate;
pub mod dataset;
pub mod error;
pub mod reproject;
pub mod srs;
pub mod types;

pub use aggregate::{aggregate_features, aggregate_file};
pub use error::GeofilterError;
pub use reproject::TargetReference;
pub use srs::{SpatialRef, WGS84_EPSG};
pub use types::{ExtractionArea, Feature, Layer};
