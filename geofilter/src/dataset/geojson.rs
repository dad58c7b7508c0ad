//! Lecture GeoJSON (FeatureCollection, Feature ou Geometry seule)
//!
//! Le système de référence provient du membre historique `crs`
//! (`{"type":"name","properties":{"name":"urn:ogc:def:crs:EPSG::2154"}}`),
//! cherché sur la géométrie, puis la feature, puis la collection.

use std::path::Path;

use ::geojson::{GeoJson, JsonObject};
use serde_json::Value as JsonValue;
use tracing::trace;

use crate::srs::SpatialRef;
use crate::types::{Feature, Layer};
use crate::GeofilterError;

/// Lit l'unique couche d'un document GeoJSON
pub fn read_layer(path: &Path, content: &str, name: String) -> Result<Layer, GeofilterError> {
    let document: GeoJson = content.parse().map_err(|e| GeofilterError::GeoJson {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let features = match document {
        GeoJson::FeatureCollection(fc) => {
            let collection_srs = crs_member(fc.foreign_members.as_ref())?;
            let mut features = Vec::with_capacity(fc.features.len());
            for feature in fc.features {
                if let Some(f) = convert_feature(path, feature, collection_srs)? {
                    features.push(f);
                }
            }
            features
        }
        GeoJson::Feature(feature) => convert_feature(path, feature, None)?.into_iter().collect(),
        GeoJson::Geometry(geometry) => vec![convert_geometry(path, geometry, None)?],
    };

    Ok(Layer { name, features })
}

fn convert_feature(
    path: &Path,
    feature: ::geojson::Feature,
    inherited: Option<SpatialRef>,
) -> Result<Option<Feature>, GeofilterError> {
    let srs = crs_member(feature.foreign_members.as_ref())?.or(inherited);

    // Feature sans géométrie: rien à agréger
    let Some(geometry) = feature.geometry else {
        trace!(id = ?feature.id, "Feature without geometry skipped");
        return Ok(None);
    };

    convert_geometry(path, geometry, srs).map(Some)
}

fn convert_geometry(
    path: &Path,
    geometry: ::geojson::Geometry,
    inherited: Option<SpatialRef>,
) -> Result<Feature, GeofilterError> {
    let srs = crs_member(geometry.foreign_members.as_ref())?.or(inherited);

    let geometry = geo::Geometry::<f64>::try_from(geometry.value).map_err(|e| {
        GeofilterError::GeoJson {
            path: path.to_path_buf(),
            source: Box::new(e),
        }
    })?;

    Ok(Feature::new(geometry, srs))
}

/// Extrait le système de référence du membre `crs`, s'il existe
fn crs_member(members: Option<&JsonObject>) -> Result<Option<SpatialRef>, GeofilterError> {
    let Some(crs) = members.and_then(|m| m.get("crs")) else {
        return Ok(None);
    };

    if crs.is_null() {
        return Ok(None);
    }

    let properties = crs.get("properties");
    match crs.get("type").and_then(JsonValue::as_str) {
        Some("name") => properties
            .and_then(|p| p.get("name"))
            .and_then(JsonValue::as_str)
            .map(str::parse)
            .transpose(),
        // Ancienne forme GeoJSON 2008: {"type":"EPSG","properties":{"code":2154}}
        Some("EPSG") => properties
            .and_then(|p| p.get("code"))
            .and_then(JsonValue::as_u64)
            .and_then(|code| u32::try_from(code).ok())
            .map(|code| Ok(SpatialRef::from_epsg(code)))
            .transpose(),
        _ => Err(GeofilterError::UnknownReference(crs.to_string())),
    }
}
