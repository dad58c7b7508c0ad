//! Agrégation des polygones d'un dataset en une zone d'extraction unique

#[cfg(feature = "reproject")]
use std::collections::hash_map::Entry;
#[cfg(feature = "reproject")]
use std::collections::HashMap;
use std::path::Path;

use geo::{BooleanOps, Geometry, MultiPolygon, Polygon};
use tracing::{debug, info};

use crate::dataset::Dataset;
#[cfg(feature = "reproject")]
use crate::reproject::Reprojector;
use crate::reproject::TargetReference;
use crate::srs::{SpatialRef, WGS84_EPSG};
use crate::types::{ExtractionArea, Feature};
use crate::GeofilterError;

/// Condense les géométries du premier layer d'un dataset en une seule zone EPSG:4326.
///
/// # Errors
///
/// - dataset illisible ou sans couche;
/// - import impossible du système cible;
/// - feature dont la géométrie n'est ni Polygon ni MultiPolygon;
/// - échec de reprojection.
pub fn aggregate_file(path: &Path) -> Result<Option<ExtractionArea>, GeofilterError> {
    let dataset = Dataset::open(path)?;
    let layer = dataset
        .into_first_layer()
        .ok_or_else(|| GeofilterError::NoLayer(path.to_path_buf()))?;

    let target = TargetReference::import(WGS84_EPSG)?;

    info!(
        path = %path.display(),
        layer = %layer.name,
        features = layer.features.len(),
        "Aggregating spatial filter"
    );

    aggregate_features(layer.features, &target)
}

/// Union de features polygonales, reprojetées vers `target`.
///
/// Les MultiPolygon sont décomposés: chaque partie est reprojetée puis
/// unie séparément.
pub fn aggregate_features<I>(
    features: I,
    target: &TargetReference,
) -> Result<Option<ExtractionArea>, GeofilterError>
where
    I: IntoIterator<Item = Feature>,
{
    let mut normalizer = Normalizer::new(target.srs());

    let union = features
        .into_iter()
        .try_fold(MultiPolygon::new(Vec::new()), |acc, feature| {
            let srs = feature.srs;
            match feature.geometry {
                Geometry::Polygon(polygon) => normalizer.union(acc, polygon, srs),
                Geometry::MultiPolygon(parts) => parts
                    .0
                    .into_iter()
                    .try_fold(acc, |acc, part| normalizer.union(acc, part, srs)),
                other => Err(GeofilterError::UnsupportedGeometryType(
                    geometry_name(&other).to_string(),
                )),
            }
        })?;

    let area = ExtractionArea::from_union(union);
    match &area {
        Some(area) => debug!(
            kind = area.key(),
            polygons = area.polygon_count(),
            "Aggregation complete"
        ),
        None => debug!("Aggregation produced no area"),
    }
    Ok(area)
}

/// Reprojection à la demande, un reprojector par EPSG source
struct Normalizer {
    target: SpatialRef,
    #[cfg(feature = "reproject")]
    reprojectors: HashMap<u32, Reprojector>,
}

impl Normalizer {
    fn new(target: SpatialRef) -> Self {
        Self {
            target,
            #[cfg(feature = "reproject")]
            reprojectors: HashMap::new(),
        }
    }

    /// Reprojette `polygon` si besoin puis l'unit à l'accumulateur
    fn union(
        &mut self,
        acc: MultiPolygon,
        polygon: Polygon,
        srs: Option<SpatialRef>,
    ) -> Result<MultiPolygon, GeofilterError> {
        if polygon.exterior().0.is_empty() {
            return Ok(acc);
        }

        let polygon = self.normalize(polygon, srs)?;
        // Toujours passer par l'union, même pour la première partie: un ring
        // aplati en ressort vide
        Ok(acc.union(&MultiPolygon::new(vec![polygon])))
    }

    fn normalize(
        &mut self,
        polygon: Polygon,
        srs: Option<SpatialRef>,
    ) -> Result<Polygon, GeofilterError> {
        // Système de la feature comparé à la cible
        match srs.filter(|s| !s.is_same(&self.target)) {
            Some(source) => self.reproject(polygon, source),
            None => Ok(polygon),
        }
    }

    #[cfg(feature = "reproject")]
    fn reproject(
        &mut self,
        polygon: Polygon,
        source: SpatialRef,
    ) -> Result<Polygon, GeofilterError> {
        let reprojector = match self.reprojectors.entry(source.epsg) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                debug!(from = %source, to = %self.target, "Creating reprojector");
                e.insert(Reprojector::new(source, self.target)?)
            }
        };

        reprojector.transform_polygon(&polygon)
    }

    #[cfg(not(feature = "reproject"))]
    fn reproject(
        &mut self,
        _polygon: Polygon,
        source: SpatialRef,
    ) -> Result<Polygon, GeofilterError> {
        Err(GeofilterError::reprojection(
            source.epsg,
            format!(
                "reprojection to {} requires the 'reproject' feature. \
                 Build with: cargo build --features reproject",
                self.target
            ),
        ))
    }
}

/// Nom du type de géométrie, pour les messages d'erreur
pub fn geometry_name(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
