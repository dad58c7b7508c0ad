//! Types de données pour le crate geofilter

use geo::{Area, Geometry, MultiPolygon, Polygon};
use geojson::PolygonType;

use crate::srs::SpatialRef;

/// Une feature lue depuis le dataset filtre
#[derive(Debug, Clone)]
pub struct Feature {
    /// Géométrie telle que lue (coordonnées dans `srs`)
    pub geometry: Geometry,

    /// Système de référence porté par la feature, s'il est connu
    pub srs: Option<SpatialRef>,
}

impl Feature {
    pub fn new(geometry: Geometry, srs: Option<SpatialRef>) -> Self {
        Self { geometry, srs }
    }
}

/// Une couche du dataset
#[derive(Debug, Clone, Default)]
pub struct Layer {
    /// Nom de la couche (nom de fichier sans extension)
    pub name: String,

    pub features: Vec<Feature>,
}

/// Zone d'extraction agrégée, toujours en EPSG:4326 et jamais vide
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionArea {
    Polygon(Polygon),
    MultiPolygon(MultiPolygon),
}

impl ExtractionArea {
    /// Construit la zone depuis le résultat de l'union.
    ///
    /// Retourne `None` si l'union ne couvre aucune surface: les polygones
    /// d'aire nulle (ring vide ou aplati) sont écartés. Une union réduite à
    /// un seul polygone est rapportée comme `Polygon`.
    pub fn from_union(union: MultiPolygon) -> Option<Self> {
        let mut polygons: Vec<Polygon> = union
            .0
            .into_iter()
            .filter(|p| p.unsigned_area() > 0.0)
            .collect();

        match polygons.len() {
            0 => None,
            1 => polygons.pop().map(Self::Polygon),
            _ => Some(Self::MultiPolygon(MultiPolygon::new(polygons))),
        }
    }

    /// Clé de la configuration osmium correspondant au type de géométrie
    pub fn key(&self) -> &'static str {
        match self {
            Self::Polygon(_) => "polygon",
            Self::MultiPolygon(_) => "multipolygon",
        }
    }

    /// Nombre de polygones composant la zone
    pub fn polygon_count(&self) -> usize {
        match self {
            Self::Polygon(_) => 1,
            Self::MultiPolygon(mp) => mp.0.len(),
        }
    }

    /// Tableau de coordonnées GeoJSON (`coordinates` d'un Polygon ou MultiPolygon)
    pub fn coordinates(&self) -> serde_json::Value {
        match self {
            Self::Polygon(p) => serde_json::json!(polygon_coordinates(p)),
            Self::MultiPolygon(mp) => {
                let polygons: Vec<PolygonType> = mp.0.iter().map(polygon_coordinates).collect();
                serde_json::json!(polygons)
            }
        }
    }

    pub fn to_geometry(&self) -> Geometry {
        match self {
            Self::Polygon(p) => Geometry::Polygon(p.clone()),
            Self::MultiPolygon(mp) => Geometry::MultiPolygon(mp.clone()),
        }
    }
}

fn polygon_coordinates(polygon: &Polygon) -> PolygonType {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|c| vec![c.x, c.y]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, LineString};

    fn square(x: f64, y: f64) -> Polygon {
        polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
            (x: x, y: y),
        ]
    }

    #[test]
    fn test_from_union_empty() {
        assert!(ExtractionArea::from_union(MultiPolygon::new(vec![])).is_none());

        let degenerate = Polygon::new(LineString::new(vec![]), vec![]);
        assert!(ExtractionArea::from_union(MultiPolygon::new(vec![degenerate])).is_none());
    }

    #[test]
    fn test_from_union_drops_flat_rings() {
        let flat = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.0, 0.0)]),
            vec![],
        );
        assert!(ExtractionArea::from_union(MultiPolygon::new(vec![flat.clone()])).is_none());

        let area =
            ExtractionArea::from_union(MultiPolygon::new(vec![flat, square(5.0, 5.0)])).unwrap();
        assert_eq!(area, ExtractionArea::Polygon(square(5.0, 5.0)));
    }

    #[test]
    fn test_from_union_collapses_single_polygon() {
        let area = ExtractionArea::from_union(MultiPolygon::new(vec![square(0.0, 0.0)])).unwrap();
        assert_eq!(area.key(), "polygon");
        assert_eq!(area.polygon_count(), 1);
    }

    #[test]
    fn test_coordinates_multipolygon() {
        let area = ExtractionArea::from_union(MultiPolygon::new(vec![
            square(0.0, 0.0),
            square(5.0, 5.0),
        ]))
        .unwrap();

        assert_eq!(area.key(), "multipolygon");
        let coords = area.coordinates();
        let polygons = coords.as_array().unwrap();
        assert_eq!(polygons.len(), 2);
        // Chaque polygone: un ring extérieur fermé de 5 positions
        let exterior = polygons[0][0].as_array().unwrap();
        assert_eq!(exterior.len(), 5);
        assert_eq!(exterior[0], serde_json::json!([0.0, 0.0]));
    }

    #[test]
    fn test_coordinates_polygon_with_hole() {
        let outer = LineString::from(vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]);
        let hole = LineString::from(vec![(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0), (1.0, 1.0)]);
        let area = ExtractionArea::Polygon(Polygon::new(outer, vec![hole]));

        let coords = area.coordinates();
        assert_eq!(coords.as_array().unwrap().len(), 2);
    }
}
