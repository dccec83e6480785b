//! Accrochage d'une forme dessinée à la parcelle sous-jacente

use geo::{Coord, Geometry};

use crate::bbox::BoundingBox;
use crate::index::{Parcel, ParcelIndex};

/// Point représentatif d'une forme dessinée.
///
/// Un marqueur (Point) utilise sa propre coordonnée; toute autre forme
/// utilise le centre de son enveloppe. `None` si l'enveloppe est vide.
pub fn representative_point(shape: &Geometry) -> Option<Coord> {
    match shape {
        Geometry::Point(point) => Some(point.0),
        other => BoundingBox::of_geometry(other).center(),
    }
}

/// Résolveur d'accrochage: remplace une forme dessinée par la géométrie de
/// la parcelle surfacique trouvée sous son point représentatif.
///
/// L'index est passé à la construction et n'est jamais modifié; `resolve`
/// est une fonction totale, sans effet de bord.
pub struct SnapResolver<'a> {
    index: &'a ParcelIndex,
}

impl<'a> SnapResolver<'a> {
    pub fn new(index: &'a ParcelIndex) -> Self {
        Self { index }
    }

    /// Parcelle surfacique sous le point représentatif de la forme.
    ///
    /// `None` si le point est indérivable, si aucune parcelle ne contient
    /// le point, ou si la parcelle trouvée n'est pas surfacique.
    pub fn resolve_parcel(&self, shape: &Geometry) -> Option<&'a Parcel> {
        let point = representative_point(shape)?;
        let parcel = self.index.find_containing(point)?;
        match parcel.geometry {
            Some(Geometry::Polygon(_)) | Some(Geometry::MultiPolygon(_)) => Some(parcel),
            _ => None,
        }
    }

    /// Géométrie de remplacement pour la forme, `None` si aucun accrochage.
    ///
    /// Le clone retourné a la même forme type/coordonnées que la géométrie
    /// source: un adaptateur GeoJSON → forme éditable le consomme tel quel.
    pub fn resolve(&self, shape: &Geometry) -> Option<Geometry> {
        self.resolve_parcel(shape)
            .and_then(|parcel| parcel.geometry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon};
    use geojson::{Feature, GeoJson};

    fn index_from(geojson: &str) -> ParcelIndex {
        ParcelIndex::from_geojson_str(geojson).unwrap()
    }

    const SQUARE_A: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"PARCEL_ID": "A"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0,0],[0,10],[10,10],[10,0],[0,0]]]
            }
        }]
    }"#;

    #[test]
    fn test_representative_point_marker() {
        let marker = Geometry::Point(point! { x: 5.0, y: 5.0 });
        assert_eq!(
            representative_point(&marker),
            Some(Coord { x: 5.0, y: 5.0 })
        );
    }

    #[test]
    fn test_representative_point_envelope_center() {
        let line = Geometry::LineString(line_string![
            (x: 2.0, y: 2.0),
            (x: 8.0, y: 6.0),
        ]);
        assert_eq!(
            representative_point(&line),
            Some(Coord { x: 5.0, y: 4.0 })
        );
    }

    #[test]
    fn test_representative_point_degenerate() {
        let empty = Geometry::MultiPolygon(geo::MultiPolygon::new(vec![]));
        assert!(representative_point(&empty).is_none());
    }

    #[test]
    fn test_resolve_marker_inside_parcel() {
        let index = index_from(SQUARE_A);
        let resolver = SnapResolver::new(&index);

        let marker = Geometry::Point(point! { x: 5.0, y: 5.0 });
        let parcel = resolver.resolve_parcel(&marker).unwrap();
        assert_eq!(parcel.id, "A");

        let replacement = resolver.resolve(&marker).unwrap();
        assert!(matches!(replacement, Geometry::Polygon(_)));
    }

    #[test]
    fn test_resolve_shape_by_envelope_center() {
        let index = index_from(SQUARE_A);
        let resolver = SnapResolver::new(&index);

        // Enveloppe centrée en (5,5), dans la parcelle A
        let shape = Geometry::Polygon(polygon![
            (x: 4.0, y: 4.0),
            (x: 6.0, y: 4.0),
            (x: 6.0, y: 6.0),
            (x: 4.0, y: 6.0),
            (x: 4.0, y: 4.0),
        ]);
        assert_eq!(resolver.resolve_parcel(&shape).unwrap().id, "A");
    }

    #[test]
    fn test_resolve_open_space() {
        let index = index_from(SQUARE_A);
        let resolver = SnapResolver::new(&index);

        let marker = Geometry::Point(point! { x: 50.0, y: 50.0 });
        assert!(resolver.resolve(&marker).is_none());
    }

    #[test]
    fn test_resolve_empty_index() {
        let index = ParcelIndex::from_features(vec![]);
        let resolver = SnapResolver::new(&index);

        let marker = Geometry::Point(point! { x: 5.0, y: 5.0 });
        assert!(resolver.resolve(&marker).is_none());
    }

    #[test]
    fn test_resolve_non_area_parcel() {
        // Une parcelle de type Point ne déclenche jamais d'accrochage,
        // même si l'index la retournait par sa boîte englobante
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"PARCEL_ID": "P"},
                "geometry": {"type": "Point", "coordinates": [5, 5]}
            }]
        }"#;
        let index = index_from(geojson);
        let resolver = SnapResolver::new(&index);

        let marker = Geometry::Point(point! { x: 5.0, y: 5.0 });
        assert!(resolver.resolve(&marker).is_none());
    }

    #[test]
    fn test_resolve_degenerate_shape() {
        let index = index_from(SQUARE_A);
        let resolver = SnapResolver::new(&index);

        let empty = Geometry::MultiPolygon(geo::MultiPolygon::new(vec![]));
        assert!(resolver.resolve(&empty).is_none());
    }

    #[test]
    fn test_resolve_output_round_trips_to_geojson() {
        let index = index_from(SQUARE_A);
        let resolver = SnapResolver::new(&index);

        let marker = Geometry::Point(point! { x: 5.0, y: 5.0 });
        let replacement = resolver.resolve(&marker).unwrap();

        // Le contrat consommateur: un adaptateur GeoJSON standard doit
        // pouvoir consommer la géométrie telle quelle
        let value = geojson::Value::from(&replacement);
        let feature = Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(value)),
            id: None,
            properties: None,
            foreign_members: None,
        };
        let encoded = GeoJson::Feature(feature).to_string();
        assert!(encoded.contains(r#""type":"Polygon""#));
    }
}
