//! Index parcellaire: construction depuis un GeoJSON et recherche par point

use std::path::Path;

use geo::{Coord, Geometry};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use tracing::warn;

use crate::bbox::BoundingBox;
use crate::contains::geometry_contains;
use crate::error::ParcelError;

/// Clés candidates pour l'identifiant, consultées dans cet ordre
const ID_CANDIDATES: [&str; 11] = [
    "PARCEL_ID",
    "PARCELID",
    "PARCEL",
    "LOTPLAN",
    "LOT_PLAN",
    "LOT",
    "PLAN",
    "OBJECTID",
    "objectid",
    "ID",
    "Id",
];

/// Une parcelle cadastrale indexée
#[derive(Debug, Clone)]
pub struct Parcel {
    /// Identifiant unique dans le jeu chargé
    pub id: String,

    /// Libellé d'affichage (LOT/PLAN si disponibles, sinon l'identifiant)
    pub label: String,

    /// Géométrie convertie en variantes `geo`, `None` si le record source
    /// n'en portait pas d'exploitable
    pub geometry: Option<Geometry>,

    /// Boîte englobante serrée, calculée une seule fois à la construction
    pub bbox: BoundingBox,

    /// Attributs du record source, conservés tels quels
    pub properties: JsonObject,
}

impl Parcel {
    /// Construit la parcelle du record à la position `position`.
    ///
    /// Un record incomplet ne fait jamais échouer la construction: il
    /// dégrade en entrée inatteignable (boîte vide) qui garde sa position.
    fn from_feature(feature: Feature, position: usize) -> Self {
        let id = derive_identifier(&feature, position);
        let label = derive_label(feature.properties.as_ref(), &id);

        let geometry = match feature.geometry {
            Some(raw) => match Geometry::try_from(raw) {
                Ok(geometry) => Some(geometry),
                Err(e) => {
                    warn!(parcel = %id, error = %e, "Unusable geometry, parcel will never match");
                    None
                }
            },
            None => {
                warn!(parcel = %id, "Feature without geometry, parcel will never match");
                None
            }
        };

        let bbox = geometry
            .as_ref()
            .map(BoundingBox::of_geometry)
            .unwrap_or(BoundingBox::EMPTY);

        Self {
            id,
            label,
            geometry,
            bbox,
            properties: feature.properties.unwrap_or_default(),
        }
    }

    /// Test de contenance complet (ring extérieur + trous).
    ///
    /// Les géométries non surfaciques et absentes ne contiennent rien.
    pub fn contains(&self, point: Coord) -> bool {
        self.geometry
            .as_ref()
            .map_or(false, |geometry| geometry_contains(point, geometry))
    }
}

/// Index des parcelles, construit une seule fois puis interrogé en lecture.
///
/// L'ordre des parcelles est celui du jeu de données source; c'est aussi le
/// départage stable quand un point ambigu satisfait plusieurs parcelles.
#[derive(Debug, Default)]
pub struct ParcelIndex {
    parcels: Vec<Parcel>,
}

impl ParcelIndex {
    /// Construit l'index depuis une FeatureCollection
    pub fn from_collection(collection: FeatureCollection) -> Self {
        Self::from_features(collection.features)
    }

    /// Construit l'index depuis une séquence ordonnée de features
    pub fn from_features(features: Vec<Feature>) -> Self {
        let parcels = features
            .into_iter()
            .enumerate()
            .map(|(position, feature)| Parcel::from_feature(feature, position))
            .collect();
        Self { parcels }
    }

    /// Parse un document GeoJSON et construit l'index.
    ///
    /// Une Feature isolée est acceptée comme collection à un élément.
    pub fn from_geojson_str(content: &str) -> Result<Self, ParcelError> {
        match content.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(collection) => Ok(Self::from_collection(collection)),
            GeoJson::Feature(feature) => Ok(Self::from_features(vec![feature])),
            GeoJson::Geometry(_) => Err(ParcelError::NotAFeatureCollection),
        }
    }

    /// Parcelles dont la boîte englobante couvre le point.
    ///
    /// Pré-filtre de performance uniquement: il ne change jamais le
    /// résultat, il évite seulement le test polygonal.
    pub fn candidates(&self, point: Coord) -> impl Iterator<Item = &Parcel> {
        self.parcels
            .iter()
            .filter(move |parcel| parcel.bbox.contains(point))
    }

    /// Première parcelle contenant le point, dans l'ordre de chargement
    pub fn find_containing(&self, point: Coord) -> Option<&Parcel> {
        self.candidates(point)
            .find(|parcel| parcel.contains(point))
    }

    /// Parcelle par identifiant (première occurrence en cas de doublon)
    pub fn get(&self, id: &str) -> Option<&Parcel> {
        self.parcels.iter().find(|parcel| parcel.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parcel> {
        self.parcels.iter()
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    /// Nombre d'entrées inatteignables (records dégradés)
    pub fn unmatchable(&self) -> usize {
        self.parcels
            .iter()
            .filter(|parcel| parcel.bbox.is_empty())
            .count()
    }
}

/// Charge un fichier GeoJSON et construit l'index
pub fn load_parcels(path: &Path) -> Result<ParcelIndex, ParcelError> {
    let content = std::fs::read_to_string(path)?;
    ParcelIndex::from_geojson_str(&content)
}

/// Dérive l'identifiant: id de la feature, puis clés candidates dans
/// l'ordre, sinon `parcel_<position>`
fn derive_identifier(feature: &Feature, position: usize) -> String {
    if let Some(id) = &feature.id {
        let text = match id {
            Id::String(s) => trimmed_non_empty(s),
            Id::Number(n) => Some(number_text(n)),
        };
        if let Some(text) = text {
            return text;
        }
    }

    if let Some(properties) = &feature.properties {
        for key in ID_CANDIDATES {
            if let Some(text) = properties.get(key).and_then(value_text) {
                return text;
            }
        }
    }

    format!("parcel_{}", position)
}

/// Libellé `LOT/PLAN` quand les deux attributs sont présents et non vides,
/// sinon l'identifiant
fn derive_label(properties: Option<&JsonObject>, identifier: &str) -> String {
    if let Some(properties) = properties {
        let lot = properties.get("LOT").filter(|v| value_truthy(v));
        let plan = properties.get("PLAN").filter(|v| value_truthy(v));
        if let (Some(lot), Some(plan)) = (lot, plan) {
            return format!("{}/{}", display_text(lot), display_text(plan));
        }
    }
    identifier.to_string()
}

/// Valeur candidate d'identifiant: chaîne non vide après trim, ou nombre
fn value_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => trimmed_non_empty(s),
        JsonValue::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

/// Truthiness du record source: chaîne non vide ou nombre non nul
fn value_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Number(n) => n.as_f64() != Some(0.0),
        JsonValue::Bool(b) => *b,
        _ => false,
    }
}

fn display_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => number_text(n),
        other => other.to_string(),
    }
}

fn trimmed_non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Les entiers JSON s'affichent sans point décimal
fn number_text(n: &serde_json::Number) -> String {
    match n.as_i64() {
        Some(i) => i.to_string(),
        None => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature_with_properties(properties: JsonValue) -> Feature {
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: properties.as_object().cloned(),
            foreign_members: None,
        }
    }

    #[test]
    fn test_identifier_from_parcel_id() {
        let feature = feature_with_properties(json!({"PARCEL_ID": "7"}));
        assert_eq!(derive_identifier(&feature, 0), "7");
    }

    #[test]
    fn test_identifier_numeric_property() {
        let feature = feature_with_properties(json!({"OBJECTID": 42}));
        assert_eq!(derive_identifier(&feature, 0), "42");
    }

    #[test]
    fn test_identifier_candidate_order() {
        // PARCEL_ID prime sur LOTPLAN même si les deux sont présents
        let feature =
            feature_with_properties(json!({"LOTPLAN": "12DP4567", "PARCEL_ID": "A"}));
        assert_eq!(derive_identifier(&feature, 0), "A");
    }

    #[test]
    fn test_identifier_skips_blank_candidates() {
        let feature =
            feature_with_properties(json!({"PARCEL_ID": "   ", "PARCELID": "B"}));
        assert_eq!(derive_identifier(&feature, 0), "B");
    }

    #[test]
    fn test_identifier_feature_id_wins() {
        let mut feature = feature_with_properties(json!({"PARCEL_ID": "7"}));
        feature.id = Some(Id::String("top".to_string()));
        assert_eq!(derive_identifier(&feature, 0), "top");
    }

    #[test]
    fn test_identifier_fallback_position() {
        let feature = feature_with_properties(json!({}));
        assert_eq!(derive_identifier(&feature, 3), "parcel_3");
    }

    #[test]
    fn test_label_lot_plan() {
        let properties = json!({"LOT": "12", "PLAN": "DP4567"});
        let label = derive_label(properties.as_object(), "x");
        assert_eq!(label, "12/DP4567");
    }

    #[test]
    fn test_label_falls_back_to_identifier() {
        let properties = json!({"LOT": "12"});
        let label = derive_label(properties.as_object(), "parcel_0");
        assert_eq!(label, "parcel_0");

        let empty_plan = json!({"LOT": "12", "PLAN": ""});
        let label = derive_label(empty_plan.as_object(), "parcel_0");
        assert_eq!(label, "parcel_0");
    }

    #[test]
    fn test_label_numeric_lot() {
        let properties = json!({"LOT": 12, "PLAN": "DP4567"});
        let label = derive_label(properties.as_object(), "x");
        assert_eq!(label, "12/DP4567");
    }

    #[test]
    fn test_feature_without_geometry_is_unmatchable() {
        let feature = feature_with_properties(json!({"PARCEL_ID": "7"}));
        let index = ParcelIndex::from_features(vec![feature]);

        assert_eq!(index.len(), 1);
        assert_eq!(index.unmatchable(), 1);
        assert!(index
            .find_containing(Coord { x: 0.0, y: 0.0 })
            .is_none());
    }

    #[test]
    fn test_empty_index() {
        let index = ParcelIndex::from_features(vec![]);
        assert!(index.is_empty());
        assert!(index.find_containing(Coord { x: 5.0, y: 5.0 }).is_none());
    }
}
