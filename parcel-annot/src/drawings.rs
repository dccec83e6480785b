//! Formes dessinées et leur persistance GeoJSON

use anyhow::Result;
use geo::Geometry;
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use tracing::warn;

use crate::store::DocumentStore;

/// Clé du document des dessins dans le magasin
pub const DRAWINGS_KEY: &str = "drawings";

/// Une forme dessinée par l'utilisateur
#[derive(Debug, Clone)]
pub struct Drawing {
    /// Identifiant `drawing_<n>`, attribué par le compteur de la session
    pub id: String,

    /// Géométrie de la forme (celle de la parcelle si accrochée)
    pub geometry: Geometry,

    /// Note libre attachée au dessin
    pub note: Option<String>,

    /// Identifiant de la parcelle d'accrochage, si la forme a été remplacée
    pub snapped_to: Option<String>,
}

/// Ensemble ordonné des dessins de la session
#[derive(Debug, Default)]
pub struct DrawingSet {
    drawings: Vec<Drawing>,
    next_id: usize,
}

impl DrawingSet {
    /// Ajoute un dessin et lui attribue le prochain identifiant
    pub fn add(
        &mut self,
        geometry: Geometry,
        note: Option<String>,
        snapped_to: Option<String>,
    ) -> &Drawing {
        self.next_id += 1;
        self.drawings.push(Drawing {
            id: format!("drawing_{}", self.next_id),
            geometry,
            note,
            snapped_to,
        });
        self.drawings.last().expect("just pushed")
    }

    /// Supprime le dessin, vrai s'il existait
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.drawings.len();
        self.drawings.retain(|drawing| drawing.id != id);
        self.drawings.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&Drawing> {
        self.drawings.iter().find(|drawing| drawing.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Drawing> {
        self.drawings.iter()
    }

    pub fn len(&self) -> usize {
        self.drawings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawings.is_empty()
    }

    /// Sérialise les dessins en FeatureCollection (géométrie + propriétés)
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self.drawings.iter().map(drawing_to_feature).collect();
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    /// Reconstruit l'ensemble depuis une FeatureCollection persistée.
    ///
    /// Les features sans géométrie convertible sont ignorées; le compteur
    /// repart après le plus grand suffixe `drawing_<n>` rencontré.
    pub fn from_feature_collection(collection: FeatureCollection) -> Self {
        let mut set = Self::default();

        for feature in collection.features {
            let Some(drawing) = feature_to_drawing(feature) else {
                continue;
            };
            if let Some(n) = drawing
                .id
                .strip_prefix("drawing_")
                .and_then(|suffix| suffix.parse::<usize>().ok())
            {
                set.next_id = set.next_id.max(n);
            }
            set.drawings.push(drawing);
        }

        set
    }

    /// Recharge les dessins persistés, vide si absents
    pub fn load(store: &DocumentStore) -> Self {
        match store.get_as::<FeatureCollection>(DRAWINGS_KEY) {
            Some(collection) => Self::from_feature_collection(collection),
            None => Self::default(),
        }
    }

    /// Écrit les dessins dans le magasin
    pub fn save(&self, store: &DocumentStore) -> Result<()> {
        store.put_as(DRAWINGS_KEY, &self.to_feature_collection())
    }
}

fn drawing_to_feature(drawing: &Drawing) -> Feature {
    let mut properties = JsonObject::new();
    if let Some(note) = &drawing.note {
        properties.insert("note".to_string(), JsonValue::String(note.clone()));
    }
    if let Some(parcel_id) = &drawing.snapped_to {
        properties.insert(
            "snapped_to".to_string(),
            JsonValue::String(parcel_id.clone()),
        );
    }

    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(
            &drawing.geometry,
        ))),
        id: Some(Id::String(drawing.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn feature_to_drawing(feature: Feature) -> Option<Drawing> {
    let id = match &feature.id {
        Some(Id::String(s)) => s.clone(),
        Some(Id::Number(n)) => n.to_string(),
        None => {
            warn!("Stored drawing without id, skipping");
            return None;
        }
    };

    let geometry = match feature.geometry.map(Geometry::try_from) {
        Some(Ok(geometry)) => geometry,
        _ => {
            warn!(drawing = %id, "Stored drawing without usable geometry, skipping");
            return None;
        }
    };

    let text_property = |key: &str| -> Option<String> {
        feature
            .properties
            .as_ref()
            .and_then(|properties| properties.get(key))
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    };

    Some(Drawing {
        id,
        geometry,
        note: text_property("note"),
        snapped_to: text_property("snapped_to"),
    })
}
