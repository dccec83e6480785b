//! Notes libres attachées aux parcelles

use std::collections::HashMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store::DocumentStore;

/// Clé du document de notes dans le magasin
pub const NOTES_KEY: &str = "parcel_notes";

/// Notes par identifiant de parcelle, persistées comme un objet JSON plat
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ParcelNotes {
    #[serde(flatten)]
    notes: HashMap<String, String>,
}

impl ParcelNotes {
    /// Recharge les notes persistées, vide si absentes
    pub fn load(store: &DocumentStore) -> Self {
        store.get_as(NOTES_KEY).unwrap_or_default()
    }

    /// Écrit les notes dans le magasin
    pub fn save(&self, store: &DocumentStore) -> Result<()> {
        store.put_as(NOTES_KEY, self)
    }

    pub fn get(&self, parcel_id: &str) -> Option<&str> {
        self.notes.get(parcel_id).map(String::as_str)
    }

    /// Attache une note; un texte vide supprime l'entrée
    pub fn set(&mut self, parcel_id: &str, text: &str) {
        if text.is_empty() {
            self.notes.remove(parcel_id);
        } else {
            self.notes.insert(parcel_id.to_string(), text.to_string());
        }
    }

    /// Supprime la note, vraie si elle existait
    pub fn remove(&mut self, parcel_id: &str) -> bool {
        self.notes.remove(parcel_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.notes
            .iter()
            .map(|(id, note)| (id.as_str(), note.as_str()))
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut notes = ParcelNotes::default();
        notes.set("A", "à vérifier sur place");

        assert_eq!(notes.get("A"), Some("à vérifier sur place"));
        assert_eq!(notes.get("B"), None);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_empty_text_removes() {
        let mut notes = ParcelNotes::default();
        notes.set("A", "note");
        notes.set("A", "");

        assert!(notes.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut notes = ParcelNotes::default();
        notes.set("A", "note");

        assert!(notes.remove("A"));
        assert!(!notes.remove("A"));
    }

    #[test]
    fn test_serde_flat_object() {
        let mut notes = ParcelNotes::default();
        notes.set("A", "première");
        notes.set("B", "seconde");

        let value = serde_json::to_value(&notes).unwrap();
        assert_eq!(value["A"], "première");
        assert_eq!(value["B"], "seconde");

        let back: ParcelNotes = serde_json::from_value(value).unwrap();
        assert_eq!(back.get("A"), Some("première"));
        assert_eq!(back.len(), 2);
    }
}
