//! Contexte d'une session d'annotation

use anyhow::Result;
use geo::{Coord, Geometry};
use tracing::debug;

use parcel_index::{ParcelIndex, SnapResolver};

use crate::drawings::{Drawing, DrawingSet};
use crate::notes::ParcelNotes;
use crate::store::DocumentStore;

/// Résultat d'une recherche au point
#[derive(Debug, Clone)]
pub struct ParcelHit {
    pub id: String,
    pub label: String,
    pub note: Option<String>,
}

/// Contexte explicite d'une session d'annotation.
///
/// Possède l'index, les notes, les dessins et le réglage d'accrochage;
/// l'appelant le construit et le passe, aucun état global de module.
pub struct AnnotationSession {
    index: ParcelIndex,
    notes: ParcelNotes,
    drawings: DrawingSet,
    snap_enabled: bool,
}

impl AnnotationSession {
    /// Session vierge sur un index fraîchement construit
    pub fn new(index: ParcelIndex, snap_enabled: bool) -> Self {
        Self {
            index,
            notes: ParcelNotes::default(),
            drawings: DrawingSet::default(),
            snap_enabled,
        }
    }

    /// Session rechargée depuis le magasin (notes + dessins persistés)
    pub fn restore(index: ParcelIndex, store: &DocumentStore, snap_enabled: bool) -> Self {
        Self {
            index,
            notes: ParcelNotes::load(store),
            drawings: DrawingSet::load(store),
            snap_enabled,
        }
    }

    /// Écrit notes et dessins dans le magasin
    pub fn persist(&self, store: &DocumentStore) -> Result<()> {
        self.notes.save(store)?;
        self.drawings.save(store)
    }

    pub fn index(&self) -> &ParcelIndex {
        &self.index
    }

    pub fn notes(&self) -> &ParcelNotes {
        &self.notes
    }

    pub fn drawings(&self) -> &DrawingSet {
        &self.drawings
    }

    pub fn snap_enabled(&self) -> bool {
        self.snap_enabled
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snap_enabled = enabled;
    }

    /// Parcelle sous le point, avec sa note éventuelle
    pub fn lookup(&self, point: Coord) -> Option<ParcelHit> {
        let parcel = self.index.find_containing(point)?;
        Some(ParcelHit {
            id: parcel.id.clone(),
            label: parcel.label.clone(),
            note: self.notes.get(&parcel.id).map(str::to_string),
        })
    }

    /// Attache une note à une parcelle de l'index.
    ///
    /// Un identifiant inconnu est refusé; un texte vide supprime la note.
    pub fn set_note(&mut self, parcel_id: &str, text: &str) -> Result<()> {
        if self.index.get(parcel_id).is_none() {
            anyhow::bail!("Unknown parcel: {}", parcel_id);
        }
        self.notes.set(parcel_id, text);
        Ok(())
    }

    /// Supprime la note, vraie si elle existait
    pub fn remove_note(&mut self, parcel_id: &str) -> bool {
        self.notes.remove(parcel_id)
    }

    /// Ajoute un dessin.
    ///
    /// Si l'accrochage est actif et qu'une parcelle surfacique se trouve
    /// sous le point représentatif de la forme, la géométrie dessinée est
    /// remplacée par celle de la parcelle et `snapped_to` la référence.
    pub fn add_drawing(&mut self, geometry: Geometry, note: Option<String>) -> &Drawing {
        let snapped: Option<(String, Geometry)> = if self.snap_enabled {
            let resolver = SnapResolver::new(&self.index);
            resolver.resolve_parcel(&geometry).and_then(|parcel| {
                parcel
                    .geometry
                    .clone()
                    .map(|replacement| (parcel.id.clone(), replacement))
            })
        } else {
            None
        };

        match snapped {
            Some((parcel_id, replacement)) => {
                debug!(parcel = %parcel_id, "Drawing snapped to parcel");
                self.drawings.add(replacement, note, Some(parcel_id))
            }
            None => self.drawings.add(geometry, note, None),
        }
    }

    /// Supprime le dessin, vrai s'il existait
    pub fn remove_drawing(&mut self, id: &str) -> bool {
        self.drawings.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::point;

    const PARCELS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"PARCEL_ID": "A", "LOT": "12", "PLAN": "DP4567"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0,0],[0,10],[10,10],[10,0],[0,0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"PARCEL_ID": "B"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[20,0],[20,10],[30,10],[30,0],[20,0]]]
                }
            }
        ]
    }"#;

    fn session() -> AnnotationSession {
        let index = ParcelIndex::from_geojson_str(PARCELS).unwrap();
        AnnotationSession::new(index, true)
    }

    #[test]
    fn test_lookup_with_note() {
        let mut session = session();
        session.set_note("A", "à contrôler").unwrap();

        let hit = session.lookup(Coord { x: 5.0, y: 5.0 }).unwrap();
        assert_eq!(hit.id, "A");
        assert_eq!(hit.label, "12/DP4567");
        assert_eq!(hit.note.as_deref(), Some("à contrôler"));

        let other = session.lookup(Coord { x: 25.0, y: 5.0 }).unwrap();
        assert_eq!(other.id, "B");
        assert!(other.note.is_none());

        assert!(session.lookup(Coord { x: 15.0, y: 5.0 }).is_none());
    }

    #[test]
    fn test_note_rejects_unknown_parcel() {
        let mut session = session();
        assert!(session.set_note("Z", "texte").is_err());
        assert!(session.notes().is_empty());
    }

    #[test]
    fn test_drawing_snaps_when_enabled() {
        let mut session = session();

        let marker = Geometry::Point(point! { x: 5.0, y: 5.0 });
        let drawing = session.add_drawing(marker, Some("repère".to_string()));

        assert_eq!(drawing.snapped_to.as_deref(), Some("A"));
        assert!(matches!(drawing.geometry, Geometry::Polygon(_)));
        assert_eq!(drawing.note.as_deref(), Some("repère"));
    }

    #[test]
    fn test_drawing_keeps_shape_when_disabled() {
        let mut session = session();
        session.set_snap_enabled(false);

        let marker = Geometry::Point(point! { x: 5.0, y: 5.0 });
        let drawing = session.add_drawing(marker, None);

        assert!(drawing.snapped_to.is_none());
        assert!(matches!(drawing.geometry, Geometry::Point(_)));
    }

    #[test]
    fn test_drawing_keeps_shape_in_open_space() {
        let mut session = session();

        let marker = Geometry::Point(point! { x: 15.0, y: 5.0 });
        let drawing = session.add_drawing(marker, None);

        assert!(drawing.snapped_to.is_none());
        assert!(matches!(drawing.geometry, Geometry::Point(_)));
    }
}
