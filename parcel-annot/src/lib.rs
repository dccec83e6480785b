//! # parcel-annot
//!
//! Annotation d'une couche parcellaire cadastrale: notes libres par
//! parcelle, dessins avec notes, accrochage des dessins aux parcelles.
//!
//! ## Features
//!
//! - Session explicite possédant index, notes, dessins et réglage
//!   d'accrochage
//! - Persistance clé → document JSON (équivalent fichier du stockage
//!   navigateur)
//! - Export GeoJSON des annotations
//! - CLI simple
//!
//! ## Usage CLI
//!
//! ```bash
//! # Parcelle sous un point
//! parcel-annot --parcels ./parcels.geojson lookup -x 153.02 -y -27.47
//!
//! # Note sur une parcelle
//! parcel-annot note 12DP4567 "à vérifier sur place"
//!
//! # Dessin avec accrochage
//! parcel-annot draw --shape ./marker.geojson --note "accès chantier"
//!
//! # Export des annotations
//! parcel-annot export --output ./annotations.geojson
//! ```

pub mod config;
pub mod drawings;
pub mod export;
pub mod notes;
pub mod session;
pub mod store;

pub use config::Config;
pub use session::{AnnotationSession, ParcelHit};
pub use store::DocumentStore;
