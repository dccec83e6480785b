//! # parcel-index
//!
//! Recherche point-dans-parcelle et accrochage de formes pour les couches
//! cadastrales GeoJSON.
//!
//! ## Features
//!
//! - Index construit une seule fois, interrogé en lecture seule
//! - Pré-filtre par boîtes englobantes avant le test polygonal
//! - Lancer de rayon avec gestion des trous et des multipolygones
//! - Dégradation gracieuse: un record corrompu devient inatteignable,
//!   jamais une erreur
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geo::Coord;
//! use parcel_index::{load_parcels, SnapResolver};
//! use std::path::Path;
//!
//! let index = load_parcels(Path::new("parcels.geojson"))?;
//!
//! if let Some(parcel) = index.find_containing(Coord { x: 153.02, y: -27.47 }) {
//!     println!("{} ({})", parcel.label, parcel.id);
//! }
//!
//! let resolver = SnapResolver::new(&index);
//! if let Some(geometry) = resolver.resolve(&drawn_shape) {
//!     // remplacer la forme dessinée par la géométrie de la parcelle
//! }
//! ```

pub mod bbox;
pub mod contains;
pub mod error;
pub mod index;
pub mod snap;

pub use bbox::BoundingBox;
pub use error::ParcelError;
pub use index::{load_parcels, Parcel, ParcelIndex};
pub use snap::{representative_point, SnapResolver};
