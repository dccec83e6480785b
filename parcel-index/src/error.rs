//! Types d'erreurs pour le crate parcel-index

use thiserror::Error;

/// Erreurs pouvant survenir lors du chargement de la source parcellaire.
///
/// Les requêtes (`find_containing`, `resolve`) sont totales et ne produisent
/// jamais d'erreur; seul le chargement du GeoJSON peut échouer.
#[derive(Debug, Error)]
pub enum ParcelError {
    /// Erreur d'I/O lors de la lecture du fichier source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document GeoJSON illisible
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(#[from] geojson::Error),

    /// Document GeoJSON valide mais sans features
    #[error("Expected a FeatureCollection or Feature, got a bare geometry")]
    NotAFeatureCollection,
}
