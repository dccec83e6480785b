//! Configuration de la session d'annotation

use std::path::PathBuf;

/// Configuration principale, chargée depuis l'environnement puis
/// surchargée par les arguments CLI
#[derive(Debug, Clone)]
pub struct Config {
    /// Fichier GeoJSON de la couche parcellaire
    pub parcels: PathBuf,

    /// Répertoire du magasin de documents
    pub store_dir: PathBuf,

    /// Accrochage des nouveaux dessins aux parcelles
    pub snap: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parcels: PathBuf::from("parcels.geojson"),
            store_dir: PathBuf::from(".parcel-annot"),
            snap: true,
        }
    }
}

impl Config {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            parcels: std::env::var("ANNOT_PARCELS")
                .map(PathBuf::from)
                .unwrap_or(defaults.parcels),
            store_dir: std::env::var("ANNOT_STORE")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_dir),
            snap: std::env::var("ANNOT_SNAP")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.snap),
        }
    }
}

/// Booléen permissif pour les variables d'environnement
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_default() {
        let config = Config::default();
        assert!(config.snap);
        assert_eq!(config.store_dir, PathBuf::from(".parcel-annot"));
    }
}
