//! Magasin de documents JSON persistés par clé
//!
//! Équivalent fichier du stockage clé-valeur du navigateur: un document
//! JSON par clé, relu tel quel à la session suivante. Un document corrompu
//! dégrade en absence, jamais en erreur.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Magasin clé → document JSON, un fichier `<clé>.json` par entrée
#[derive(Debug)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    /// Ouvre le magasin, en créant le répertoire au besoin
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).context(format!(
            "Failed to create store directory: {}",
            dir.display()
        ))?;
        Ok(Self { dir })
    }

    /// Document stocké sous la clé, `None` si absent ou illisible
    pub fn get(&self, key: &str) -> Option<Value> {
        let path = self.path_for(key);
        if !path.exists() {
            return None;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(key = key, error = %e, "Unreadable document, treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = key, error = %e, "Corrupt document, treating as absent");
                None
            }
        }
    }

    /// Document désérialisé vers `T`, `None` si absent ou incompatible
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(key = key, error = %e, "Unexpected document shape, treating as absent");
                None
            }
        }
    }

    /// Écrit le document sous la clé (remplace l'existant)
    pub fn put(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.path_for(key);
        let content = serde_json::to_string(value)?;
        fs::write(&path, content)
            .context(format!("Failed to write document: {}", path.display()))
    }

    /// Sérialise et écrit le document sous la clé
    pub fn put_as<T: Serialize>(&self, key: &str, doc: &T) -> Result<()> {
        let value = serde_json::to_value(doc)?;
        self.put(key, &value)
    }

    /// Supprime le document; absent = déjà supprimé
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)
                .context(format!("Failed to remove document: {}", path.display()))?;
        }
        Ok(())
    }

    /// Chemin du fichier pour la clé, caractères non sûrs remplacés
    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store(name: &str) -> DocumentStore {
        let dir = std::env::temp_dir().join(format!("parcel_annot_store_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        DocumentStore::open(dir).unwrap()
    }

    #[test]
    fn test_put_get_roundtrip() {
        let store = temp_store("roundtrip");

        let doc = json!({"a": 1, "b": ["x", "y"]});
        store.put("test_doc", &doc).unwrap();
        assert_eq!(store.get("test_doc"), Some(doc));
    }

    #[test]
    fn test_missing_key_is_absent() {
        let store = temp_store("missing");
        assert!(store.get("nothing").is_none());
    }

    #[test]
    fn test_remove() {
        let store = temp_store("remove");

        store.put("doc", &json!(42)).unwrap();
        store.remove("doc").unwrap();
        assert!(store.get("doc").is_none());

        // Supprimer une clé absente n'est pas une erreur
        store.remove("doc").unwrap();
    }

    #[test]
    fn test_corrupt_document_is_absent() {
        let store = temp_store("corrupt");

        store.put("doc", &json!({"ok": true})).unwrap();
        std::fs::write(store.path_for("doc"), "{not json").unwrap();
        assert!(store.get("doc").is_none());
    }

    #[test]
    fn test_key_sanitization() {
        let store = temp_store("sanitize");

        store.put("../escape/attempt", &json!(1)).unwrap();
        let path = store.path_for("../escape/attempt");
        assert_eq!(path.file_name().unwrap(), "___escape_attempt.json");
        assert_eq!(store.get("../escape/attempt"), Some(json!(1)));
    }
}
