//! Persisted user preferences.
//!
//! A small JSON file holding style defaults and persona state. Malformed
//! content never surfaces as an error: an unreadable or wrong-shaped file
//! is coerced to the default shape, and the repaired shape is written back
//! on the next save.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::persona::PersonaState;

/// Stored style defaults. These only fill fields the user left unset on a
/// query; they never introduce a bullet or sentence count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleDefaults {
    /// Soft word cap applied when the query itself sets none.
    #[serde(default)]
    pub max_words: Option<usize>,

    /// Prefix answers with a friendly lead-in matching the chosen format.
    #[serde(default)]
    pub leadins: bool,
}

/// The full preference document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prefs {
    #[serde(default)]
    pub style: StyleDefaults,

    #[serde(default)]
    pub persona: PersonaState,
}

/// File-backed preference store.
#[derive(Debug, Clone)]
pub struct PrefsStore {
    path: PathBuf,
}

impl PrefsStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Load preferences. A missing or malformed file yields defaults; a
    /// malformed file is additionally rewritten in the default shape so it
    /// does not stay broken.
    pub fn load(&self) -> Prefs {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Prefs::default(),
        };

        match serde_json::from_str::<Prefs>(&raw) {
            Ok(mut prefs) => {
                prefs.persona.sanitize();
                prefs
            }
            Err(e) => {
                tracing::warn!("preference file is malformed ({}), resetting", e);
                let prefs = Prefs::default();
                self.save(&prefs);
                prefs
            }
        }
    }

    /// Persist preferences. Failure is logged, never raised.
    pub fn save(&self, prefs: &Prefs) {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            tracing::warn!("could not create preference directory: {}", e);
            return;
        }

        match serde_json::to_string_pretty(prefs) {
            Ok(body) => {
                if let Err(e) = std::fs::write(&self.path, body) {
                    tracing::warn!("could not write preferences: {}", e);
                }
            }
            Err(e) => tracing::warn!("could not serialize preferences: {}", e),
        }
    }

    /// Apply `update` to the stored document and persist the result.
    pub fn update(&self, update: impl FnOnce(&mut Prefs)) -> Prefs {
        let mut prefs = self.load();
        update(&mut prefs);
        self.save(&prefs);
        prefs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> PrefsStore {
        let path = std::env::temp_dir().join(format!("kestrel-prefs-test-{}-{}.json", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        PrefsStore::new(path)
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let store = temp_store("missing");
        assert_eq!(store.load(), Prefs::default());
    }

    #[test]
    fn test_round_trip() {
        let store = temp_store("roundtrip");
        store.update(|p| {
            p.style.max_words = Some(80);
            p.style.leadins = true;
        });

        let loaded = store.load();
        assert_eq!(loaded.style.max_words, Some(80));
        assert!(loaded.style.leadins);
    }

    #[test]
    fn test_malformed_file_coerced_and_rewritten() {
        let store = temp_store("malformed");
        std::fs::write(&store.path, "\"just a string\"").unwrap();

        assert_eq!(store.load(), Prefs::default());

        // The file itself was repaired.
        let raw = std::fs::read_to_string(&store.path).unwrap();
        assert!(serde_json::from_str::<Prefs>(&raw).is_ok());
    }

    #[test]
    fn test_unknown_persona_layers_dropped_on_load() {
        let store = temp_store("layers");
        std::fs::write(&store.path, r#"{"persona": {"layers": ["shy", "pirate"]}}"#).unwrap();

        let prefs = store.load();
        assert_eq!(prefs.persona.layers, vec!["shy".to_string()]);
    }
}
