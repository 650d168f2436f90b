//! API key resolution and persistence.
//!
//! Three string credentials drive the app: the two GIF search provider keys
//! and the optional fallback language-model key. Resolution order per
//! service: locally persisted user value, then the service's environment
//! variable (with the two conventional build-tool-prefixed variants kept
//! for compatibility with the original deployment), then empty. A persisted
//! user value always wins over every default.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Fixed identifiers under which the three values are persisted.
pub const GIPHY_KEY: &str = "giphy_key";
pub const TENOR_KEY: &str = "tenor_key";
pub const OPENAI_KEY: &str = "openai_key";

const GIPHY_ENV: [&str; 3] = ["GIPHY_API_KEY", "VITE_GIPHY_API_KEY", "REACT_APP_GIPHY_API_KEY"];
const TENOR_ENV: [&str; 3] = ["TENOR_API_KEY", "VITE_TENOR_API_KEY", "REACT_APP_TENOR_API_KEY"];

/// The resolved credential set used by search and chat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeys {
    /// Giphy API key; empty means the provider is not configured
    pub giphy: String,
    /// Tenor API key; empty means the provider is not configured
    pub tenor: String,
    /// Optional OpenAI fallback key, persisted-only (no environment default)
    pub openai: Option<String>,
}

impl ApiKeys {
    /// Resolves the credential set from the store and the environment.
    pub fn resolve(store: &KeyStore) -> Self {
        Self {
            giphy: store
                .get(GIPHY_KEY)
                .cloned()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| first_env(&GIPHY_ENV)),
            tenor: store
                .get(TENOR_KEY)
                .cloned()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| first_env(&TENOR_ENV)),
            openai: store.get(OPENAI_KEY).cloned().filter(|v| !v.is_empty()),
        }
    }

    /// Persists the set.
    ///
    /// The two search-provider keys are always written; the fallback key is
    /// written only when non-empty, so saving an untouched settings form
    /// never clobbers a previously stored value.
    pub fn save(&self, store: &mut KeyStore) -> io::Result<()> {
        store.set(GIPHY_KEY, &self.giphy)?;
        store.set(TENOR_KEY, &self.tenor)?;
        if let Some(openai) = self.openai.as_deref().filter(|v| !v.is_empty()) {
            store.set(OPENAI_KEY, openai)?;
        }
        Ok(())
    }

    /// Whether at least one GIF provider is usable.
    pub fn any_gif_provider(&self) -> bool {
        !self.giphy.is_empty() || !self.tenor.is_empty()
    }
}

/// Returns the first non-empty value among the named environment variables.
fn first_env(names: &[&str]) -> String {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

/// Persistent storage for API keys.
///
/// A flat string map in a JSON file under the user's home directory,
/// read at startup and overwritten on settings save.
#[derive(Debug, Serialize, Deserialize)]
pub struct KeyStore {
    /// Map of identifiers to their values
    keys: HashMap<String, String>,
    /// Path to the key file
    file_path: PathBuf,
}

impl KeyStore {
    /// Creates a store backed by the default path (`~/.heymeme/keys.json`)
    /// and loads any existing keys from it.
    pub fn new() -> io::Result<Self> {
        let home_dir = dirs::home_dir().expect("Could not find home directory");
        Self::with_path(home_dir.join(".heymeme").join("keys.json"))
    }

    /// Creates a store backed by an explicit file path.
    pub fn with_path(file_path: PathBuf) -> io::Result<Self> {
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut store = KeyStore {
            keys: HashMap::new(),
            file_path,
        };
        store.load()?;
        Ok(store)
    }

    fn load(&mut self) -> io::Result<()> {
        match File::open(&self.file_path) {
            Ok(mut file) => {
                let mut contents = String::new();
                file.read_to_string(&mut contents)?;
                self.keys = serde_json::from_str(&contents).unwrap_or_default();
                Ok(())
            }
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn save(&self) -> io::Result<()> {
        let contents = serde_json::to_string_pretty(&self.keys)?;
        let mut file = File::create(&self.file_path)?;
        file.write_all(contents.as_bytes())
    }

    /// Sets a value for the given identifier and writes the file.
    pub fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.keys.insert(key.to_string(), value.to_string());
        self.save()
    }

    /// Retrieves a value for the given identifier.
    pub fn get(&self, key: &str) -> Option<&String> {
        self.keys.get(key)
    }

    /// Deletes a value and writes the file.
    pub fn delete(&mut self, key: &str) -> io::Result<()> {
        self.keys.remove(key);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn temp_store(dir: &tempfile::TempDir) -> KeyStore {
        KeyStore::with_path(dir.path().join("keys.json")).unwrap()
    }

    #[test]
    fn store_roundtrip_survives_reload() {
        let dir = tempdir().unwrap();
        let mut store = temp_store(&dir);
        store.set(GIPHY_KEY, "g-123").unwrap();
        store.set(TENOR_KEY, "t-456").unwrap();

        let reloaded = KeyStore::with_path(dir.path().join("keys.json")).unwrap();
        assert_eq!(reloaded.get(GIPHY_KEY).map(String::as_str), Some("g-123"));
        assert_eq!(reloaded.get(TENOR_KEY).map(String::as_str), Some("t-456"));
        assert!(reloaded.get(OPENAI_KEY).is_none());
    }

    #[test]
    fn empty_fallback_key_does_not_overwrite_stored_value() {
        let dir = tempdir().unwrap();
        let mut store = temp_store(&dir);
        store.set(OPENAI_KEY, "sk-old").unwrap();

        let keys = ApiKeys {
            giphy: "g".to_string(),
            tenor: "t".to_string(),
            openai: Some(String::new()),
        };
        keys.save(&mut store).unwrap();
        assert_eq!(store.get(OPENAI_KEY).map(String::as_str), Some("sk-old"));

        let keys = ApiKeys {
            openai: Some("sk-new".to_string()),
            ..keys
        };
        keys.save(&mut store).unwrap();
        assert_eq!(store.get(OPENAI_KEY).map(String::as_str), Some("sk-new"));
    }

    #[test]
    fn stored_value_beats_environment() {
        let dir = tempdir().unwrap();
        let mut store = temp_store(&dir);
        store.set(GIPHY_KEY, "from-store").unwrap();
        std::env::set_var("GIPHY_API_KEY", "from-env");

        let keys = ApiKeys::resolve(&store);
        assert_eq!(keys.giphy, "from-store");
        std::env::remove_var("GIPHY_API_KEY");
    }

    #[test]
    fn first_env_walks_the_variant_chain() {
        std::env::set_var("REACT_APP_HEYMEME_TEST_KEY", "react-value");
        assert_eq!(
            first_env(&[
                "HEYMEME_TEST_KEY",
                "VITE_HEYMEME_TEST_KEY",
                "REACT_APP_HEYMEME_TEST_KEY"
            ]),
            "react-value"
        );
        std::env::remove_var("REACT_APP_HEYMEME_TEST_KEY");
        assert_eq!(first_env(&["HEYMEME_TEST_KEY_UNSET"]), "");
    }

    #[test]
    fn any_gif_provider_requires_one_key() {
        let none = ApiKeys::default();
        assert!(!none.any_gif_provider());
        let tenor_only = ApiKeys {
            tenor: "t".into(),
            ..ApiKeys::default()
        };
        assert!(tenor_only.any_gif_provider());
    }
}
