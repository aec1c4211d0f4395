use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::wallet::WalletConnector;
use super::StateError;
use crate::registry::Address;

pub const CONNECTOR_KEY: &str = "gnusdao.connector";
const USER_SETTINGS_PREFIX: &str = "gnusdao.settings.";

/// Per-address preferences, stored as one JSON blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserSettings {
    pub theme: String,
    pub show_testnets: bool,
    pub notifications: bool,
    pub default_vote_reason: Option<String>,
    pub favorite_proposals: Vec<u64>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            show_testnets: false,
            notifications: true,
            default_vote_reason: None,
            favorite_proposals: Vec::new(),
        }
    }
}

/// File-backed key/value store
///
/// A missing or unreadable file yields an empty store. Every mutation is
/// written through to disk.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl SettingsStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Ignoring corrupt settings file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Ignoring unreadable settings file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        debug!("Loaded {} settings from {}", entries.len(), path.display());
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value for `key`; entries that no longer deserialize read as absent
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Ignoring malformed setting {}: {}", key, e);
                None
            }
        }
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StateError> {
        let value = serde_json::to_value(value).map_err(|e| StateError::Storage(e.to_string()))?;
        self.entries.insert(key.to_string(), value);
        self.save()
    }

    pub fn remove(&mut self, key: &str) -> Result<(), StateError> {
        if self.entries.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn save(&self) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StateError::Storage(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| StateError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| StateError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StateError::Storage(e.to_string()))
    }

    pub fn cached_connector(&self) -> Option<WalletConnector> {
        self.get(CONNECTOR_KEY)
    }

    pub fn set_cached_connector(&mut self, connector: Option<WalletConnector>) -> Result<(), StateError> {
        match connector {
            Some(connector) => self.set(CONNECTOR_KEY, &connector),
            None => self.remove(CONNECTOR_KEY),
        }
    }

    pub fn user_settings(&self, address: &Address) -> UserSettings {
        self.get(&user_settings_key(address)).unwrap_or_default()
    }

    pub fn set_user_settings(&mut self, address: &Address, settings: &UserSettings) -> Result<(), StateError> {
        self.set(&user_settings_key(address), settings)
    }
}

fn user_settings_key(address: &Address) -> String {
    format!("{}{}", USER_SETTINGS_PREFIX, address)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> Address {
        "0xAbCdEf0000000000000000000000000000000001".parse().unwrap()
    }

    #[test]
    fn test_unreadable_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();
        assert_eq!(SettingsStore::open(&path).keys().count(), 0);

        // A directory in place of the file
        assert_eq!(SettingsStore::open(dir.path()).keys().count(), 0);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("nope.json"));
        assert_eq!(store.keys().count(), 0);
        assert_eq!(store.cached_connector(), None);
    }

    #[test]
    fn test_corrupt_file_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        let mut store = SettingsStore::open(&path);
        assert_eq!(store.keys().count(), 0);
        store.set("k", &1u32).unwrap();
        assert_eq!(SettingsStore::open(&path).get::<u32>("k"), Some(1));
    }

    #[test]
    fn test_user_settings_persist_per_address() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut store = SettingsStore::open(&path);
        assert_eq!(store.user_settings(&address()), UserSettings::default());

        let settings = UserSettings {
            theme: "light".to_string(),
            favorite_proposals: vec![3, 7],
            ..Default::default()
        };
        store.set_user_settings(&address(), &settings).unwrap();

        let reopened = SettingsStore::open(&path);
        assert_eq!(reopened.user_settings(&address()), settings);
        assert_eq!(reopened.user_settings(&Address::ZERO), UserSettings::default());
    }

    #[test]
    fn test_partial_blob_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let key = user_settings_key(&address());
        fs::write(&path, format!(r#"{{"{}": {{"theme": "light"}}}}"#, key)).unwrap();

        let settings = SettingsStore::open(&path).user_settings(&address());
        assert_eq!(settings.theme, "light");
        assert!(settings.notifications);
    }

    #[test]
    fn test_connector_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut store = SettingsStore::open(&path);

        store.set_cached_connector(Some(WalletConnector::WalletConnect)).unwrap();
        assert_eq!(SettingsStore::open(&path).cached_connector(), Some(WalletConnector::WalletConnect));

        store.set_cached_connector(None).unwrap();
        assert_eq!(SettingsStore::open(&path).cached_connector(), None);
    }
}
