//! Persistent configuration storage.
//!
//! Credentials and generic key/value settings live in a JSON file under
//! the platform config directory. Writes go through a temp file plus
//! rename so a crash mid-save never truncates the store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use enteliscript_types::error::{EnteliError, Result};

/// Credential and key/value persistence between sessions.
pub trait CredentialStore: Send {
    /// Stored username and password, either of which may be unset.
    fn credentials(&self) -> (Option<String>, Option<String>);

    /// Store both credentials and persist immediately.
    fn set_credentials(&mut self, username: &str, password: &str) -> Result<()>;

    /// Look up a generic setting.
    fn value(&self, key: &str) -> Option<String>;

    /// Store a generic setting and persist immediately.
    fn set_value(&mut self, key: &str, value: &str) -> Result<()>;
}

/// On-disk layout of the config file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigData {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// JSON-file backed [`CredentialStore`].
#[derive(Debug)]
pub struct JsonConfigStore {
    path: PathBuf,
    data: ConfigData,
}

impl JsonConfigStore {
    /// Open the store at the platform default location
    /// (`<config dir>/enteliscript/config.json`).
    pub fn open_default() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| EnteliError::Config("no user config directory".to_string()))?;
        Self::open(base.join("enteliscript").join("config.json"))
    }

    /// Open a store at an explicit path. A missing file yields an empty
    /// store; a present but malformed file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            ConfigData::default()
        };
        Ok(Self { path, data })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.data)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("config saved to {}", self.path.display());
        Ok(())
    }
}

impl CredentialStore for JsonConfigStore {
    fn credentials(&self) -> (Option<String>, Option<String>) {
        (self.data.username.clone(), self.data.password.clone())
    }

    fn set_credentials(&mut self, username: &str, password: &str) -> Result<()> {
        self.data.username = Some(username.to_string());
        self.data.password = Some(password.to_string());
        self.save()
    }

    fn value(&self, key: &str) -> Option<String> {
        self.data.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        self.data
            .values
            .insert(key.to_string(), value.to_string());
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_store_path() -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "enteliscript-config-test-{}-{n}",
            std::process::id()
        ))
        .join("config.json")
    }

    #[test]
    fn missing_file_yields_empty_store() {
        let store = JsonConfigStore::open(temp_store_path()).unwrap();
        assert_eq!(store.credentials(), (None, None));
        assert_eq!(store.value("host"), None);
    }

    #[test]
    fn credentials_round_trip_on_disk() {
        let path = temp_store_path();
        {
            let mut store = JsonConfigStore::open(&path).unwrap();
            store.set_credentials("alice", "hunter2").unwrap();
        }
        let store = JsonConfigStore::open(&path).unwrap();
        assert_eq!(
            store.credentials(),
            (Some("alice".to_string()), Some("hunter2".to_string()))
        );
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn generic_values_round_trip() {
        let path = temp_store_path();
        {
            let mut store = JsonConfigStore::open(&path).unwrap();
            store.set_value("host", "bms.example.net").unwrap();
            store.set_value("port", "8080").unwrap();
        }
        let store = JsonConfigStore::open(&path).unwrap();
        assert_eq!(store.value("host").as_deref(), Some("bms.example.net"));
        assert_eq!(store.value("port").as_deref(), Some("8080"));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_store_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json at all").unwrap();
        assert!(JsonConfigStore::open(&path).is_err());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let path = temp_store_path();
        let mut store = JsonConfigStore::open(&path).unwrap();
        store.set_value("k", "v").unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
