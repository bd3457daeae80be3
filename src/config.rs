// Persisted CLI state: the `.box-ee.yaml` document holding the account email,
// the service address and the current session token.
//
// Nothing here touches the disk implicitly. `load` reads, `write` overwrites,
// and everything in between only mutates memory.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// File name of the persisted config, both in the working directory and in
/// the user's home directory.
pub const CONFIG_FILE: &str = ".box-ee.yaml";

/// Keys of the persisted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Email,
    Address,
    SessionToken,
}

impl ConfigKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Email => "email",
            ConfigKey::Address => "address",
            ConfigKey::SessionToken => "session_token",
        }
    }
}

/// On-disk shape of the config. Unset keys deserialize to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub session_token: String,
}

impl StoredConfig {
    pub fn get(&self, key: ConfigKey) -> &str {
        match key {
            ConfigKey::Email => &self.email,
            ConfigKey::Address => &self.address,
            ConfigKey::SessionToken => &self.session_token,
        }
    }

    fn slot(&mut self, key: ConfigKey) -> &mut String {
        match key {
            ConfigKey::Email => &mut self.email,
            ConfigKey::Address => &mut self.address,
            ConfigKey::SessionToken => &mut self.session_token,
        }
    }
}

/// Key/value store backed by a single YAML file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    values: StoredConfig,
    loaded: bool,
    writes: usize,
}

impl ConfigStore {
    /// Store backed by `path`. Nothing is read until [`ConfigStore::load`].
    pub fn at(path: impl Into<PathBuf>) -> Self {
        ConfigStore {
            path: path.into(),
            values: StoredConfig::default(),
            loaded: false,
            writes: 0,
        }
    }

    /// Store backed by the first existing `.box-ee.yaml` in the working
    /// directory or the home directory. When neither exists the working
    /// directory is used, which is where `init` creates the file.
    pub fn locate() -> Self {
        let local = PathBuf::from(CONFIG_FILE);
        if local.is_file() {
            return ConfigStore::at(local);
        }
        if let Some(home) = dirs::home_dir() {
            let global = home.join(CONFIG_FILE);
            if global.is_file() {
                return ConfigStore::at(global);
            }
        }
        ConfigStore::at(local)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Number of successful [`ConfigStore::write`] calls on this store.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Read the file into memory, replacing any in-memory state. A missing
    /// file is reported as [`Error::ConfigNotFound`], distinct from other
    /// read failures.
    pub fn load(&mut self) -> Result<&StoredConfig> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == IoErrorKind::NotFound => {
                return Err(Error::ConfigNotFound {
                    path: self.path.clone(),
                })
            }
            Err(source) => {
                return Err(Error::ConfigRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        // An empty file is a valid, empty config; serde_yaml reads it as null.
        self.values = if raw.trim().is_empty() {
            StoredConfig::default()
        } else {
            serde_yaml::from_str(&raw).map_err(|source| Error::ConfigParse {
                path: self.path.clone(),
                source,
            })?
        };
        self.loaded = true;
        debug!(path = %self.path.display(), "loaded config");
        Ok(&self.values)
    }

    /// Returns the empty string for unset keys. Never fails.
    pub fn get(&self, key: ConfigKey) -> &str {
        self.values.get(key)
    }

    /// In-memory only; call [`ConfigStore::write`] to persist.
    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        debug!(key = key.as_str(), "config value set");
        *self.values.slot(key) = value.into();
    }

    pub fn values(&self) -> &StoredConfig {
        &self.values
    }

    /// Overwrite the file with the current in-memory state.
    pub fn write(&mut self) -> Result<()> {
        let doc = serde_yaml::to_string(&self.values).map_err(Error::ConfigSerialize)?;
        std::fs::write(&self.path, doc).map_err(|source| Error::ConfigWrite {
            path: self.path.clone(),
            source,
        })?;
        self.writes += 1;
        debug!(path = %self.path.display(), "wrote config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let mut store = ConfigStore::at(dir.path().join(CONFIG_FILE));
        let err = store.load().unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
        assert!(!store.is_loaded());
    }

    #[test]
    fn unset_keys_read_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "email: me@example.com\n").unwrap();

        let mut store = ConfigStore::at(&path);
        store.load().unwrap();
        assert_eq!(store.get(ConfigKey::Email), "me@example.com");
        assert_eq!(store.get(ConfigKey::Address), "");
        assert_eq!(store.get(ConfigKey::SessionToken), "");
    }

    #[test]
    fn empty_file_loads_as_empty_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "").unwrap();

        let mut store = ConfigStore::at(&path);
        assert_eq!(store.load().unwrap(), &StoredConfig::default());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "email: [unterminated\n").unwrap();

        let err = ConfigStore::at(&path).load().unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn set_does_not_touch_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut store = ConfigStore::at(&path);
        store.set(ConfigKey::SessionToken, "abc");
        assert_eq!(store.get(ConfigKey::SessionToken), "abc");
        assert!(!path.exists());
    }

    #[test]
    fn rewriting_a_loaded_config_is_byte_identical() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut store = ConfigStore::at(&path);
        store.set(ConfigKey::Email, "me@example.com");
        store.set(ConfigKey::Address, "http://localhost:3000");
        store.set(ConfigKey::SessionToken, "abc123");
        store.write().unwrap();
        let first = std::fs::read(&path).unwrap();

        let mut reloaded = ConfigStore::at(&path);
        reloaded.load().unwrap();
        reloaded.write().unwrap();
        reloaded.write().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), first);
        assert_eq!(reloaded.writes(), 2);
    }
}
