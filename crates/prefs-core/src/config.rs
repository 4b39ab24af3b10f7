use std::path::{Path, PathBuf};

use prefs_store::{FileStoreConfig, SyncMode};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::lock::LockMode;

/// What a list read does when the stored blob does not decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Surface a decode error; mutations write nothing.
    #[default]
    Strict,
    /// Log a warning and treat the value as the empty list. The next
    /// mutation overwrites the malformed blob.
    LenientEmpty,
}

/// Configuration for a [`PreferenceManager`](crate::PreferenceManager).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefsConfig {
    /// Settings file name (without extension) inside `data_dir`.
    pub namespace: String,
    /// Directory holding settings files.
    pub data_dir: PathBuf,
    /// Partitioning of the mutation lock.
    pub lock_mode: LockMode,
    /// Handling of malformed list data.
    pub decode_policy: DecodePolicy,
    /// Sync strategy for the file-backed store.
    pub sync_mode: SyncMode,
}

impl Default for PrefsConfig {
    fn default() -> Self {
        Self {
            namespace: "selfUpdateRoutine".into(),
            data_dir: PathBuf::from(".prefs"),
            lock_mode: LockMode::Global,
            decode_policy: DecodePolicy::Strict,
            sync_mode: SyncMode::OsDefault,
        }
    }
}

impl PrefsConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Settings for the file-backed durable store.
    pub fn file_store_config(&self) -> FileStoreConfig {
        FileStoreConfig {
            sync_mode: self.sync_mode,
        }
    }
}
