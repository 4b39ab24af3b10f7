//! File-backed settings store.
//!
//! One JSON object per namespace, stored at `<dir>/<namespace>.json`. The
//! whole file is rewritten on every `set` through a temp file in the same
//! directory followed by an atomic rename, so the file on disk is always a
//! complete snapshot.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::traits::DurableStore;
use crate::value::Value;

/// Flush/sync strategy for settings file rewrites.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` the temp file before every rename (safest, highest latency).
    EveryWrite,
    /// Rely on OS page-cache buffering.
    #[default]
    OsDefault,
}

/// Configuration for [`FileDurableStore`].
#[derive(Clone, Debug, Default)]
pub struct FileStoreConfig {
    /// Sync strategy applied on each rewrite.
    pub sync_mode: SyncMode,
}

/// Durable store persisted as a single JSON settings file.
///
/// Reads are served from an in-memory view loaded at open time. Writes are
/// serialized through `write_lock`; the in-memory view is only updated after
/// the rename succeeds, so a failed write commits nothing.
pub struct FileDurableStore {
    path: PathBuf,
    config: FileStoreConfig,
    values: RwLock<BTreeMap<String, Value>>,
    write_lock: Mutex<()>,
}

impl FileDurableStore {
    /// Open (or create) the settings file for `namespace` under `dir`.
    ///
    /// A missing file is an empty store. A file that cannot be parsed fails
    /// with [`StoreError::Corrupt`] rather than being silently discarded.
    pub fn open(dir: &Path, namespace: &str, config: FileStoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{namespace}.json"));

        let values = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
                    path: path.clone(),
                    reason: e.to_string(),
                })?
            }
        } else {
            BTreeMap::new()
        };

        info!(path = %path.display(), entries = values.len(), "opened settings file");

        Ok(Self {
            path,
            config,
            values: RwLock::new(values),
            write_lock: Mutex::new(()),
        })
    }

    /// Path to the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return a sorted list of all stored names.
    pub fn names(&self) -> StoreResult<Vec<String>> {
        let map = self.values.read().map_err(poisoned)?;
        Ok(map.keys().cloned().collect())
    }

    /// Write `snapshot` to disk via temp file + rename.
    fn persist(&self, snapshot: &BTreeMap<String, Value>) -> StoreResult<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        tmp.flush()?;
        if self.config.sync_mode == SyncMode::EveryWrite {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        debug!(path = %self.path.display(), entries = snapshot.len(), "settings file persisted");
        Ok(())
    }
}

impl DurableStore for FileDurableStore {
    fn get(&self, name: &str) -> StoreResult<Option<Value>> {
        let map = self.values.read().map_err(poisoned)?;
        Ok(map.get(name).cloned())
    }

    fn set(&self, name: &str, value: Value) -> StoreResult<()> {
        let _writer = self.write_lock.lock().map_err(poisoned)?;

        let mut snapshot = self.values.read().map_err(poisoned)?.clone();
        snapshot.insert(name.to_string(), value.clone());
        self.persist(&snapshot)?;

        let mut map = self.values.write().map_err(poisoned)?;
        map.insert(name.to_string(), value);
        Ok(())
    }

    fn contains(&self, name: &str) -> StoreResult<bool> {
        let map = self.values.read().map_err(poisoned)?;
        Ok(map.contains_key(name))
    }
}

impl std::fmt::Debug for FileDurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDurableStore")
            .field("path", &self.path)
            .field("sync_mode", &self.config.sync_mode)
            .finish()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Unavailable(format!("lock poisoned: {e}"))
}
