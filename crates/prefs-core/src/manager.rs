//! Typed façade over a [`DurableStore`].
//!
//! The two value families carry different mutation contracts:
//!
//! - **Int keys** are read and written with no synchronization at all. A
//!   `get_int` followed by `set_int(v + 1)` from several threads loses
//!   updates. This is the baseline, not a bug; callers that need an atomic
//!   increment use [`PreferenceManager::update_int_serialized`].
//! - **List keys** mutate through [`ListKey::update`], which runs the whole
//!   decode → apply → encode → persist sequence under the [`MutationLock`].
//!   Reads via [`PreferenceManager::get_list`] never take the lock; they see
//!   the last fully persisted blob.

use std::path::Path;

use prefs_store::{DurableStore, FileDurableStore, InMemoryDurableStore};
use tracing::{debug, warn};

use crate::codec::{ListCodec, EMPTY_LIST};
use crate::config::{DecodePolicy, PrefsConfig};
use crate::error::{PrefError, PrefResult};
use crate::keys::{IntKey, Key, ListKey};
use crate::lock::{LockMode, MutationLock};
use crate::update::UpdateType;

/// Default returned by [`PreferenceManager::get_int`] for unwritten keys.
pub const DEFAULT_INT: i32 = 0;

/// Typed preference store.
pub struct PreferenceManager<S: DurableStore> {
    store: S,
    lock: MutationLock,
    config: PrefsConfig,
}

impl PreferenceManager<FileDurableStore> {
    /// Open the settings file named by `config` and build a manager on it.
    pub fn open(config: PrefsConfig) -> PrefResult<Self> {
        let store = FileDurableStore::open(
            &config.data_dir,
            &config.namespace,
            config.file_store_config(),
        )?;
        Ok(Self::new(store, config))
    }

    /// Read a TOML config from `path` and open the settings file it names.
    pub fn load(path: &Path) -> PrefResult<Self> {
        Self::open(PrefsConfig::load(path)?)
    }
}

impl PreferenceManager<InMemoryDurableStore> {
    /// A manager over a fresh in-memory store with default configuration.
    pub fn in_memory() -> Self {
        Self::new(InMemoryDurableStore::new(), PrefsConfig::default())
    }
}

impl<S: DurableStore> PreferenceManager<S> {
    pub fn new(store: S, config: PrefsConfig) -> Self {
        Self {
            store,
            lock: MutationLock::new(config.lock_mode),
            config,
        }
    }

    /// The underlying durable store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &PrefsConfig {
        &self.config
    }

    pub fn lock_mode(&self) -> LockMode {
        self.lock.mode()
    }

    // ---- Scalar path (unguarded) ----

    /// Write `value` for `key` immediately. Takes no lock.
    pub fn set_int(&self, key: IntKey, value: i32) -> PrefResult<()> {
        self.store.set_int(key.name(), value)?;
        Ok(())
    }

    /// Read `key`, or [`DEFAULT_INT`] if never written. Takes no lock.
    pub fn get_int(&self, key: IntKey) -> PrefResult<i32> {
        Ok(self.store.get_int(key.name(), DEFAULT_INT)?)
    }

    /// Read-modify-write `key` under the mutation lock and return the new
    /// value.
    ///
    /// Only serializes against other callers of this method (and, in global
    /// lock mode, list mutations). Plain `set_int` calls still race with it.
    pub fn update_int_serialized(
        &self,
        key: IntKey,
        f: impl FnOnce(i32) -> i32,
    ) -> PrefResult<i32> {
        self.with_mutation_lock(key.name(), || {
            let next = f(self.get_int(key)?);
            self.set_int(key, next)?;
            Ok(next)
        })
    }

    // ---- List path (lock-guarded mutations) ----

    /// Decode the list stored under `key`.
    ///
    /// Returns the empty list when nothing is stored or the stored value is
    /// the canonical empty form. Does not take the mutation lock.
    pub fn get_list<K: ListKey>(&self, key: K) -> PrefResult<Vec<K::Elem>> {
        self.load_list(&key)
    }

    /// Append `value` to the list under `key`.
    pub fn add_from_list<K: ListKey>(&self, key: K, value: K::Elem) -> PrefResult<()> {
        key.update(self, UpdateType::Add, value)
    }

    /// Remove the first element equal to `value` from the list under `key`.
    /// Removing an absent value is a no-op.
    pub fn remove_from_list<K: ListKey>(&self, key: K, value: K::Elem) -> PrefResult<()> {
        key.update(self, UpdateType::Remove, value)
    }

    /// Run `f` inside the exclusion domain for `name`.
    ///
    /// This is the hook [`ListKey::update`] uses to wrap its
    /// read-modify-write.
    pub fn with_mutation_lock<R>(&self, name: &str, f: impl FnOnce() -> R) -> R {
        self.lock.with_lock(name, f)
    }

    /// Decode, apply, encode, and persist one list mutation.
    ///
    /// Must run inside [`with_mutation_lock`](Self::with_mutation_lock);
    /// on its own it is an unguarded read-modify-write. Encoding happens
    /// before the single `set_string`, so a failure at either step leaves
    /// the stored blob untouched.
    pub(crate) fn update_list<K: ListKey + ?Sized>(
        &self,
        key: &K,
        kind: UpdateType,
        value: K::Elem,
    ) -> PrefResult<()> {
        let mut list = self.load_list(key)?;
        kind.apply(&mut list, value);

        let encoded = <K::Codec as ListCodec>::encode(&list).map_err(|source| PrefError::Encode {
            key: key.name(),
            source,
        })?;
        self.store.set_string(key.name(), &encoded)?;

        debug!(key = key.name(), update = %kind, len = list.len(), "list updated");
        Ok(())
    }

    fn load_list<K: ListKey + ?Sized>(&self, key: &K) -> PrefResult<Vec<K::Elem>> {
        let raw = self.store.get_string(key.name(), EMPTY_LIST)?;
        if raw == EMPTY_LIST {
            return Ok(Vec::new());
        }

        match <K::Codec as ListCodec>::decode(&raw) {
            Ok(list) => Ok(list),
            Err(source) => match self.config.decode_policy {
                DecodePolicy::Strict => Err(PrefError::Decode {
                    key: key.name(),
                    source,
                }),
                DecodePolicy::LenientEmpty => {
                    warn!(key = key.name(), error = %source, "malformed list data; treating as empty");
                    Ok(Vec::new())
                }
            },
        }
    }
}

impl<S: DurableStore + std::fmt::Debug> std::fmt::Debug for PreferenceManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceManager")
            .field("store", &self.store)
            .field("lock_mode", &self.lock.mode())
            .field("decode_policy", &self.config.decode_policy)
            .finish()
    }
}
