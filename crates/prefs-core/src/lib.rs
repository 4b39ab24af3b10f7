//! Typed preference store over a durable string/int medium.
//!
//! Values live under a closed set of statically named keys in two
//! families, and each family declares its own mutation contract:
//!
//! - [`IntKey`] -- scalar `i32`, default `0`. Reads and writes are
//!   unguarded; concurrent read-modify-write sequences can lose updates.
//! - [`LongListKey`] (and any [`ListKey`]) -- ordered list, default empty,
//!   stored as one encoded blob per key. Add/remove run under the
//!   [`MutationLock`] so concurrent mutations never lose values.
//!
//! # Design Rules
//!
//! 1. A key's storage name is a static constant and unique across kinds.
//! 2. A list mutation is decode → apply → encode → persist, whole-blob, O(n).
//! 3. Mutation lock acquisition is scoped; it is released on every exit path.
//! 4. List reads never take the lock and never see a torn value.
//! 5. Malformed list data is an error unless
//!    [`DecodePolicy::LenientEmpty`] is configured.

pub mod codec;
pub mod config;
pub mod error;
pub mod keys;
pub mod lock;
pub mod manager;
pub mod update;

pub use codec::{JsonListCodec, ListCodec, EMPTY_LIST};
pub use config::{DecodePolicy, PrefsConfig};
pub use error::{CodecError, CodecResult, ConfigError, PrefError, PrefResult};
pub use keys::{lookup, registry, IntKey, Key, KeyDescriptor, KeyKind, ListKey, LongListKey};
pub use lock::{LockMode, MutationLock};
pub use manager::{PreferenceManager, DEFAULT_INT};
pub use update::UpdateType;

// Re-export the storage layer so callers need only this crate.
pub use prefs_store::{
    DurableStore, FileDurableStore, InMemoryDurableStore, StoreError, SyncMode, Value,
};
