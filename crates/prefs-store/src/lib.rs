//! Durable key/value medium for the typed preference store.
//!
//! This crate is the synchronous string/int storage layer that the typed
//! preference façade in `prefs-core` sits on. It knows nothing about keys,
//! codecs, or lists: it maps names to [`Value`]s and persists them.
//!
//! # Storage Backends
//!
//! All backends implement the [`DurableStore`] trait:
//!
//! - [`InMemoryDurableStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileDurableStore`] -- one JSON settings file per namespace
//!
//! # Design Rules
//!
//! 1. `set` replaces a whole value atomically; readers never see torn values.
//! 2. A `get` followed by a `set` is not atomic; the store never serializes
//!    callers' read-modify-write sequences.
//! 3. Reading a name as the wrong kind is an error, never a coercion.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;
pub mod value;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use file::{FileDurableStore, FileStoreConfig, SyncMode};
pub use memory::InMemoryDurableStore;
pub use traits::DurableStore;
pub use value::Value;
