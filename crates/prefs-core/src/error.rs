use std::path::PathBuf;

use prefs_store::StoreError;

/// Errors from the list codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Stored text does not parse as a list of the element type.
    #[error("malformed list data: {0}")]
    Malformed(String),

    /// The list could not be serialized.
    #[error("cannot encode list: {0}")]
    Encode(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors from loading a [`PrefsConfig`](crate::PrefsConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(String),
}

/// Errors surfaced by [`PreferenceManager`](crate::PreferenceManager).
#[derive(Debug, thiserror::Error)]
pub enum PrefError {
    /// The blob stored under a list key does not decode under its codec.
    #[error("cannot decode list stored under {key}: {source}")]
    Decode {
        key: &'static str,
        source: CodecError,
    },

    /// A list could not be encoded for persistence. Nothing was written.
    #[error("cannot encode list for {key}: {source}")]
    Encode {
        key: &'static str,
        source: CodecError,
    },

    /// No registered key has this storage name.
    #[error("unknown key: {0}")]
    UnknownKey(String),

    /// The durable store failed or is unavailable.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for preference operations.
pub type PrefResult<T> = Result<T, PrefError>;
