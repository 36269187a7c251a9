// src/errors.rs

//! Crate-wide error type.
//!
//! Every fatal condition of loading, merging, overriding and resolving a
//! configuration maps onto one [`ConfigError`] variant. Recoverable
//! conditions are not errors; see [`crate::diagnostics`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("malformed config {}: {message}", path.display())]
    MalformedConfig { path: PathBuf, message: String },

    #[error("unsupported config format for {} (expected .toml, .yaml or .yml)", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("cyclic `__default__` chain: {} is already being loaded", path.display())]
    CyclicDefault { path: PathBuf },

    #[error("invalid new key policy: {0} (expected \"raise\", \"warn\" or \"pass\")")]
    InvalidPolicy(String),

    #[error("conflicting key `{key}`: {reason}")]
    ConflictingKey { key: String, reason: String },

    #[error("unexpected key when merging configs: `{key}`")]
    MergeKey { key: String },

    #[error("cyclic references in configuration: unable to resolve `{key}`")]
    CyclicReference { key: String },

    #[error("unexpected key when applying overrides: `{key}`")]
    UnknownOverrideKey { key: String },

    #[error("invalid override: {0}")]
    InvalidOverride(String),

    #[error("invalid `__run__` section: {0}")]
    InvalidRunSection(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConfigError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::MalformedConfig {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn conflict(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::ConflictingKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Map an IO error on `path`, keeping "not found" distinguishable.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound { path }
        } else {
            ConfigError::Io { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
