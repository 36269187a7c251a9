// src/diagnostics.rs

//! Non-fatal findings raised while merging and resolving configurations.
//!
//! Warnings never stop a build. They are collected in a [`Diagnostics`] so
//! callers can inspect them, and each one is logged through `tracing` as soon
//! as it is recorded.

use std::fmt;

use tracing::warn;

/// A recoverable condition. Each variant carries the key path it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// `$NAME` / `${NAME}` named an undefined variable; replaced by `""`.
    MissingEnvironmentVariable { key: String, name: String },
    /// `{path}` named a key that does not exist; replaced by `""`.
    UnresolvedReference { key: String, reference: String },
    /// An overlay added a key absent from the base under the `warn` policy.
    NewKeyAdded { key: String },
    /// An overlay replaced a value with one of a different variant.
    TypeOverridden {
        key: String,
        from: &'static str,
        to: &'static str,
    },
}

impl ConfigWarning {
    pub fn key(&self) -> &str {
        match self {
            ConfigWarning::MissingEnvironmentVariable { key, .. }
            | ConfigWarning::UnresolvedReference { key, .. }
            | ConfigWarning::NewKeyAdded { key }
            | ConfigWarning::TypeOverridden { key, .. } => key,
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::MissingEnvironmentVariable { key, name } => {
                write!(f, "environment variable {name} not defined (in `{key}`)")
            }
            ConfigWarning::UnresolvedReference { key, reference } => {
                write!(f, "unable to resolve reference {{{reference}}} (in `{key}`)")
            }
            ConfigWarning::NewKeyAdded { key } => {
                write!(f, "adding new key to configuration: `{key}`")
            }
            ConfigWarning::TypeOverridden { key, from, to } => {
                write!(f, "key `{key}` has been overloaded with a different type: {from} -> {to}")
            }
        }
    }
}

/// Accumulates warnings for one load/merge/resolve pass.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    warnings: Vec<ConfigWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it.
    pub fn push(&mut self, warning: ConfigWarning) {
        warn!(key = %warning.key(), "{warning}");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Move all warnings of `other` into `self` without logging them again.
    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    pub fn into_warnings(self) -> Vec<ConfigWarning> {
        self.warnings
    }
}
