// src/config/merge.rs

//! Structural merge of two configuration trees.
//!
//! - Mappings present on both sides are merged recursively.
//! - Scalars and lists from the overlay replace the base value (lists are
//!   replaced, never concatenated).
//! - A value of a different variant replaces the base value too, with a
//!   `TypeOverridden` warning.
//! - Keys only in the overlay follow the [`NewKeyPolicy`], except reserved
//!   `__` keys which are always added.

use tracing::trace;

use crate::config::model::{ConfigEntry, ConfigNode};
use crate::diagnostics::{ConfigWarning, Diagnostics};
use crate::errors::{ConfigError, Result};
use crate::types::{NewKeyPolicy, is_reserved_key};

/// Merge `overlay` into a copy of `base`. Neither input is modified.
pub fn merge(
    base: &ConfigNode,
    overlay: &ConfigNode,
    policy: NewKeyPolicy,
    diagnostics: &mut Diagnostics,
) -> Result<ConfigNode> {
    merge_at("", base, overlay, policy, diagnostics)
}

/// Fold `layers` left to right under one policy; later layers win.
pub fn merge_all<'a>(
    layers: impl IntoIterator<Item = &'a ConfigNode>,
    policy: NewKeyPolicy,
    diagnostics: &mut Diagnostics,
) -> Result<ConfigNode> {
    layers
        .into_iter()
        .try_fold(ConfigNode::new(), |acc, layer| merge(&acc, layer, policy, diagnostics))
}

fn merge_at(
    prefix: &str,
    base: &ConfigNode,
    overlay: &ConfigNode,
    policy: NewKeyPolicy,
    diagnostics: &mut Diagnostics,
) -> Result<ConfigNode> {
    let mut merged = base.clone();

    for (key, value) in overlay {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        let Some(previous) = base.get(key) else {
            if !is_reserved_key(key) {
                match policy {
                    NewKeyPolicy::Raise => return Err(ConfigError::MergeKey { key: path }),
                    NewKeyPolicy::Warn => diagnostics.push(ConfigWarning::NewKeyAdded { key: path }),
                    NewKeyPolicy::Pass => trace!(key = %path, "adding new key"),
                }
            }
            merged.insert(key.clone(), value.clone());
            continue;
        };

        let replacement = match (previous, value) {
            (ConfigEntry::Node(prev), ConfigEntry::Node(next)) => {
                ConfigEntry::Node(merge_at(&path, prev, next, policy, diagnostics)?)
            }
            _ => {
                if !previous.same_variant(value) {
                    diagnostics.push(ConfigWarning::TypeOverridden {
                        key: path,
                        from: previous.kind(),
                        to: value.kind(),
                    });
                }
                value.clone()
            }
        };
        merged.insert(key.clone(), replacement);
    }

    Ok(merged)
}
