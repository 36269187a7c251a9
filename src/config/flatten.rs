// src/config/flatten.rs

//! Conversion between nested trees and dotted-path flat maps.
//!
//! ```text
//! {"hello": {"world": true, "values": {"train": [1, 2], "test": 3.5}}}
//!
//! <=>
//!
//! {"hello.world": true, "hello.values.train": [1, 2], "hello.values.test": 3.5}
//! ```

use crate::config::model::{ConfigEntry, ConfigNode, FlatConfig, FlatEntry};
use crate::errors::{ConfigError, Result};

/// Flatten a tree into dotted paths, depth first.
///
/// Empty nested mappings have no leaves and do not appear in the output.
pub fn flatten(cfg: &ConfigNode) -> Result<FlatConfig> {
    let mut flat = FlatConfig::new();
    flatten_into(cfg, "", &mut flat)?;
    Ok(flat)
}

fn flatten_into(cfg: &ConfigNode, prefix: &str, flat: &mut FlatConfig) -> Result<()> {
    for (key, entry) in cfg {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        let leaf = match entry {
            ConfigEntry::Node(child) => {
                flatten_into(child, &path, flat)?;
                continue;
            }
            ConfigEntry::Value(v) => FlatEntry::Value(v.clone()),
            ConfigEntry::List(items) => FlatEntry::List(items.clone()),
        };

        // Only reachable for keys that themselves contain a `.`.
        if flat.contains_key(&path) {
            return Err(ConfigError::conflict(path, "already set, should not override it"));
        }
        flat.insert(path, leaf);
    }
    Ok(())
}

/// Rebuild a tree from dotted paths.
///
/// Fails when a path runs through a key already holding a leaf, or when two
/// paths end on the same key.
pub fn unflatten(flat: &FlatConfig) -> Result<ConfigNode> {
    let mut root = ConfigNode::new();

    for (key, entry) in flat {
        let segments: Vec<&str> = key.split('.').collect();
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ConfigError::conflict(key.clone(), "empty key"))?;

        let mut current = &mut root;
        for segment in parents {
            if !current.contains_key(segment) {
                current.insert(*segment, ConfigNode::new());
            }
            current = match current.get_mut(segment) {
                Some(ConfigEntry::Node(child)) => child,
                _ => {
                    return Err(ConfigError::conflict(
                        key.clone(),
                        format!("already set, found a value for `{segment}`"),
                    ));
                }
            };
        }

        if current.contains_key(last) {
            return Err(ConfigError::conflict(key.clone(), "already set, can't override it"));
        }
        current.insert(*last, ConfigEntry::from(entry.clone()));
    }

    Ok(root)
}
