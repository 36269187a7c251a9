// src/config/overrides.rs

//! Command-line style overrides: `--model.lr 0.01 --data.splits 0.8,0.2`.
//!
//! Overrides may only replace existing keys, and the raw string is converted
//! to the type of the value it replaces.

use tracing::debug;

use crate::config::flatten::{flatten, unflatten};
use crate::config::model::{ConfigNode, ConfigValue, FlatEntry};
use crate::errors::{ConfigError, Result};
use crate::resolve::template::convert_if_possible;

/// One `--dotted.key value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub key: String,
    pub value: String,
}

impl Override {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Pair up `["--a.b", "1", "--c", "x"]` into overrides.
pub fn parse_override_args<S: AsRef<str>>(args: &[S]) -> Result<Vec<Override>> {
    if args.len() % 2 != 0 {
        return Err(ConfigError::InvalidOverride(
            "overrides come in `--key value` pairs; a key or a value is missing".to_string(),
        ));
    }

    args.chunks(2)
        .map(|pair| {
            let flag = pair[0].as_ref();
            let key = flag.strip_prefix("--").ok_or_else(|| {
                ConfigError::InvalidOverride(format!(
                    "expected `--my.entire.key`, got `{flag}`"
                ))
            })?;
            Ok(Override::new(key, pair[1].as_ref()))
        })
        .collect()
}

/// Apply `overrides` to a copy of `cfg`.
///
/// Every key must already exist as a leaf of `cfg`.
pub fn apply_overrides(cfg: &ConfigNode, overrides: &[Override]) -> Result<ConfigNode> {
    let mut flat = flatten(cfg)?;

    for ov in overrides {
        let Some(current) = flat.get_mut(&ov.key) else {
            return Err(ConfigError::UnknownOverrideKey {
                key: ov.key.clone(),
            });
        };
        let converted = convert_as(current, &ov.value).map_err(|reason| {
            ConfigError::InvalidOverride(format!("`{}` = {:?}: {reason}", ov.key, ov.value))
        })?;
        debug!(key = %ov.key, value = %converted, "applied override");
        *current = converted;
    }

    unflatten(&flat)
}

/// Convert `raw` to the same shape as `current`.
///
/// Lists are split on `,`. When the number of items matches, each item takes
/// the type of the item at the same position; otherwise every item takes the
/// type of the first current item (or is converted best-effort when the
/// current list is empty).
pub fn convert_as(current: &FlatEntry, raw: &str) -> std::result::Result<FlatEntry, String> {
    match current {
        FlatEntry::Value(value) => convert_value_as(value, raw).map(FlatEntry::Value),
        FlatEntry::List(items) => {
            let parts: Vec<&str> = raw.split(',').collect();
            let converted = if parts.len() == items.len() {
                items
                    .iter()
                    .zip(&parts)
                    .map(|(item, part)| convert_value_as(item, part))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            } else if let Some(first) = items.first() {
                parts
                    .iter()
                    .map(|part| convert_value_as(first, part))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            } else {
                parts.iter().map(|part| convert_if_possible(part)).collect()
            };
            Ok(FlatEntry::List(converted))
        }
    }
}

fn convert_value_as(current: &ConfigValue, raw: &str) -> std::result::Result<ConfigValue, String> {
    match current {
        ConfigValue::Bool(_) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" => Ok(ConfigValue::Bool(true)),
            "false" | "0" => Ok(ConfigValue::Bool(false)),
            _ => Err(format!("unable to convert {raw:?} to a boolean")),
        },
        ConfigValue::Int(_) => raw
            .trim()
            .parse()
            .map(ConfigValue::Int)
            .map_err(|e| format!("unable to convert {raw:?} to an integer: {e}")),
        ConfigValue::Float(_) => raw
            .trim()
            .parse()
            .map(ConfigValue::Float)
            .map_err(|e| format!("unable to convert {raw:?} to a float: {e}")),
        ConfigValue::Str(_) => Ok(ConfigValue::Str(raw.to_string())),
    }
}
