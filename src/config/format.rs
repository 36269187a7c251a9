// src/config/format.rs

//! TOML and YAML codecs for the configuration tree.
//!
//! Both formats are parsed into their generic value type first and then
//! converted, so that errors can name the offending key path. Supported
//! leaves are booleans, integers, floats, strings and lists of those; nulls,
//! datetimes and lists of mappings are rejected.

use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;

use crate::config::model::{ConfigEntry, ConfigNode, ConfigValue};
use crate::errors::{ConfigError, Result};

/// Serialization format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Pick the format from the file extension (`.toml`, `.yaml`, `.yml`).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "toml" => Ok(ConfigFormat::Toml),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Parse `text`; `path` is only used in error messages.
    pub fn parse(self, text: &str, path: &Path) -> Result<ConfigNode> {
        match self {
            ConfigFormat::Toml => {
                let table: toml::Table = toml::from_str(text)
                    .map_err(|e| ConfigError::malformed(path, e.to_string()))?;
                node_from_toml(table, "").map_err(|msg| ConfigError::malformed(path, msg))
            }
            ConfigFormat::Yaml => {
                let value: serde_yaml::Value = serde_yaml::from_str(text)
                    .map_err(|e| ConfigError::malformed(path, e.to_string()))?;
                match value {
                    // An empty document is an empty tree.
                    serde_yaml::Value::Null => Ok(ConfigNode::new()),
                    serde_yaml::Value::Mapping(map) => {
                        node_from_yaml(map, "").map_err(|msg| ConfigError::malformed(path, msg))
                    }
                    _ => Err(ConfigError::malformed(path, "top level must be a mapping")),
                }
            }
        }
    }

    pub fn render(self, cfg: &ConfigNode) -> Result<String> {
        let text = match self {
            ConfigFormat::Toml => toml::to_string(&toml::Value::Table(node_to_toml(cfg)))
                .context("serializing config as TOML")?,
            ConfigFormat::Yaml => {
                serde_yaml::to_string(cfg).context("serializing config as YAML")?
            }
        };
        Ok(text)
    }
}

fn child_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn check_key(prefix: &str, key: &str) -> std::result::Result<(), String> {
    if key.is_empty() {
        return Err(format!("empty key under `{prefix}`"));
    }
    if key.contains('.') {
        return Err(format!(
            "key `{}` contains a `.`, which is reserved for dotted paths",
            child_path(prefix, key)
        ));
    }
    Ok(())
}

fn node_from_toml(table: toml::Table, prefix: &str) -> std::result::Result<ConfigNode, String> {
    let mut node = ConfigNode::new();
    for (key, value) in table {
        check_key(prefix, &key)?;
        let path = child_path(prefix, &key);
        let entry = match value {
            toml::Value::Table(child) => ConfigEntry::Node(node_from_toml(child, &path)?),
            toml::Value::Array(items) => ConfigEntry::List(
                items
                    .into_iter()
                    .map(|item| scalar_from_toml(item, &path))
                    .collect::<std::result::Result<_, _>>()?,
            ),
            other => ConfigEntry::Value(scalar_from_toml(other, &path)?),
        };
        node.insert(key, entry);
    }
    Ok(node)
}

fn scalar_from_toml(value: toml::Value, path: &str) -> std::result::Result<ConfigValue, String> {
    match value {
        toml::Value::Boolean(b) => Ok(ConfigValue::Bool(b)),
        toml::Value::Integer(i) => Ok(ConfigValue::Int(i)),
        toml::Value::Float(f) => Ok(ConfigValue::Float(f)),
        toml::Value::String(s) => Ok(ConfigValue::Str(s)),
        toml::Value::Datetime(_) => Err(format!("`{path}`: datetimes are not supported")),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            Err(format!("`{path}`: lists may only contain scalar values"))
        }
    }
}

fn node_to_toml(cfg: &ConfigNode) -> toml::Table {
    cfg.iter()
        .map(|(key, entry)| {
            let value = match entry {
                ConfigEntry::Value(v) => scalar_to_toml(v),
                ConfigEntry::List(items) => {
                    toml::Value::Array(items.iter().map(scalar_to_toml).collect())
                }
                ConfigEntry::Node(child) => toml::Value::Table(node_to_toml(child)),
            };
            (key.clone(), value)
        })
        .collect()
}

fn scalar_to_toml(value: &ConfigValue) -> toml::Value {
    match value {
        ConfigValue::Bool(b) => toml::Value::Boolean(*b),
        ConfigValue::Int(i) => toml::Value::Integer(*i),
        ConfigValue::Float(f) => toml::Value::Float(*f),
        ConfigValue::Str(s) => toml::Value::String(s.clone()),
    }
}

fn node_from_yaml(map: serde_yaml::Mapping, prefix: &str) -> std::result::Result<ConfigNode, String> {
    let mut node = ConfigNode::new();
    for (key, value) in map {
        let key = match key {
            serde_yaml::Value::String(s) => s,
            other => return Err(format!("non-string key {other:?} under `{prefix}`")),
        };
        check_key(prefix, &key)?;
        let path = child_path(prefix, &key);
        let entry = match value {
            serde_yaml::Value::Mapping(child) => ConfigEntry::Node(node_from_yaml(child, &path)?),
            serde_yaml::Value::Sequence(items) => ConfigEntry::List(
                items
                    .into_iter()
                    .map(|item| scalar_from_yaml(item, &path))
                    .collect::<std::result::Result<_, _>>()?,
            ),
            other => ConfigEntry::Value(scalar_from_yaml(other, &path)?),
        };
        node.insert(key, entry);
    }
    Ok(node)
}

fn scalar_from_yaml(value: serde_yaml::Value, path: &str) -> std::result::Result<ConfigValue, String> {
    match value {
        serde_yaml::Value::Bool(b) => Ok(ConfigValue::Bool(b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(ConfigValue::Int(i))
            } else if n.is_f64() {
                n.as_f64()
                    .map(ConfigValue::Float)
                    .ok_or_else(|| format!("`{path}`: unrepresentable number {n}"))
            } else {
                Err(format!("`{path}`: integer {n} does not fit in 64 bits"))
            }
        }
        serde_yaml::Value::String(s) => Ok(ConfigValue::Str(s)),
        serde_yaml::Value::Null => Err(format!("`{path}`: null values are not supported")),
        serde_yaml::Value::Tagged(_) => Err(format!("`{path}`: tagged values are not supported")),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
            Err(format!("`{path}`: lists may only contain scalar values"))
        }
    }
}
