// src/config/run.rs

//! The reserved `__run__` section.
//!
//! ```yaml
//! __run__:
//!   __main__: my_package.train:main
//!   __name__: resnet-{model.depth}
//!   __output_dir__: $OUTPUT_DIR/experiments
//!   __code__: ./src          # optional
//! ```
//!
//! The resolver treats these like any other strings; this module only gives
//! the downstream launcher a typed view and a way to drop the section before
//! user code sees the config.

use std::fmt;
use std::path::PathBuf;

use crate::config::model::{ConfigEntry, ConfigNode};
use crate::errors::{ConfigError, Result};

pub const RUN_KEY: &str = "__run__";

/// `module:function` entry point of an experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub module: String,
    pub function: String,
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.function)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSection {
    pub main: EntryPoint,
    pub name: String,
    pub output_dir: PathBuf,
    pub code_dir: Option<PathBuf>,
}

impl RunSection {
    /// Read the `__run__` section of a (normally resolved) config.
    pub fn from_config(cfg: &ConfigNode) -> Result<Self> {
        let section = match cfg.get(RUN_KEY) {
            Some(ConfigEntry::Node(section)) => section,
            Some(other) => {
                return Err(ConfigError::InvalidRunSection(format!(
                    "`{RUN_KEY}` must be a mapping, found a {}",
                    other.kind()
                )));
            }
            None => {
                return Err(ConfigError::InvalidRunSection(format!(
                    "no `{RUN_KEY}` section"
                )));
            }
        };

        let main = required_str(section, "__main__")?;
        let (module, function) = main.split_once(':').ok_or_else(|| {
            ConfigError::InvalidRunSection(format!(
                "`__main__` must look like `module:function`, got `{main}`"
            ))
        })?;
        if module.is_empty() || function.is_empty() || function.contains(':') {
            return Err(ConfigError::InvalidRunSection(format!(
                "`__main__` must look like `module:function`, got `{main}`"
            )));
        }

        Ok(Self {
            main: EntryPoint {
                module: module.to_string(),
                function: function.to_string(),
            },
            name: required_str(section, "__name__")?.to_string(),
            output_dir: PathBuf::from(required_str(section, "__output_dir__")?),
            code_dir: optional_str(section, "__code__")?.map(PathBuf::from),
        })
    }
}

/// Copy of `cfg` without its `__run__` section.
pub fn strip_run(cfg: &ConfigNode) -> ConfigNode {
    let mut stripped = cfg.clone();
    stripped.remove(RUN_KEY);
    stripped
}

fn required_str<'a>(section: &'a ConfigNode, key: &str) -> Result<&'a str> {
    optional_str(section, key)?
        .ok_or_else(|| ConfigError::InvalidRunSection(format!("missing `{RUN_KEY}.{key}`")))
}

fn optional_str<'a>(section: &'a ConfigNode, key: &str) -> Result<Option<&'a str>> {
    match section.get(key) {
        None => Ok(None),
        Some(entry) => entry.as_str().map(Some).ok_or_else(|| {
            ConfigError::InvalidRunSection(format!(
                "`{RUN_KEY}.{key}` must be a string, found a {}",
                entry.kind()
            ))
        }),
    }
}
