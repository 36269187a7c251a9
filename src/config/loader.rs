// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::format::ConfigFormat;
use crate::config::merge::merge;
use crate::config::model::{ConfigEntry, ConfigNode, ConfigValue};
use crate::diagnostics::Diagnostics;
use crate::errors::{ConfigError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::NewKeyPolicy;

/// Top-level key listing the parent configs of a file.
pub const DEFAULT_KEY: &str = "__default__";

/// Top-level key holding the policy for the file's own keys.
pub const NEW_KEY_POLICY_KEY: &str = "__new_key_policy__";

/// Reads config files and resolves their `__default__` inheritance chains.
///
/// For a file with
///
/// ```yaml
/// __default__: [../base.yaml, ./model.yaml]
/// __new_key_policy__: raise
/// lr: 0.1
/// ```
///
/// the parents are loaded (recursively), merged left to right with the
/// `pass` policy, and the file's own keys are merged on top with its
/// `__new_key_policy__` (`warn` when absent). Neither reserved key survives
/// in the result.
#[derive(Debug)]
pub struct Loader<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> Loader<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Load `path`; merge warnings are logged and dropped.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<ConfigNode> {
        let mut diagnostics = Diagnostics::new();
        self.load_with(path, &mut diagnostics)
    }

    /// Load `path`, recording merge warnings into `diagnostics`.
    pub fn load_with(&self, path: impl AsRef<Path>, diagnostics: &mut Diagnostics) -> Result<ConfigNode> {
        let mut chain = Vec::new();
        self.load_inner(path.as_ref(), &mut chain, diagnostics)
    }

    /// Parse a single file without following `__default__`.
    pub fn load_raw(&self, path: impl AsRef<Path>) -> Result<ConfigNode> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = self.fs.read_to_string(path)?;
        format.parse(&contents, path)
    }

    /// Write `cfg` to `path` in the format implied by its extension.
    pub fn save(&self, cfg: &ConfigNode, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = ConfigFormat::from_path(path)?.render(cfg)?;
        self.fs.write(path, text.as_bytes())
    }

    fn load_inner(
        &self,
        path: &Path,
        chain: &mut Vec<PathBuf>,
        diagnostics: &mut Diagnostics,
    ) -> Result<ConfigNode> {
        let identity = self
            .fs
            .canonicalize(path)
            .unwrap_or_else(|_| path.to_path_buf());
        if chain.contains(&identity) {
            return Err(ConfigError::CyclicDefault {
                path: path.to_path_buf(),
            });
        }

        let mut cfg = self.load_raw(path)?;
        let policy = take_policy(&mut cfg, path)?;
        let Some(defaults) = take_defaults(&mut cfg, path)? else {
            return Ok(cfg);
        };

        chain.push(identity);
        let mut inherited = ConfigNode::new();
        for default in &defaults {
            let default_path = resolve_default_path(path, default);
            debug!(config = ?path, default = ?default_path, "loading default config");
            let parent = self.load_inner(&default_path, chain, diagnostics)?;
            inherited = merge(&inherited, &parent, NewKeyPolicy::Pass, diagnostics)?;
        }
        chain.pop();

        merge(&inherited, &cfg, policy, diagnostics)
    }
}

/// Load `path` from the real filesystem.
pub fn load(path: impl AsRef<Path>) -> Result<ConfigNode> {
    Loader::new(&RealFileSystem).load(path)
}

/// Save `cfg` to `path` on the real filesystem.
pub fn save(cfg: &ConfigNode, path: impl AsRef<Path>) -> Result<()> {
    Loader::new(&RealFileSystem).save(cfg, path)
}

/// Where a `__default__` entry points to.
///
/// Absolute paths, and relative paths that do not start with `.`, are taken
/// as given (i.e. relative to the working directory). Paths starting with `.`
/// (`./x`, `../x`) are relative to the directory of the including file.
pub fn resolve_default_path(including: &Path, default: &str) -> PathBuf {
    let candidate = Path::new(default);
    if candidate.is_absolute() || !default.starts_with('.') {
        return candidate.to_path_buf();
    }
    including
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(candidate)
}

fn take_policy(cfg: &mut ConfigNode, path: &Path) -> Result<NewKeyPolicy> {
    match cfg.remove(NEW_KEY_POLICY_KEY) {
        None => Ok(NewKeyPolicy::default()),
        Some(ConfigEntry::Value(ConfigValue::Str(s))) => s.parse(),
        Some(other) => Err(ConfigError::malformed(
            path,
            format!("`{NEW_KEY_POLICY_KEY}` must be a string, found a {}", other.kind()),
        )),
    }
}

fn take_defaults(cfg: &mut ConfigNode, path: &Path) -> Result<Option<Vec<String>>> {
    let invalid = |found: &str| {
        ConfigError::malformed(
            path,
            format!("`{DEFAULT_KEY}` must be a string or a list of strings, found {found}"),
        )
    };

    match cfg.remove(DEFAULT_KEY) {
        None => Ok(None),
        Some(ConfigEntry::Value(ConfigValue::Str(s))) => Ok(Some(vec![s])),
        Some(ConfigEntry::List(items)) => items
            .into_iter()
            .map(|item| match item {
                ConfigValue::Str(s) => Ok(s),
                other => Err(invalid(&format!("a list containing a {}", other.kind()))),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        Some(other) => Err(invalid(&format!("a {}", other.kind()))),
    }
}
