// src/resolve/resolver.rs

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::config::flatten::{flatten, unflatten};
use crate::config::model::{ConfigNode, ConfigValue, FlatConfig, FlatEntry};
use crate::diagnostics::{ConfigWarning, Diagnostics};
use crate::env::Environment;
use crate::errors::{ConfigError, Result};
use crate::resolve::template::{
    NO_PARSE_PREFIX, SELF_REF_RE, convert_if_possible, full_reference, substitute_env,
};

/// Resolves environment and self references in one configuration.
///
/// Works on a flattened snapshot. Keys are resolved depth first on demand:
/// resolving `a = "{b}"` resolves `b` first. `in_progress` plays the role of
/// the recursion stack (re-entering it is a cycle) and `done` memoizes keys
/// already substituted, so each key is formatted at most once.
#[derive(Debug)]
pub struct Resolver<'e> {
    snapshot: FlatConfig,
    env: &'e dyn Environment,
    in_progress: HashSet<String>,
    done: HashSet<String>,
    diagnostics: Diagnostics,
}

impl<'e> Resolver<'e> {
    pub fn new(cfg: &ConfigNode, env: &'e dyn Environment) -> Result<Self> {
        Ok(Self::from_flat(flatten(cfg)?, env))
    }

    pub fn from_flat(snapshot: FlatConfig, env: &'e dyn Environment) -> Self {
        Self {
            snapshot,
            env,
            in_progress: HashSet::new(),
            done: HashSet::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Resolve every key and rebuild the tree.
    ///
    /// Calling this again returns the same tree without new warnings.
    pub fn resolve(&mut self) -> Result<ConfigNode> {
        let keys: Vec<String> = self.snapshot.keys().map(str::to_string).collect();
        for key in &keys {
            self.resolve_key(key)?;
        }
        debug!(
            keys = keys.len(),
            warnings = self.diagnostics.len(),
            "configuration resolved"
        );
        unflatten(&self.snapshot)
    }

    /// Resolve a single key, and whatever it references, in place.
    pub fn resolve_key(&mut self, key: &str) -> Result<()> {
        if self.done.contains(key) {
            return Ok(());
        }
        if self.in_progress.contains(key) {
            return Err(ConfigError::CyclicReference {
                key: key.to_string(),
            });
        }
        let Some(entry) = self.snapshot.get(key).cloned() else {
            return Ok(());
        };

        self.in_progress.insert(key.to_string());
        let formatted = self.format(key, entry)?;
        self.snapshot.insert(key, formatted);
        self.in_progress.remove(key);
        self.done.insert(key.to_string());
        Ok(())
    }

    pub fn snapshot(&self) -> &FlatConfig {
        &self.snapshot
    }

    pub fn warnings(&self) -> &[ConfigWarning] {
        self.diagnostics.warnings()
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    fn format(&mut self, key: &str, entry: FlatEntry) -> Result<FlatEntry> {
        match entry {
            FlatEntry::Value(value) => self.format_value(key, value),
            FlatEntry::List(items) => {
                let mut formatted = Vec::with_capacity(items.len());
                for item in items {
                    let value = match self.format_value(key, item)? {
                        FlatEntry::Value(v) => v,
                        // Lists do not nest: splice a referenced list as text.
                        list @ FlatEntry::List(_) => ConfigValue::Str(list.to_string()),
                    };
                    formatted.push(value);
                }
                Ok(FlatEntry::List(formatted))
            }
        }
    }

    fn format_value(&mut self, key: &str, value: ConfigValue) -> Result<FlatEntry> {
        let mut text = match value {
            ConfigValue::Str(text) => text,
            other => return Ok(FlatEntry::Value(other)),
        };

        if let Some(rest) = text.strip_prefix(NO_PARSE_PREFIX) {
            return Ok(FlatEntry::Value(ConfigValue::Str(rest.to_string())));
        }

        if text.contains('$') {
            match self.replace_env_references(key, &text) {
                ConfigValue::Str(substituted) => text = substituted,
                converted => return Ok(FlatEntry::Value(converted)),
            }
        }

        if text.contains('{') {
            return self.replace_self_references(key, &text);
        }

        Ok(FlatEntry::Value(ConfigValue::Str(text)))
    }

    fn replace_env_references(&mut self, key: &str, text: &str) -> ConfigValue {
        let env = self.env;
        let diagnostics = &mut self.diagnostics;
        let substituted = substitute_env(text, |name| {
            let value = env.var(name);
            if value.is_none() {
                diagnostics.push(ConfigWarning::MissingEnvironmentVariable {
                    key: key.to_string(),
                    name: name.to_string(),
                });
            }
            value
        });
        convert_if_possible(&substituted)
    }

    fn replace_self_references(&mut self, key: &str, text: &str) -> Result<FlatEntry> {
        // A lone token keeps the referenced value's type.
        if let Some(reference) = full_reference(text) {
            if self.snapshot.contains_key(reference) {
                self.resolve_key(reference)?;
                if let Some(resolved) = self.snapshot.get(reference) {
                    trace!(key, reference, "spliced full reference");
                    return Ok(resolved.clone());
                }
            }
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for token in SELF_REF_RE.find_iter(text) {
            out.push_str(&text[last..token.start()]);
            last = token.end();

            let reference = &text[token.start() + 1..token.end() - 1];
            if self.snapshot.contains_key(reference) {
                self.resolve_key(reference)?;
                if let Some(resolved) = self.snapshot.get(reference) {
                    out.push_str(&resolved.to_string());
                }
            } else {
                self.diagnostics.push(ConfigWarning::UnresolvedReference {
                    key: key.to_string(),
                    reference: reference.to_string(),
                });
            }
        }
        out.push_str(&text[last..]);

        Ok(FlatEntry::Value(ConfigValue::Str(out)))
    }
}

/// Outcome of [`resolve`]: the resolved tree and the warnings raised.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub config: ConfigNode,
    pub warnings: Vec<ConfigWarning>,
}

/// Resolve all templates of `cfg` against `env`.
pub fn resolve(cfg: &ConfigNode, env: &dyn Environment) -> Result<Resolved> {
    let mut resolver = Resolver::new(cfg, env)?;
    let config = resolver.resolve()?;
    Ok(Resolved {
        config,
        warnings: resolver.into_diagnostics().into_warnings(),
    })
}
