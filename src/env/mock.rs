// src/env/mock.rs

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::Environment;

/// Fixed in-memory environment that remembers which names were looked up.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
    lookups: RefCell<Vec<String>>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Names looked up so far, in order, including undefined ones.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(MapEnv::new(), |env, (name, value)| env.with(name, value))
    }
}

impl Environment for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.lookups.borrow_mut().push(name.to_string());
        self.vars.get(name).cloned()
    }
}
