// src/env/mod.rs

//! Environment lookup capability used by the resolver.
//!
//! The resolver never reads process state directly; it is handed an
//! [`Environment`], which keeps resolution deterministic under test.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;

pub mod mock;

pub trait Environment: Debug {
    /// Value of variable `name`, or `None` when it is not defined.
    fn var(&self, name: &str) -> Option<String>;
}

/// The environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl Environment for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}
