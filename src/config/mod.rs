// src/config/mod.rs

//! Configuration trees: model, codecs, loading and merging.
//!
//! Responsibilities:
//! - Define the value model (`model.rs`).
//! - Convert between trees and dotted-path maps (`flatten.rs`).
//! - Merge trees under a new-key policy (`merge.rs`).
//! - Read/write TOML and YAML (`format.rs`) and follow `__default__`
//!   inheritance (`loader.rs`).
//! - Apply typed `--key value` overrides (`overrides.rs`).
//! - Read the reserved `__run__` section (`run.rs`).

pub mod flatten;
pub mod format;
pub mod loader;
pub mod merge;
pub mod model;
pub mod overrides;
pub mod run;

pub use flatten::{flatten, unflatten};
pub use format::ConfigFormat;
pub use loader::{Loader, load, save};
pub use merge::{merge, merge_all};
pub use model::{ConfigEntry, ConfigNode, ConfigValue, FlatConfig, FlatEntry};
pub use overrides::{Override, apply_overrides, parse_override_args};
pub use run::{EntryPoint, RunSection, strip_run};
