#![allow(dead_code, unused_imports)]

use std::path::PathBuf;

pub use expconf_test_utils::builders::{FlatBuilder, NodeBuilder};
pub use expconf_test_utils::{init_tracing, write_config};

/// Path of a sample config under `demos/`.
pub fn demo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(relative)
}
