// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::errors::{ConfigError, Result};

pub mod mock;

/// Abstract filesystem interface used by the config loader.
///
/// Missing files must be reported as [`ConfigError::NotFound`] so that
/// callers can tell them apart from other IO failures.
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Stable identity of a path, used to detect `__default__` cycles.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::InvalidData => ConfigError::malformed(path, "file is not valid UTF-8"),
            _ => ConfigError::from_io(path, e),
        })
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::from_io(parent, e))?;
            }
        }
        fs::write(path, contents).map_err(|e| ConfigError::from_io(path, e))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).map_err(|e| ConfigError::from_io(path, e))
    }
}
