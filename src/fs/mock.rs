// src/fs/mock.rs

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::FileSystem;
use crate::errors::{ConfigError, Result};

/// In-memory filesystem for tests.
///
/// Paths are normalized lexically (`a/./b/../c` is `a/c`), so the relative
/// paths produced by `__default__` resolution find the files they name.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = normalize(path.as_ref());
        self.lock().insert(path, content.into());
    }

    /// Contents of a file as written so far, if any.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = normalize(path.as_ref());
        self.lock()
            .get(&path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        // A poisoned map is still a valid map for test purposes.
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let key = normalize(path);
        match self.lock().get(&key) {
            Some(content) => String::from_utf8(content.clone())
                .map_err(|_| ConfigError::malformed(path, "file is not valid UTF-8")),
            None => Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            }),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.add_file(path, contents);
        Ok(())
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        Ok(normalize(path))
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
