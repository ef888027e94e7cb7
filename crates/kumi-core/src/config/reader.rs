//! File access behind a trait so discovery can run against an in-memory tree

use crate::{KumiError, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Read-only view of the file system used by config discovery
pub trait ConfigReader: Send + Sync {
    /// Contents of `path`, `Ok(None)` when the file does not exist
    fn read(&self, path: &Path) -> Result<Option<String>>;

    /// Whether `path` is an existing regular file
    fn is_file(&self, path: &Path) -> bool;
}

/// Reads from the real file system
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskReader;

impl ConfigReader for DiskReader {
    fn read(&self, path: &Path) -> Result<Option<String>> {
        if !path.is_file() {
            return Ok(None);
        }
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KumiError::io_error(path, e)),
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Fixed set of files held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    files: HashMap<PathBuf, String>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing any previous content
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl ConfigReader for MemoryReader {
    fn read(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.files.get(path).cloned())
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}
