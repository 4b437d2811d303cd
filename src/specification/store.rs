//! Persistence of the PM persona's specification document.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};

use super::extract::SENTINEL;

/// Whole-document access to the specification.
///
/// A single writer is assumed: concurrent turns writing the same document
/// race and the last write wins.
#[async_trait]
pub trait SpecificationStore: Send + Sync {
    /// Current document, or `None` when absent, empty, the sentinel, or unreadable.
    async fn read(&self) -> Option<String>;

    /// Replace the document wholesale.
    async fn write(&self, content: &str) -> Result<()>;

    /// Remove the document. Removing an absent document is not an error.
    async fn clear(&self) -> Result<()>;
}

/// Specification document stored as a single file
#[derive(Debug, Clone)]
pub struct FileSpecificationStore {
    path: PathBuf,
}

impl FileSpecificationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SpecificationStore for FileSpecificationStore {
    async fn read(&self) -> Option<String> {
        if !self.path.exists() {
            warn!(path = %self.path.display(), "Specification file does not exist");
            return None;
        }

        match fs::read_to_string(&self.path) {
            Ok(content) if content.is_empty() || content == SENTINEL => None,
            Ok(content) => Some(content),
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Error reading specification file");
                None
            }
        }
    }

    async fn write(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(&self.path, content).map_err(|e| Error::IoWrite {
            path: self.path.clone(),
            source: e,
        })?;

        debug!(path = %self.path.display(), bytes = content.len(), "Specification written");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::IoWrite {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}
