//! Reading bundle file contents.

use std::fs;
use std::path::{Component, Path, PathBuf};

use path_clean::PathClean;
use rustc_hash::FxHashMap;

use crate::{Error, Result};

/// Loads the text content of a bundle file path.
pub trait SourceLoader: Send + Sync {
    fn load(&self, path: &str) -> Result<String>;
}

/// Filesystem loader rooted at a source directory.
///
/// Bundle paths are resolved relative to the root and must stay inside it
/// after normalisation. Loading re-checks the canonical location so a
/// symlink below the root cannot point outside it.
#[derive(Debug, Clone)]
pub struct FsSourceLoader {
    root: PathBuf,
}

impl FsSourceLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root: PathBuf = root.into();
        Self { root: root.clean() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalised on-disk location of `path`.
    ///
    /// # Errors
    ///
    /// `AssetSecurityViolation` if the path escapes the root.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let candidate = Path::new(path).clean();
        let inside = if candidate.is_absolute() {
            candidate.starts_with(&self.root)
        } else {
            !matches!(candidate.components().next(), Some(Component::ParentDir))
        };
        if !inside {
            return Err(Error::AssetSecurityViolation {
                path: path.to_string(),
                reason: format!("path resolves outside {}", self.root.display()),
            });
        }

        Ok(self.root.join(candidate))
    }

    /// Reject a resolved file whose canonical location leaves the
    /// canonical root.
    fn check_canonical(&self, path: &str, location: &Path) -> Result<()> {
        let read_error = |source: std::io::Error| Error::AssetRead {
            path: path.to_string(),
            source,
        };
        let root = self.root.canonicalize().map_err(read_error)?;
        let real = location.canonicalize().map_err(read_error)?;

        if real.starts_with(&root) {
            Ok(())
        } else {
            Err(Error::AssetSecurityViolation {
                path: path.to_string(),
                reason: format!("symlink resolves to {}", real.display()),
            })
        }
    }
}

impl SourceLoader for FsSourceLoader {
    fn load(&self, path: &str) -> Result<String> {
        let location = self.resolve(path)?;
        self.check_canonical(path, &location)?;
        tracing::debug!("Reading asset {} from {}", path, location.display());
        fs::read_to_string(&location).map_err(|source| Error::AssetRead {
            path: path.to_string(),
            source,
        })
    }
}

/// In-memory sources keyed by bundle path.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceLoader {
    files: FxHashMap<String, String>,
}

impl MemorySourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }
}

impl SourceLoader for MemorySourceLoader {
    fn load(&self, path: &str) -> Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::AssetRead {
                path: path.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such source"),
            })
    }
}
