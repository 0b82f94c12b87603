//! Publishing compiled content as persistent, servable resources.
//!
//! Publishing is two steps behind [`PublishingGateway`]: store the bytes and
//! get a [`ResourceHandle`], then publish the handle and get a URI. The
//! gateway decides where and how content is stored.
//!
//! [`LocalPublisher`] is the filesystem implementation:
//!
//! - content is stored once under `storage_dir/<blake3 hex>`
//! - publishing copies it to `public_dir/<hash>/<filename>`
//! - the URI is `<base_uri>/<hash>/<filename>`
//!
//! Writes go to a per-writer temp file that is renamed into place, so a
//! reader never sees a partially written resource, even when several threads
//! publish the same content at once.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// Error type for publishing operations.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Filename hint is empty or not a single path component.
    #[error("Invalid resource filename `{filename}`: {reason}")]
    InvalidFilename { filename: String, reason: String },

    /// Handle does not refer to stored content.
    #[error("Unknown resource {hash}")]
    UnknownResource { hash: String },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
    },
}

/// Stored content, identified by its digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    /// Hex-encoded BLAKE3 digest of the content
    pub hash: String,
    pub filename: String,
}

/// Two-step resource publishing.
pub trait PublishingGateway: Send + Sync {
    /// Store `content` under a filename hint.
    fn create_resource(&self, content: &[u8], filename: &str)
    -> Result<ResourceHandle, PublishError>;

    /// Make a created resource publicly reachable and return its URI.
    fn publish_persistent_resource(&self, handle: &ResourceHandle) -> Result<String, PublishError>;
}

/// Content-addressed publisher writing to local directories.
#[derive(Debug, Clone)]
pub struct LocalPublisher {
    storage_dir: PathBuf,
    public_dir: PathBuf,
    base_uri: String,
}

impl LocalPublisher {
    pub fn new(
        storage_dir: impl Into<PathBuf>,
        public_dir: impl Into<PathBuf>,
        base_uri: impl Into<String>,
    ) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            public_dir: public_dir.into(),
            base_uri: base_uri.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    fn stored_path(&self, hash: &str) -> PathBuf {
        self.storage_dir.join(hash)
    }

    /// Location of a published resource.
    pub fn published_path(&self, handle: &ResourceHandle) -> PathBuf {
        self.public_dir.join(&handle.hash).join(&handle.filename)
    }
}

impl PublishingGateway for LocalPublisher {
    fn create_resource(
        &self,
        content: &[u8],
        filename: &str,
    ) -> Result<ResourceHandle, PublishError> {
        validate_filename(filename)?;

        let hash = blake3::hash(content).to_hex().to_string();
        let stored = self.stored_path(&hash);
        if !stored.is_file() {
            write_atomic(&stored, content)?;
            tracing::debug!("Stored resource {} ({} bytes)", hash, content.len());
        }

        Ok(ResourceHandle {
            hash,
            filename: filename.to_string(),
        })
    }

    fn publish_persistent_resource(&self, handle: &ResourceHandle) -> Result<String, PublishError> {
        validate_filename(&handle.filename)?;

        let target = self.published_path(handle);
        if !target.is_file() {
            let stored = self.stored_path(&handle.hash);
            let content = match fs::read(&stored) {
                Ok(content) => content,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(PublishError::UnknownResource {
                        hash: handle.hash.clone(),
                    });
                }
                Err(source) => {
                    return Err(PublishError::Io {
                        message: format!("Failed to read stored resource '{}'", stored.display()),
                        source,
                    });
                }
            };
            write_atomic(&target, &content)?;
        }

        Ok(format!("{}/{}/{}", self.base_uri, handle.hash, handle.filename))
    }
}

fn validate_filename(filename: &str) -> Result<(), PublishError> {
    let invalid = |reason: &str| PublishError::InvalidFilename {
        filename: filename.to_string(),
        reason: reason.to_string(),
    };

    if filename.is_empty() {
        return Err(invalid("filename is empty"));
    }
    if filename.contains(['/', '\\']) {
        return Err(invalid("filename must not contain path separators"));
    }

    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid("filename must be a plain file name")),
    }
}

/// Write via a uniquely named sibling temp file and rename into place.
///
/// Concurrent writers of the same target each use their own temp file. A
/// target that already exists when the rename fails was written by another
/// writer and counts as success.
fn write_atomic(target: &Path, content: &[u8]) -> Result<(), PublishError> {
    let io_error = |message: String| move |source: io::Error| PublishError::Io { message, source };

    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(io_error(format!(
        "Failed to create directory '{}'",
        parent.display()
    )))?;

    let mut temp = tempfile::Builder::new()
        .prefix(".satchel-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(io_error(format!(
            "Failed to create temporary file in '{}'",
            parent.display()
        )))?;
    temp.write_all(content)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(io_error(format!(
            "Failed to write temporary file '{}'",
            temp.path().display()
        )))?;

    match temp.persist(target) {
        Ok(_) => Ok(()),
        Err(_) if target.is_file() => Ok(()),
        Err(e) => Err(PublishError::Io {
            message: format!("Failed to move resource into '{}'", target.display()),
            source: e.error,
        }),
    }
}
