//! Error types for configuration loading and bundle definitions.

use thiserror::Error;

use crate::bundle::AlterationKind;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Bundle lookup and definition errors
    #[error("bundle `{bundle}` not found in namespace `{namespace}`")]
    BundleNotFound { bundle: String, namespace: String },

    #[error("bundle `{bundle}` declares alterations but has no files")]
    MissingFiles { bundle: String },

    #[error("alteration anchor `{anchor}` ({kind}) not found in files of bundle `{bundle}`")]
    AnchorNotFound {
        bundle: String,
        anchor: String,
        kind: AlterationKind,
    },

    #[error("invalid definition for bundle `{bundle}`: {reason}")]
    InvalidBundle { bundle: String, reason: String },

    // Config parsing/loading errors
    #[error("config not found")]
    NotFound,

    #[error("invalid config value for `{field}`: {}", .hint.as_deref().unwrap_or("no details"))]
    InvalidValue { field: String, hint: Option<String> },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
