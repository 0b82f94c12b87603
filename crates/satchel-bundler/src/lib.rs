#![cfg_attr(docsrs, feature(doc_cfg))]

//! # satchel-bundler
//!
//! Resolve named asset bundles, run them through pluggable filters and
//! publish the results as content-addressed resources.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use satchel_bundler::{AssetService, FileConfiguration, LocalPublisher, RequestContext};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = AssetService::new(
//!     Arc::new(FileConfiguration::new("Configuration")),
//!     Arc::new(LocalPublisher::new("Data/Resources", "Web/_Resources", "/_Resources")),
//! );
//!
//! for uri in service.css_bundle_uris("Main")? {
//!     println!("<link rel=\"stylesheet\" href=\"{uri}\">");
//! }
//!
//! let mut request = RequestContext::new();
//! request.add_required_js("Forms");
//! request.add_required_js("Modal");
//! for uri in service.required_js(&request)? {
//!     println!("<script src=\"{uri}\"></script>");
//! }
//! # Ok(()) }
//! ```

pub mod compiler;
pub mod context;
pub mod filters;
pub mod publish;
pub mod resolver;
pub mod service;
pub mod source;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env, init_logging_from_settings};

pub use compiler::{CompiledArtifact, Compiler};
pub use context::{REQUIRED_BUNDLE, RequestContext};
pub use filters::{Asset, Filter, FilterChain, FilterRegistry};
pub use publish::{LocalPublisher, PublishError, PublishingGateway, ResourceHandle};
pub use resolver::{BundleResolver, ResolvedBundle};
pub use service::{AssetService, NAMESPACE_CSS, NAMESPACE_JS};
pub use source::{FsSourceLoader, MemorySourceLoader, SourceLoader};

// Re-export configuration types used in the public API
pub use satchel_config::{
    BundleDefinition, ConfigError, ConfigTree, ConfigurationSource, FileConfiguration,
    FilterArguments, ServiceSettings, StaticConfiguration,
};

/// Error types for satchel-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown or malformed bundle configuration.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A bundle depends on itself, directly or transitively.
    #[error("Cyclic bundle dependency: {}", .chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    /// A filter could not be constructed from its configuration.
    #[error("Cannot construct filter `{filter}` for bundle `{bundle}`: {reason}")]
    Construction {
        bundle: String,
        filter: String,
        reason: String,
    },

    /// A filter failed while processing a file or merged collection.
    #[error("Filter `{filter}` failed on {asset} in bundle `{bundle}`: {source:#}")]
    FilterExecution {
        bundle: String,
        filter: String,
        asset: String,
        #[source]
        source: anyhow::Error,
    },

    /// A bundle file could not be read.
    #[error("Failed to read asset {path}: {source}")]
    AssetRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Asset path escapes the source root.
    #[error("Asset security violation: {path} - {reason}")]
    AssetSecurityViolation { path: String, reason: String },

    /// The publishing gateway rejected or failed a resource.
    #[error("Failed to publish {filename}: {source}")]
    Publishing {
        filename: String,
        #[source]
        source: PublishError,
    },
}

/// Result type alias for satchel-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Configuration(_) => "CONFIGURATION_ERROR",
            Error::CyclicDependency { .. } => "CYCLIC_DEPENDENCY",
            Error::Construction { .. } => "CONSTRUCTION_ERROR",
            Error::FilterExecution { .. } => "FILTER_EXECUTION_ERROR",
            Error::AssetRead { .. } => "ASSET_READ_ERROR",
            Error::AssetSecurityViolation { .. } => "ASSET_SECURITY_VIOLATION",
            Error::Publishing { .. } => "PUBLISHING_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Configuration(ConfigError::BundleNotFound { bundle, namespace }) => {
                Some(Box::new(format!(
                    "Define the bundle under `Bundles.{namespace}.{bundle}` in your Assets configuration."
                )))
            }
            Error::Configuration(ConfigError::AnchorNotFound { anchor, .. }) => {
                Some(Box::new(format!(
                    "Alteration anchors must name a file already in the bundle (after dependencies are merged): `{anchor}`."
                )))
            }
            Error::CyclicDependency { chain } => Some(Box::new(format!(
                "Remove one of the `Dependencies` entries along: {}",
                chain.join(" -> ")
            ))),
            Error::Construction { filter, .. } => Some(Box::new(format!(
                "Check that `{filter}` is registered and that its arguments match what the filter expects."
            ))),
            Error::AssetSecurityViolation { path, .. } => Some(Box::new(format!(
                "The asset path '{path}' must stay within the source root."
            ))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;
    use satchel_config::AlterationKind;

    fn code(err: &Error) -> String {
        err.code().map(|c| c.to_string()).unwrap_or_default()
    }

    fn help(err: &Error) -> String {
        err.help().map(|h| h.to_string()).unwrap_or_default()
    }

    #[test]
    fn missing_bundle_points_at_its_configuration_path() {
        let err = Error::from(ConfigError::BundleNotFound {
            bundle: "Main".to_string(),
            namespace: "Css".to_string(),
        });
        assert_eq!(code(&err), "CONFIGURATION_ERROR");
        assert!(matches!(err.severity(), Some(miette::Severity::Error)));
        assert!(help(&err).contains("`Bundles.Css.Main`"));
    }

    #[test]
    fn missing_anchor_help_names_the_anchor() {
        let err = Error::from(ConfigError::AnchorNotFound {
            bundle: "Main".to_string(),
            anchor: "b.js".to_string(),
            kind: AlterationKind::After,
        });
        assert_eq!(code(&err), "CONFIGURATION_ERROR");
        assert!(help(&err).ends_with("`b.js`."));
    }

    #[test]
    fn cycle_help_shows_the_chain() {
        let err = Error::CyclicDependency {
            chain: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        };
        assert_eq!(code(&err), "CYCLIC_DEPENDENCY");
        assert!(help(&err).ends_with("A -> B -> A"));
        assert_eq!(err.to_string(), "Cyclic bundle dependency: A -> B -> A");
    }

    #[test]
    fn other_configuration_errors_have_no_help() {
        let err = Error::from(ConfigError::MissingFiles {
            bundle: "Main".to_string(),
        });
        assert_eq!(code(&err), "CONFIGURATION_ERROR");
        assert!(err.help().is_none());
    }
}
