//! # satchel-config
//!
//! Bundle definitions and the configuration sources they are read from.
//!
//! Bundle definitions live in an `Assets` configuration tree under
//! `Bundles.<Namespace>.<BundleName>`. This crate owns the typed shape of a
//! definition, the layering rule used for overrides and dependencies, the
//! alteration splicing, and the sources (in-memory or discovered files) that
//! hand raw trees to the resolver.

pub mod bundle;
pub mod discovery;
pub mod error;
pub mod settings;
pub mod source;

// Re-export main types
pub use bundle::*;
pub use error::*;
pub use settings::*;
pub use source::*;

pub use discovery::{AssetsDiscovery, FileConfiguration};
