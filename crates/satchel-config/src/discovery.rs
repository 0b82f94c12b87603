//! File-based configuration discovery
//!
//! Reads `<Type>.toml`, `<Type>.yaml`, `<Type>.yml` and `<Type>.json` from a
//! configuration directory and merges whichever exist, later files winning.
//!
//! Mapping order is kept as written: a bundle's `Filters` run in the order
//! they appear in the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::source::{ConfigTree, ConfigurationSource, lookup_path};

#[derive(Debug, Clone, Copy)]
enum FileFormat {
    Toml,
    Yaml,
    Json,
}

const CANDIDATES: &[(&str, FileFormat)] = &[
    ("toml", FileFormat::Toml),
    ("yaml", FileFormat::Yaml),
    ("yml", FileFormat::Yaml),
    ("json", FileFormat::Json),
];

/// Locates and loads configuration files for a configuration type
///
/// # Example
///
/// ```no_run
/// use satchel_config::AssetsDiscovery;
///
/// let discovery = AssetsDiscovery::new("Configuration");
/// let tree = discovery.load("Assets").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct AssetsDiscovery {
    root: PathBuf,
}

impl AssetsDiscovery {
    /// Create a new discovery rooted at a configuration directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Existing configuration files for `kind`, in merge order.
    pub fn find(&self, kind: &str) -> Vec<PathBuf> {
        CANDIDATES
            .iter()
            .map(|(extension, _)| self.root.join(format!("{kind}.{extension}")))
            .filter(|path| path.is_file())
            .collect()
    }

    /// Load and merge every file for `kind`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no file exists for `kind`.
    pub fn load(&self, kind: &str) -> Result<ConfigTree> {
        let mut tree: Option<Value> = None;

        for (extension, format) in CANDIDATES {
            let path = self.root.join(format!("{kind}.{extension}"));
            if !path.is_file() {
                continue;
            }

            tracing::debug!("Loading {} configuration from: {}", kind, path.display());
            let layer = parse_file(&path, *format).map_err(|hint| ConfigError::InvalidValue {
                field: kind.to_string(),
                hint: Some(format!("{}: {hint}", path.display())),
            })?;

            tree = Some(match tree.take() {
                Some(mut merged) => {
                    merge_tree(&mut merged, layer);
                    merged
                }
                None => layer,
            });
        }

        tree.ok_or(ConfigError::NotFound)
    }
}

fn parse_file(path: &Path, format: FileFormat) -> std::result::Result<Value, String> {
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let value = match format {
        FileFormat::Toml => toml::from_str::<Value>(&text).map_err(|e| e.to_string())?,
        FileFormat::Yaml => serde_yaml::from_str::<Value>(&text).map_err(|e| e.to_string())?,
        FileFormat::Json => serde_json::from_str::<Value>(&text).map_err(|e| e.to_string())?,
    };
    // An empty YAML document is an empty configuration
    Ok(if value.is_null() {
        Value::Object(Default::default())
    } else {
        value
    })
}

/// Merge `upper` into `lower`: objects merge key by key, anything else is
/// replaced. Existing keys keep their position.
fn merge_tree(lower: &mut Value, upper: Value) {
    match (lower, upper) {
        (Value::Object(lower), Value::Object(upper)) => {
            for (key, value) in upper {
                match lower.get_mut(&key) {
                    Some(existing) => merge_tree(existing, value),
                    None => {
                        lower.insert(key, value);
                    }
                }
            }
        }
        (lower, upper) => *lower = upper,
    }
}

/// Configuration source backed by discovered files.
///
/// Files are read again on every call so edits show up on the next request.
#[derive(Debug, Clone)]
pub struct FileConfiguration {
    discovery: AssetsDiscovery,
}

impl FileConfiguration {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            discovery: AssetsDiscovery::new(root),
        }
    }

    pub fn discovery(&self) -> &AssetsDiscovery {
        &self.discovery
    }
}

impl ConfigurationSource for FileConfiguration {
    fn configuration(&self, kind: &str, path: &str) -> Result<Option<ConfigTree>> {
        let tree = match self.discovery.load(kind) {
            Ok(tree) => tree,
            Err(ConfigError::NotFound) => return Ok(None),
            Err(err) => return Err(err),
        };

        Ok(lookup_path(&tree, path).cloned())
    }
}
