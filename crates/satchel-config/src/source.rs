//! Configuration sources handing raw trees to the resolver.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::error::Result;

/// Configuration type holding bundle definitions.
pub const CONFIGURATION_TYPE_ASSETS: &str = "Assets";

/// Hierarchical key-value tree as read from configuration.
pub type ConfigTree = Value;

/// Source of configuration trees, keyed by type and dotted path.
///
/// Implementations are asked again on every resolution, so they may reflect
/// configuration changes between calls.
pub trait ConfigurationSource: Send + Sync {
    /// Return the subtree at `path` (e.g. `Bundles.Js`) of configuration `kind`.
    ///
    /// `Ok(None)` means the path does not exist.
    fn configuration(&self, kind: &str, path: &str) -> Result<Option<ConfigTree>>;
}

/// Walk `path` through nested objects. An empty path returns the root.
pub fn lookup_path<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(tree, |node, segment| node.as_object()?.get(segment))
}

/// In-memory configuration trees per configuration type.
///
/// # Example
///
/// ```
/// use satchel_config::{ConfigurationSource, StaticConfiguration, CONFIGURATION_TYPE_ASSETS};
/// use serde_json::json;
///
/// let source = StaticConfiguration::assets(json!({
///     "Bundles": { "Js": { "Main": { "Files": ["app.js"] } } }
/// }));
///
/// let bundles = source
///     .configuration(CONFIGURATION_TYPE_ASSETS, "Bundles.Js")
///     .unwrap()
///     .unwrap();
/// assert!(bundles.get("Main").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticConfiguration {
    trees: FxHashMap<String, Value>,
}

impl StaticConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source with a single `Assets` tree.
    pub fn assets(tree: Value) -> Self {
        Self::new().with_tree(CONFIGURATION_TYPE_ASSETS, tree)
    }

    pub fn with_tree(mut self, kind: impl Into<String>, tree: Value) -> Self {
        self.trees.insert(kind.into(), tree);
        self
    }
}

impl ConfigurationSource for StaticConfiguration {
    fn configuration(&self, kind: &str, path: &str) -> Result<Option<ConfigTree>> {
        Ok(self
            .trees
            .get(kind)
            .and_then(|tree| lookup_path(tree, path))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_walks_dotted_segments() {
        let tree = json!({ "Bundles": { "Css": { "Main": { "Files": [] } } } });
        assert_eq!(
            lookup_path(&tree, "Bundles.Css.Main"),
            Some(&json!({ "Files": [] }))
        );
        assert!(lookup_path(&tree, "Bundles.Js").is_none());
    }

    #[test]
    fn empty_path_returns_root() {
        let tree = json!({ "Bundles": {} });
        assert_eq!(lookup_path(&tree, ""), Some(&tree));
    }

    #[test]
    fn lookup_stops_at_scalars() {
        let tree = json!({ "Bundles": "none" });
        assert!(lookup_path(&tree, "Bundles.Css").is_none());
    }

    #[test]
    fn unknown_configuration_type_is_none() {
        let source = StaticConfiguration::assets(json!({ "Bundles": {} }));
        assert!(source.configuration("Settings", "").unwrap().is_none());
    }
}
