//! Bundle definition types as they appear in the `Assets` configuration.

mod alteration;
mod filters;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use alteration::{AlterationKind, Alterations};
pub use filters::FilterArguments;

use crate::error::{ConfigError, Result};

/// Raw bundle definition
///
/// Keys are PascalCase in configuration files:
///
/// ```yaml
/// Bundles:
///   Css:
///     Main:
///       Files: [styles/reset.css, styles/site.less]
///       Filters:
///         css-minify: ~
///       PreCompileMerge: true
///       Dependencies: [Bootstrap]
///       Alterations:
///         styles/reset.css:
///           After: [styles/fonts.css]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BundleDefinition {
    /// Source files in compile order
    #[serde(default)]
    pub files: Vec<String>,

    /// Filter identifier to constructor arguments, in application order
    #[serde(default)]
    pub filters: IndexMap<String, FilterArguments>,

    /// Merge all files into one artifact before filtering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_compile_merge: Option<bool>,

    /// Bundles whose files are prepended, in declaration order
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Positional edits applied to the final file list
    #[serde(default)]
    pub alterations: Alterations,
}

impl BundleDefinition {
    /// Parse a definition from a configuration value.
    ///
    /// A null value (e.g. `Required: ~` in YAML) is an empty definition.
    ///
    /// # Example
    ///
    /// ```
    /// use satchel_config::BundleDefinition;
    /// use serde_json::json;
    ///
    /// let value = json!({
    ///     "Files": ["a.js", "b.js"],
    ///     "PreCompileMerge": true
    /// });
    ///
    /// let bundle = BundleDefinition::from_value("Main", value).unwrap();
    /// assert_eq!(bundle.files, vec!["a.js", "b.js"]);
    /// assert!(bundle.merges());
    /// ```
    pub fn from_value(bundle: &str, value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }

        serde_json::from_value(value).map_err(|e| ConfigError::InvalidBundle {
            bundle: bundle.to_string(),
            reason: e.to_string(),
        })
    }

    /// Convert to serde_json::Value
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "bundle".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Definition that only declares dependencies.
    pub fn with_dependencies<I, S>(dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Whether the bundle compiles into a single merged artifact.
    pub fn merges(&self) -> bool {
        self.pre_compile_merge.unwrap_or(false)
    }

    /// Layer `self` on top of `lower`.
    ///
    /// - `Files` and `Dependencies` are additive: lower first, then self
    /// - `Filters` keep lower's order; a filter present in both takes self's
    ///   arguments, new filters are appended
    /// - `PreCompileMerge` takes self's value when set
    /// - `Alterations` merge per anchor, self's instruction wins per kind
    pub fn layer_over(self, lower: BundleDefinition) -> BundleDefinition {
        let mut merged = lower;

        merged.files.extend(self.files);
        merged.dependencies.extend(self.dependencies);
        for (filter, arguments) in self.filters {
            merged.filters.insert(filter, arguments);
        }
        if self.pre_compile_merge.is_some() {
            merged.pre_compile_merge = self.pre_compile_merge;
        }
        merged.alterations.merge(self.alterations);

        merged
    }
}
