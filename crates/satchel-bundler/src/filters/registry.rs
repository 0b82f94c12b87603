//! Filter registry mapping configured identifiers to factories.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use satchel_config::FilterArguments;
use serde_json::Value;

use super::builtin::{AppendFilter, PrependFilter, ReplaceFilter, StripSourceMapsFilter};
use super::{Filter, FilterChain};
use crate::{Error, Result};

/// Builds a filter from its positional constructor arguments.
///
/// Each factory validates and unpacks its own arguments.
pub type FilterFactory = dyn Fn(&[Value]) -> anyhow::Result<Box<dyn Filter>> + Send + Sync;

/// Registry of filter factories keyed by identifier
///
/// This is the single extension point for new filter kinds: register a
/// factory under the identifier bundles use in their `Filters` section.
///
/// # Example
///
/// ```
/// use satchel_bundler::filters::{FilterRegistry, PrependFilter};
///
/// let mut registry = FilterRegistry::with_builtins();
/// registry.register("license", |_args| {
///     Ok(Box::new(PrependFilter::new("/* MIT */\n")))
/// });
/// assert!(registry.contains("license"));
/// ```
#[derive(Clone, Default)]
pub struct FilterRegistry {
    factories: FxHashMap<String, Arc<FilterFactory>>,
}

impl FilterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `prepend`, `append`, `replace` and
    /// `strip-source-maps` filters
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(PrependFilter::IDENTIFIER, |args| {
            Ok(Box::new(PrependFilter::from_args(args)?))
        });
        registry.register(AppendFilter::IDENTIFIER, |args| {
            Ok(Box::new(AppendFilter::from_args(args)?))
        });
        registry.register(ReplaceFilter::IDENTIFIER, |args| {
            Ok(Box::new(ReplaceFilter::from_args(args)?))
        });
        registry.register(StripSourceMapsFilter::IDENTIFIER, |args| {
            Ok(Box::new(StripSourceMapsFilter::from_args(args)?))
        });
        registry
    }

    /// Register a factory, replacing any factory with the same identifier
    pub fn register<F>(&mut self, identifier: impl Into<String>, factory: F)
    where
        F: Fn(&[Value]) -> anyhow::Result<Box<dyn Filter>> + Send + Sync + 'static,
    {
        self.factories.insert(identifier.into(), Arc::new(factory));
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered identifiers, sorted
    pub fn identifiers(&self) -> Vec<&str> {
        let mut identifiers: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        identifiers.sort_unstable();
        identifiers
    }

    /// Construct one filter
    pub fn create(&self, bundle: &str, identifier: &str, args: &[Value]) -> Result<Box<dyn Filter>> {
        let factory = self
            .factories
            .get(identifier)
            .ok_or_else(|| Error::Construction {
                bundle: bundle.to_string(),
                filter: identifier.to_string(),
                reason: "no filter registered under this identifier".to_string(),
            })?;

        factory(args).map_err(|e| Error::Construction {
            bundle: bundle.to_string(),
            filter: identifier.to_string(),
            reason: format!("{e:#}"),
        })
    }

    /// Construct the chain for a bundle's `Filters` section, in configuration order
    pub fn build(
        &self,
        bundle: &str,
        filters: &IndexMap<String, FilterArguments>,
    ) -> Result<FilterChain> {
        let mut chain = FilterChain::new();
        for (identifier, arguments) in filters {
            tracing::debug!(
                bundle,
                filter = %identifier,
                args = arguments.len(),
                "constructing filter"
            );
            chain.push(identifier.clone(), self.create(bundle, identifier, arguments.args())?);
        }
        Ok(chain)
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filters(value: Value) -> IndexMap<String, FilterArguments> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn builtins_are_registered() {
        let registry = FilterRegistry::with_builtins();
        assert_eq!(
            registry.identifiers(),
            vec!["append", "prepend", "replace", "strip-source-maps"]
        );
    }

    #[test]
    fn build_preserves_configuration_order() {
        let registry = FilterRegistry::with_builtins();
        let chain = registry
            .build(
                "Main",
                &filters(json!({
                    "strip-source-maps": null,
                    "append": ["\n"],
                    "prepend": "/* banner */"
                })),
            )
            .unwrap();

        assert_eq!(
            chain.identifiers().collect::<Vec<_>>(),
            vec!["strip-source-maps", "append", "prepend"]
        );
    }

    #[test]
    fn unknown_identifier_is_a_construction_error() {
        let registry = FilterRegistry::with_builtins();
        let err = registry
            .build("Main", &filters(json!({ "lessphp": [] })))
            .unwrap_err();
        assert!(matches!(err, Error::Construction { ref filter, .. } if filter == "lessphp"));
    }

    #[test]
    fn factory_errors_are_construction_errors() {
        let registry = FilterRegistry::with_builtins();
        let err = registry
            .build("Main", &filters(json!({ "replace": ["(unclosed", "x"] })))
            .unwrap_err();
        assert!(matches!(err, Error::Construction { ref filter, .. } if filter == "replace"));
    }

    #[test]
    fn factories_accept_any_number_of_arguments() {
        let mut registry = FilterRegistry::new();
        registry.register("join", |args| {
            let text = args
                .iter()
                .map(|value| value.to_string())
                .collect::<Vec<_>>()
                .join(",");
            Ok(Box::new(AppendFilter::new(text)))
        });

        let args: Vec<Value> = (0..9).map(|n| json!(n)).collect();
        let filter = registry.create("Main", "join", &args).unwrap();
        let mut asset = super::super::Asset::new("");
        filter.apply(&mut asset).unwrap();
        assert_eq!(asset.content(), "0,1,2,3,4,5,6,7,8");
    }
}
