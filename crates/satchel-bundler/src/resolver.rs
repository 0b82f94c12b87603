//! Bundle resolution: load, layer overrides, merge dependencies, apply
//! alterations.

use indexmap::IndexMap;
use satchel_config::{
    BundleDefinition, CONFIGURATION_TYPE_ASSETS, ConfigError, ConfigurationSource,
    FilterArguments,
};

use crate::{Error, Result};

/// A bundle after dependency merge and alteration application.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBundle {
    pub name: String,
    pub namespace: String,
    /// Final file list in compile order
    pub files: Vec<String>,
    /// Filter identifiers and arguments in application order
    pub filters: IndexMap<String, FilterArguments>,
    pub pre_compile_merge: bool,
}

impl ResolvedBundle {
    fn from_definition(name: &str, namespace: &str, definition: BundleDefinition) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            pre_compile_merge: definition.merges(),
            files: definition.files,
            filters: definition.filters,
        }
    }
}

/// Resolves bundle definitions from a configuration source.
///
/// Definitions are read from the source on every call.
pub struct BundleResolver<'a> {
    config: &'a dyn ConfigurationSource,
}

impl<'a> BundleResolver<'a> {
    pub fn new(config: &'a dyn ConfigurationSource) -> Self {
        Self { config }
    }

    /// Resolve `name` in `namespace`, with `overrides` layered over the
    /// configured definition.
    ///
    /// # Errors
    ///
    /// - `ConfigError::BundleNotFound` for an unknown bundle or namespace,
    ///   including unknown dependencies
    /// - `Error::CyclicDependency` when a bundle reaches itself through its
    ///   dependencies
    /// - `ConfigError::MissingFiles` / `ConfigError::AnchorNotFound` when
    ///   alterations cannot be applied
    pub fn resolve(
        &self,
        name: &str,
        namespace: &str,
        overrides: BundleDefinition,
    ) -> Result<ResolvedBundle> {
        let mut stack = Vec::new();
        let resolved = self.resolve_layer(name, namespace, overrides, &mut stack)?;
        Ok(ResolvedBundle::from_definition(name, namespace, resolved))
    }

    /// Raw configured definition of `name` in `namespace`.
    pub fn load_definition(&self, name: &str, namespace: &str) -> Result<BundleDefinition> {
        let not_found = || ConfigError::BundleNotFound {
            bundle: name.to_string(),
            namespace: namespace.to_string(),
        };

        let path = format!("Bundles.{namespace}");
        let mut bundles = self
            .config
            .configuration(CONFIGURATION_TYPE_ASSETS, &path)?
            .ok_or_else(not_found)?;

        // Bundle names may contain dots, so index the namespace map directly
        let value = bundles
            .as_object_mut()
            .and_then(|bundles| bundles.remove(name))
            .ok_or_else(not_found)?;

        Ok(BundleDefinition::from_value(name, value)?)
    }

    /// Resolved shape of one bundle: files, filters and merge mode, with its
    /// dependencies folded in and alterations applied.
    fn resolve_layer(
        &self,
        name: &str,
        namespace: &str,
        overrides: BundleDefinition,
        stack: &mut Vec<String>,
    ) -> Result<BundleDefinition> {
        if stack.iter().any(|visited| visited == name) {
            let mut chain = stack.clone();
            chain.push(name.to_string());
            return Err(Error::CyclicDependency { chain });
        }

        let definition = overrides.layer_over(self.load_definition(name, namespace)?);
        tracing::debug!(
            bundle = name,
            namespace,
            dependencies = definition.dependencies.len(),
            "resolving bundle"
        );

        stack.push(name.to_string());
        let mut merged = BundleDefinition::default();
        for dependency in &definition.dependencies {
            let resolved =
                self.resolve_layer(dependency, namespace, BundleDefinition::default(), stack)?;
            merged = resolved.layer_over(merged);
        }
        stack.pop();

        let BundleDefinition {
            files,
            filters,
            pre_compile_merge,
            alterations,
            ..
        } = definition;
        let own = BundleDefinition {
            files,
            filters,
            pre_compile_merge,
            ..BundleDefinition::default()
        };
        let mut merged = own.layer_over(merged);

        alterations.apply(name, &mut merged.files)?;

        Ok(merged)
    }
}
