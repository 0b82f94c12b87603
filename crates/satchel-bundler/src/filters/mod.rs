//! Content filters and the chain that runs them.
//!
//! A filter transforms one [`Asset`] in place: its content, its metadata, or
//! both. Filters are built by name from bundle configuration through the
//! [`FilterRegistry`] and applied in configuration order.

mod builtin;
mod registry;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

pub use builtin::{
    AppendFilter, PrependFilter, ReplaceFilter, SOURCE_MAP_METADATA, StripSourceMapsFilter,
};
pub use registry::{FilterFactory, FilterRegistry};

use crate::{Error, Result};

/// A single logical asset passing through a filter chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Asset {
    content: String,
    source_path: Option<String>,
    target_path: Option<String>,
    metadata: BTreeMap<String, String>,
}

impl Asset {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Asset read from a bundle file.
    pub fn from_source(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn into_content(self) -> String {
        self.content
    }

    /// Bundle file this asset was read from; `None` for merged collections.
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// Filename the asset will be published under.
    pub fn target_path(&self) -> Option<&str> {
        self.target_path.as_deref()
    }

    pub fn set_target_path(&mut self, target: impl Into<String>) {
        self.target_path = Some(target.into());
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }
}

/// Content transformer applied during compilation.
///
/// Filters must give the same output for the same input; merged bundles rely
/// on that to publish byte-identical resources.
pub trait Filter: Send + Sync + fmt::Debug {
    /// Name used in logs
    fn name(&self) -> Cow<'static, str>;

    /// Transform the asset in place
    fn apply(&self, asset: &mut Asset) -> anyhow::Result<()>;
}

/// Ordered, instantiated filters for one compilation.
#[derive(Debug, Default)]
pub struct FilterChain {
    filters: Vec<(String, Box<dyn Filter>)>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter under the identifier it was configured with
    pub fn push(&mut self, identifier: impl Into<String>, filter: Box<dyn Filter>) {
        self.filters.push((identifier.into(), filter));
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Configured identifiers in application order
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|(identifier, _)| identifier.as_str())
    }

    /// Run every filter over `asset`, each one seeing the previous output.
    ///
    /// `label` names the asset in errors: the file path, or `merged:<bundle>`.
    pub fn apply(&self, bundle: &str, label: &str, asset: &mut Asset) -> Result<()> {
        for (identifier, filter) in &self.filters {
            tracing::debug!(bundle, asset = label, filter = %filter.name(), "applying filter");
            filter
                .apply(asset)
                .map_err(|source| Error::FilterExecution {
                    bundle: bundle.to_string(),
                    filter: identifier.clone(),
                    asset: label.to_string(),
                    source,
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Failing;

    impl Filter for Failing {
        fn name(&self) -> Cow<'static, str> {
            "failing".into()
        }

        fn apply(&self, _asset: &mut Asset) -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }
    }

    #[test]
    fn chain_feeds_each_output_into_the_next_filter() {
        let mut chain = FilterChain::new();
        chain.push("prepend", Box::new(PrependFilter::new("<")));
        chain.push("append", Box::new(AppendFilter::new(">")));

        let mut asset = Asset::new("body");
        chain.apply("Main", "a.css", &mut asset).unwrap();
        assert_eq!(asset.content(), "<body>");
        assert_eq!(chain.identifiers().collect::<Vec<_>>(), vec!["prepend", "append"]);
    }

    #[test]
    fn failure_names_filter_and_asset() {
        let mut chain = FilterChain::new();
        chain.push("prepend", Box::new(PrependFilter::new("x")));
        chain.push("custom-failing", Box::new(Failing));

        let err = chain
            .apply("Main", "js/app.js", &mut Asset::new(""))
            .unwrap_err();
        match err {
            Error::FilterExecution {
                bundle,
                filter,
                asset,
                ..
            } => {
                assert_eq!(bundle, "Main");
                assert_eq!(filter, "custom-failing");
                assert_eq!(asset, "js/app.js");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn metadata_is_ordered_by_key() {
        let mut asset = Asset::new("");
        asset.set_metadata("z", "1");
        asset.set_metadata("a", "2");
        assert_eq!(asset.metadata().keys().collect::<Vec<_>>(), vec!["a", "z"]);
    }
}
