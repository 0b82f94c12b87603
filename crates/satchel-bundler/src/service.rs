//! The public entry point tying resolution, filtering, compilation and
//! publishing together.

use std::fmt;
use std::sync::Arc;

use satchel_config::{
    BundleDefinition, CONFIGURATION_TYPE_ASSETS, ConfigTree, ConfigurationSource,
    FileConfiguration, ServiceSettings,
};

use crate::compiler::Compiler;
use crate::context::{REQUIRED_BUNDLE, RequestContext};
use crate::filters::FilterRegistry;
use crate::publish::{LocalPublisher, PublishError, PublishingGateway};
use crate::resolver::{BundleResolver, ResolvedBundle};
use crate::source::{FsSourceLoader, SourceLoader};
use crate::{Error, Result};

/// Configuration namespace of stylesheet bundles.
pub const NAMESPACE_CSS: &str = "Css";

/// Configuration namespace of script bundles.
pub const NAMESPACE_JS: &str = "Js";

/// Compiles bundles and returns the URIs of their published resources.
///
/// Holds only shared collaborators, so one service can serve many requests;
/// per-request state lives in [`RequestContext`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use satchel_bundler::{
///     AssetService, LocalPublisher, MemorySourceLoader, StaticConfiguration,
/// };
/// use serde_json::json;
///
/// # fn main() -> satchel_bundler::Result<()> {
/// let dir = tempfile::tempdir().unwrap();
/// let config = StaticConfiguration::assets(json!({
///     "Bundles": { "Css": { "Main": { "Files": ["a.css", "b.css"], "PreCompileMerge": true } } }
/// }));
/// let loader = MemorySourceLoader::new()
///     .with_file("a.css", "a{}")
///     .with_file("b.css", "b{}");
///
/// let service = AssetService::new(
///     Arc::new(config),
///     Arc::new(LocalPublisher::new(dir.path().join("store"), dir.path().join("web"), "/r")),
/// )
/// .with_loader(Arc::new(loader));
///
/// let uris = service.css_bundle_uris("Main")?;
/// assert_eq!(uris.len(), 1);
/// assert!(uris[0].ends_with("/Main.css"));
/// # Ok(()) }
/// ```
#[derive(Clone)]
pub struct AssetService {
    config: Arc<dyn ConfigurationSource>,
    filters: Arc<FilterRegistry>,
    loader: Arc<dyn SourceLoader>,
    gateway: Arc<dyn PublishingGateway>,
}

impl AssetService {
    /// Service with the built-in filters and sources read from the working
    /// directory.
    pub fn new(config: Arc<dyn ConfigurationSource>, gateway: Arc<dyn PublishingGateway>) -> Self {
        Self {
            config,
            filters: Arc::new(FilterRegistry::with_builtins()),
            loader: Arc::new(FsSourceLoader::new(".")),
            gateway,
        }
    }

    /// Wire file configuration, filesystem sources and the local publisher
    /// from settings.
    pub fn from_settings(settings: &ServiceSettings) -> Self {
        let publisher = LocalPublisher::new(
            settings.storage_dir.clone(),
            settings.public_dir.clone(),
            settings.base_uri.clone(),
        );

        Self::new(
            Arc::new(FileConfiguration::new(&settings.config_dir)),
            Arc::new(publisher),
        )
        .with_loader(Arc::new(FsSourceLoader::new(settings.source_root.clone())))
    }

    pub fn with_filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = Arc::new(filters);
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn SourceLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Resolve a bundle without compiling it.
    pub fn resolve(
        &self,
        name: &str,
        namespace: &str,
        overrides: BundleDefinition,
    ) -> Result<ResolvedBundle> {
        BundleResolver::new(self.config.as_ref()).resolve(name, namespace, overrides)
    }

    /// Resolve, compile and publish `name` in `namespace`.
    ///
    /// Returns one URI per artifact, in artifact order: a single URI for
    /// merged bundles, one per resolved file otherwise. Nothing is published
    /// unless the whole bundle compiles.
    pub fn compile_assets(
        &self,
        name: &str,
        namespace: &str,
        overrides: BundleDefinition,
    ) -> Result<Vec<String>> {
        let bundle = self.resolve(name, namespace, overrides)?;
        let chain = self.filters.build(&bundle.name, &bundle.filters)?;
        let artifacts = Compiler::new(self.loader.as_ref()).run(&bundle, &chain)?;

        tracing::debug!(
            bundle = name,
            namespace,
            files = bundle.files.len(),
            filters = chain.len(),
            artifacts = artifacts.len(),
            "compiled bundle"
        );

        artifacts
            .iter()
            .map(|artifact| self.publish(&artifact.content, &artifact.suggested_filename))
            .collect()
    }

    /// URIs of CSS bundle `name`.
    pub fn css_bundle_uris(&self, name: &str) -> Result<Vec<String>> {
        self.compile_assets(name, NAMESPACE_CSS, BundleDefinition::default())
    }

    /// URIs of JS bundle `name`.
    pub fn js_bundle_uris(&self, name: &str) -> Result<Vec<String>> {
        self.compile_assets(name, NAMESPACE_JS, BundleDefinition::default())
    }

    /// URIs of the JS bundles required under [`REQUIRED_BUNDLE`] during this
    /// request.
    pub fn required_js(&self, ctx: &RequestContext) -> Result<Vec<String>> {
        self.required_js_for(ctx, REQUIRED_BUNDLE)
    }

    /// Compile `bundle` with the request's required bundles as extra
    /// dependencies. `bundle` must exist in the `Js` namespace, even if empty.
    pub fn required_js_for(&self, ctx: &RequestContext, bundle: &str) -> Result<Vec<String>> {
        let overrides = BundleDefinition::with_dependencies(ctx.required(bundle).iter().cloned());
        self.compile_assets(bundle, NAMESPACE_JS, overrides)
    }

    /// Store and publish `content`, returning its URI.
    pub fn publish(&self, content: &[u8], filename: &str) -> Result<String> {
        let publishing = |source: PublishError| Error::Publishing {
            filename: filename.to_string(),
            source,
        };

        let handle = self
            .gateway
            .create_resource(content, filename)
            .map_err(publishing)?;
        let uri = self
            .gateway
            .publish_persistent_resource(&handle)
            .map_err(publishing)?;

        tracing::info!("Published {} ({} bytes) at {}", filename, content.len(), uri);
        Ok(uri)
    }

    /// Subtree of the `Assets` configuration at dotted `path`.
    pub fn asset_configuration(&self, path: &str) -> Result<Option<ConfigTree>> {
        Ok(self.config.configuration(CONFIGURATION_TYPE_ASSETS, path)?)
    }
}

impl fmt::Debug for AssetService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetService")
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}
