//! Compilation of resolved bundles into publishable artifacts.

use std::path::Path;

use crate::filters::{Asset, FilterChain};
use crate::resolver::ResolvedBundle;
use crate::source::SourceLoader;
use crate::Result;

/// One compiled output, ready for publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    pub content: Vec<u8>,
    pub suggested_filename: String,
    /// Bundle files that went into this artifact
    pub sources: Vec<String>,
}

/// Runs filter chains over bundle files.
pub struct Compiler<'a> {
    loader: &'a dyn SourceLoader,
}

impl<'a> Compiler<'a> {
    pub fn new(loader: &'a dyn SourceLoader) -> Self {
        Self { loader }
    }

    /// Compile `bundle` with `chain`.
    ///
    /// Merged bundles give exactly one artifact, others one artifact per file
    /// in file order. Any failure aborts the whole run.
    pub fn run(&self, bundle: &ResolvedBundle, chain: &FilterChain) -> Result<Vec<CompiledArtifact>> {
        if bundle.pre_compile_merge {
            return Ok(vec![self.compile_merged(bundle, chain)?]);
        }

        bundle
            .files
            .iter()
            .map(|path| self.compile_file(bundle, chain, path))
            .collect()
    }

    fn compile_merged(&self, bundle: &ResolvedBundle, chain: &FilterChain) -> Result<CompiledArtifact> {
        let contents = bundle
            .files
            .iter()
            .map(|path| self.loader.load(path))
            .collect::<Result<Vec<_>>>()?;

        let filename = merged_filename(&bundle.name, &bundle.namespace);
        let mut asset = Asset::new(contents.join("\n"));
        asset.set_target_path(filename.clone());

        let label = format!("merged:{}", bundle.name);
        chain.apply(&bundle.name, &label, &mut asset)?;

        tracing::debug!(
            bundle = %bundle.name,
            files = bundle.files.len(),
            filename = %filename,
            "compiled merged bundle"
        );

        Ok(CompiledArtifact {
            content: asset.into_content().into_bytes(),
            suggested_filename: filename,
            sources: bundle.files.clone(),
        })
    }

    fn compile_file(
        &self,
        bundle: &ResolvedBundle,
        chain: &FilterChain,
        path: &str,
    ) -> Result<CompiledArtifact> {
        let filename = file_filename(path, &bundle.namespace);
        let mut asset = Asset::from_source(path, self.loader.load(path)?);
        asset.set_target_path(filename.clone());

        chain.apply(&bundle.name, path, &mut asset)?;

        Ok(CompiledArtifact {
            content: asset.into_content().into_bytes(),
            suggested_filename: filename,
            sources: vec![path.to_string()],
        })
    }
}

/// Filename of a merged bundle: `Vendor:Main` in `Css` gives `Vendor.Main.css`.
pub fn merged_filename(bundle: &str, namespace: &str) -> String {
    format!("{}.{}", bundle.replace(':', "."), namespace.to_lowercase())
}

/// Filename of a single compiled file: `styles/site.less` in `Css` gives
/// `site.css`.
pub fn file_filename(path: &str, namespace: &str) -> String {
    let stem = Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(path);
    format!("{stem}.{}", namespace.to_lowercase())
}
