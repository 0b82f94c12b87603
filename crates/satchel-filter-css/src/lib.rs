//! CSS filter for satchel backed by lightningcss
//!
//! Registers a `css-minify` filter that parses each stylesheet and prints it
//! back, minified by default.
//!
//! ## Example Usage
//!
//! ```rust
//! use satchel_bundler::FilterRegistry;
//!
//! let mut registry = FilterRegistry::with_builtins();
//! satchel_filter_css::register(&mut registry);
//! assert!(registry.contains("css-minify"));
//! ```

use std::borrow::Cow;

use lightningcss::{
    printer::PrinterOptions,
    stylesheet::{MinifyOptions, ParserOptions, StyleSheet},
};
use satchel_bundler::{Asset, Filter, FilterRegistry};

mod config;
pub use config::CssFilterOptions;

/// Identifier the filter is registered under.
pub const IDENTIFIER: &str = "css-minify";

/// Register the CSS filter with `registry`.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(IDENTIFIER, |args| {
        Ok(Box::new(CssMinifyFilter::with_options(
            CssFilterOptions::from_args(args)?,
        )))
    });
}

/// Filter that processes stylesheets using lightningcss
#[derive(Debug, Clone, Default)]
pub struct CssMinifyFilter {
    options: CssFilterOptions,
}

impl CssMinifyFilter {
    /// Create a new filter with default options (minify on)
    ///
    /// ```rust
    /// use satchel_filter_css::CssMinifyFilter;
    ///
    /// let filter = CssMinifyFilter::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CssFilterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CssFilterOptions {
        &self.options
    }

    fn process_css(&self, filename: &str, source: &str) -> anyhow::Result<String> {
        let mut stylesheet = StyleSheet::parse(
            source,
            ParserOptions {
                filename: filename.to_string(),
                ..Default::default()
            },
        )
        .map_err(|e| anyhow::anyhow!("Failed to parse CSS from {}: {}", filename, e))?;

        if self.options.minify {
            stylesheet
                .minify(MinifyOptions::default())
                .map_err(|e| anyhow::anyhow!("Failed to minify CSS from {}: {}", filename, e))?;
        }

        let result = stylesheet
            .to_css(PrinterOptions {
                minify: self.options.minify,
                ..Default::default()
            })
            .map_err(|e| anyhow::anyhow!("Failed to print CSS from {}: {}", filename, e))?;

        Ok(result.code)
    }
}

impl Filter for CssMinifyFilter {
    fn name(&self) -> Cow<'static, str> {
        IDENTIFIER.into()
    }

    fn apply(&self, asset: &mut Asset) -> anyhow::Result<()> {
        let filename = asset
            .source_path()
            .or(asset.target_path())
            .unwrap_or("merged.css")
            .to_string();

        let before = asset.content().len();
        let code = self.process_css(&filename, asset.content())?;
        tracing::debug!(
            "[satchel-css] Processed {} ({} → {} bytes, minify: {})",
            filename,
            before,
            code.len(),
            self.options.minify
        );

        asset.set_content(code);
        Ok(())
    }
}
