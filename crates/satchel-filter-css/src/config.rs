use serde::Deserialize;
use serde_json::Value;

/// Options for the `css-minify` filter.
///
/// Configured as an optional single object argument:
///
/// ```yaml
/// Filters:
///   css-minify: [{ minify: false }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CssFilterOptions {
    /// Minify output (merge rules, shorthands, strip whitespace).
    /// When off the stylesheet is only parsed and re-printed.
    pub minify: bool,
}

impl Default for CssFilterOptions {
    fn default() -> Self {
        Self { minify: true }
    }
}

impl CssFilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Options from the filter's constructor arguments.
    pub fn from_args(args: &[Value]) -> anyhow::Result<Self> {
        match args {
            [] | [Value::Null] => Ok(Self::default()),
            [options] => serde_json::from_value(options.clone())
                .map_err(|e| anyhow::anyhow!("invalid css-minify options: {e}")),
            _ => anyhow::bail!("css-minify takes at most 1 argument, got {}", args.len()),
        }
    }
}
