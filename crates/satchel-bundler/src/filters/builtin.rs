//! Filters shipped with the bundler.

use std::borrow::Cow;
use std::sync::OnceLock;

use anyhow::{Context, bail};
use regex::Regex;
use serde_json::Value;

use super::{Asset, Filter};

/// Metadata key recording the reference removed by [`StripSourceMapsFilter`].
pub const SOURCE_MAP_METADATA: &str = "source_map";

fn expect_arity(filter: &str, args: &[Value], min: usize, max: usize) -> anyhow::Result<()> {
    if args.len() < min || args.len() > max {
        if min == max {
            bail!("`{filter}` takes {min} argument(s), got {}", args.len());
        }
        bail!(
            "`{filter}` takes {min} to {max} arguments, got {}",
            args.len()
        );
    }
    Ok(())
}

fn string_arg<'a>(filter: &str, args: &'a [Value], index: usize) -> anyhow::Result<&'a str> {
    match args.get(index) {
        Some(Value::String(text)) => Ok(text),
        Some(other) => bail!("`{filter}` argument {index} must be a string, got {other}"),
        None => bail!("`{filter}` is missing argument {index}"),
    }
}

/// Prefix content with a fixed banner
#[derive(Debug, Clone)]
pub struct PrependFilter {
    text: String,
}

impl PrependFilter {
    pub const IDENTIFIER: &'static str = "prepend";

    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn from_args(args: &[Value]) -> anyhow::Result<Self> {
        expect_arity(Self::IDENTIFIER, args, 1, 1)?;
        Ok(Self::new(string_arg(Self::IDENTIFIER, args, 0)?))
    }
}

impl Filter for PrependFilter {
    fn name(&self) -> Cow<'static, str> {
        Self::IDENTIFIER.into()
    }

    fn apply(&self, asset: &mut Asset) -> anyhow::Result<()> {
        let content = format!("{}{}", self.text, asset.content());
        asset.set_content(content);
        Ok(())
    }
}

/// Suffix content with a fixed footer
#[derive(Debug, Clone)]
pub struct AppendFilter {
    text: String,
}

impl AppendFilter {
    pub const IDENTIFIER: &'static str = "append";

    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn from_args(args: &[Value]) -> anyhow::Result<Self> {
        expect_arity(Self::IDENTIFIER, args, 1, 1)?;
        Ok(Self::new(string_arg(Self::IDENTIFIER, args, 0)?))
    }
}

impl Filter for AppendFilter {
    fn name(&self) -> Cow<'static, str> {
        Self::IDENTIFIER.into()
    }

    fn apply(&self, asset: &mut Asset) -> anyhow::Result<()> {
        let content = format!("{}{}", asset.content(), self.text);
        asset.set_content(content);
        Ok(())
    }
}

/// Regex substitution over the whole content.
///
/// The replacement string supports `$1` / `${name}` group references.
#[derive(Debug, Clone)]
pub struct ReplaceFilter {
    pattern: Regex,
    replacement: String,
}

impl ReplaceFilter {
    pub const IDENTIFIER: &'static str = "replace";

    pub fn new(pattern: &str, replacement: impl Into<String>) -> anyhow::Result<Self> {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("invalid `{}` pattern `{pattern}`", Self::IDENTIFIER))?;
        Ok(Self {
            pattern,
            replacement: replacement.into(),
        })
    }

    pub fn from_args(args: &[Value]) -> anyhow::Result<Self> {
        expect_arity(Self::IDENTIFIER, args, 2, 2)?;
        Self::new(
            string_arg(Self::IDENTIFIER, args, 0)?,
            string_arg(Self::IDENTIFIER, args, 1)?,
        )
    }
}

impl Filter for ReplaceFilter {
    fn name(&self) -> Cow<'static, str> {
        Self::IDENTIFIER.into()
    }

    fn apply(&self, asset: &mut Asset) -> anyhow::Result<()> {
        if let Cow::Owned(content) = self
            .pattern
            .replace_all(asset.content(), self.replacement.as_str())
        {
            asset.set_content(content);
        }
        Ok(())
    }
}

fn source_map_comment() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*(?://|/\*)[#@] ?sourceMappingURL=([^\s*]+)[ \t]*(?:\*/)?[ \t]*\r?\n?")
            .expect("static source map pattern")
    })
}

/// Remove `sourceMappingURL` comments.
///
/// Source maps point at the unbundled file and are wrong once files are
/// merged or rewritten. The last removed reference is kept in the asset
/// metadata under [`SOURCE_MAP_METADATA`].
#[derive(Debug, Clone, Default)]
pub struct StripSourceMapsFilter;

impl StripSourceMapsFilter {
    pub const IDENTIFIER: &'static str = "strip-source-maps";

    pub fn new() -> Self {
        Self
    }

    pub fn from_args(args: &[Value]) -> anyhow::Result<Self> {
        expect_arity(Self::IDENTIFIER, args, 0, 0)?;
        Ok(Self)
    }
}

impl Filter for StripSourceMapsFilter {
    fn name(&self) -> Cow<'static, str> {
        Self::IDENTIFIER.into()
    }

    fn apply(&self, asset: &mut Asset) -> anyhow::Result<()> {
        let pattern = source_map_comment();
        let Some(reference) = pattern
            .captures_iter(asset.content())
            .last()
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
        else {
            return Ok(());
        };

        let stripped = pattern.replace_all(asset.content(), "").into_owned();
        asset.set_content(stripped);
        asset.set_metadata(SOURCE_MAP_METADATA, reference);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prepend_and_append_wrap_content() {
        let mut asset = Asset::new("body");
        PrependFilter::new("/* head */\n").apply(&mut asset).unwrap();
        AppendFilter::new("\n/* tail */").apply(&mut asset).unwrap();
        assert_eq!(asset.content(), "/* head */\nbody\n/* tail */");
    }

    #[test]
    fn prepend_requires_a_string() {
        assert!(PrependFilter::from_args(&[]).is_err());
        assert!(PrependFilter::from_args(&[json!(4)]).is_err());
        assert!(PrependFilter::from_args(&[json!("a"), json!("b")]).is_err());
    }

    #[test]
    fn replace_supports_group_references() {
        let filter = ReplaceFilter::from_args(&[json!(r"url\((\w+)\.png\)"), json!("url($1.webp)")])
            .unwrap();
        let mut asset = Asset::new("a { background: url(logo.png) }");
        filter.apply(&mut asset).unwrap();
        assert_eq!(asset.content(), "a { background: url(logo.webp) }");
    }

    #[test]
    fn replace_rejects_invalid_pattern() {
        let err = ReplaceFilter::from_args(&[json!("(open"), json!("")]).unwrap_err();
        assert!(format!("{err:#}").contains("invalid `replace` pattern"));
    }

    #[test]
    fn strip_source_maps_removes_line_and_block_comments() {
        let mut asset = Asset::new(
            "var a = 1;\n//# sourceMappingURL=app.js.map\nvar b = 2;\n/*# sourceMappingURL=b.css.map */\n",
        );
        StripSourceMapsFilter.apply(&mut asset).unwrap();

        assert_eq!(asset.content(), "var a = 1;\nvar b = 2;\n");
        assert_eq!(
            asset.metadata().get(SOURCE_MAP_METADATA).map(String::as_str),
            Some("b.css.map")
        );
    }

    #[test]
    fn strip_source_maps_leaves_clean_content_alone() {
        let mut asset = Asset::new("body { color: red }");
        StripSourceMapsFilter.apply(&mut asset).unwrap();
        assert_eq!(asset.content(), "body { color: red }");
        assert!(asset.metadata().is_empty());
    }

    #[test]
    fn strip_source_maps_takes_no_arguments() {
        assert!(StripSourceMapsFilter::from_args(&[]).is_ok());
        assert!(StripSourceMapsFilter::from_args(&[json!(true)]).is_err());
    }
}
