//! Positional edits applied to a bundle's file list.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Kind of positional edit relative to an anchor file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlterationKind {
    /// Insert files directly after the anchor
    After,
    /// Insert files directly before the anchor
    Before,
    /// Remove the anchor and splice files in at its position
    #[serde(alias = "Instead")]
    Replace,
}

impl fmt::Display for AlterationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlterationKind::After => write!(f, "After"),
            AlterationKind::Before => write!(f, "Before"),
            AlterationKind::Replace => write!(f, "Replace"),
        }
    }
}

/// Anchor file to ordered edits, both in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alterations(IndexMap<String, IndexMap<AlterationKind, Vec<String>>>);

impl Alterations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add a single edit, replacing an existing edit of the same kind for the anchor.
    pub fn insert(&mut self, anchor: impl Into<String>, kind: AlterationKind, files: Vec<String>) {
        self.0.entry(anchor.into()).or_default().insert(kind, files);
    }

    /// Merge `upper` into `self`; upper's edit wins when an anchor has the same kind twice.
    pub fn merge(&mut self, upper: Alterations) {
        for (anchor, edits) in upper.0 {
            self.0.entry(anchor).or_default().extend(edits);
        }
    }

    /// Apply every edit to `files`.
    ///
    /// The anchor is located again before each edit, so edits see the result
    /// of the ones applied before them. A missing anchor is an error.
    pub fn apply(&self, bundle: &str, files: &mut Vec<String>) -> Result<()> {
        if self.0.is_empty() {
            return Ok(());
        }

        if files.is_empty() {
            return Err(ConfigError::MissingFiles {
                bundle: bundle.to_string(),
            });
        }

        for (anchor, edits) in &self.0 {
            for (kind, inserted) in edits {
                let position = files.iter().position(|file| file == anchor).ok_or_else(|| {
                    ConfigError::AnchorNotFound {
                        bundle: bundle.to_string(),
                        anchor: anchor.clone(),
                        kind: *kind,
                    }
                })?;

                let range = match kind {
                    AlterationKind::After => position + 1..position + 1,
                    AlterationKind::Before => position..position,
                    AlterationKind::Replace => position..position + 1,
                };

                tracing::debug!(bundle, anchor = %anchor, %kind, count = inserted.len(), "applying alteration");
                files.splice(range, inserted.iter().cloned()).for_each(drop);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn single(kind: AlterationKind, anchor: &str, inserted: &[&str]) -> Alterations {
        let mut alterations = Alterations::default();
        alterations.insert(anchor, kind, files(inserted));
        alterations
    }

    #[test]
    fn after_inserts_behind_anchor() {
        let mut list = files(&["a", "b", "c"]);
        single(AlterationKind::After, "b", &["x"])
            .apply("Main", &mut list)
            .unwrap();
        assert_eq!(list, files(&["a", "b", "x", "c"]));
    }

    #[test]
    fn before_inserts_ahead_of_anchor() {
        let mut list = files(&["a", "b", "c"]);
        single(AlterationKind::Before, "b", &["x"])
            .apply("Main", &mut list)
            .unwrap();
        assert_eq!(list, files(&["a", "x", "b", "c"]));
    }

    #[test]
    fn replace_swaps_anchor_for_files() {
        let mut list = files(&["a", "b", "c"]);
        single(AlterationKind::Replace, "b", &["x", "y"])
            .apply("Main", &mut list)
            .unwrap();
        assert_eq!(list, files(&["a", "x", "y", "c"]));
    }

    #[test]
    fn instead_is_an_alias_for_replace() {
        let alterations: Alterations =
            serde_json::from_value(json!({ "b": { "Instead": ["x"] } })).unwrap();

        let mut list = files(&["a", "b", "c"]);
        alterations.apply("Main", &mut list).unwrap();
        assert_eq!(list, files(&["a", "x", "c"]));
    }

    #[test]
    fn edits_for_one_anchor_apply_in_order() {
        let alterations: Alterations = serde_json::from_value(json!({
            "b": { "Before": ["x"], "After": ["y"] }
        }))
        .unwrap();

        let mut list = files(&["a", "b", "c"]);
        alterations.apply("Main", &mut list).unwrap();
        assert_eq!(list, files(&["a", "x", "b", "y", "c"]));
    }

    #[test]
    fn later_anchor_can_target_inserted_file() {
        let alterations: Alterations = serde_json::from_value(json!({
            "a": { "After": ["x"] },
            "x": { "Replace": ["z"] }
        }))
        .unwrap();

        let mut list = files(&["a", "b"]);
        alterations.apply("Main", &mut list).unwrap();
        assert_eq!(list, files(&["a", "z", "b"]));
    }

    #[test]
    fn missing_anchor_is_an_error() {
        let mut list = files(&["a", "b"]);
        let err = single(AlterationKind::After, "missing.js", &["x"])
            .apply("Main", &mut list)
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::AnchorNotFound { ref anchor, kind: AlterationKind::After, .. } if anchor == "missing.js"
        ));
        assert_eq!(list, files(&["a", "b"]));
    }

    #[test]
    fn alterations_without_files_are_an_error() {
        let mut list = Vec::new();
        let err = single(AlterationKind::Before, "a", &["x"])
            .apply("Empty", &mut list)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFiles { .. }));
    }

    #[test]
    fn unknown_kind_fails_to_parse() {
        let parsed = serde_json::from_value::<Alterations>(json!({ "a": { "Around": ["x"] } }));
        assert!(parsed.is_err());
    }
}
