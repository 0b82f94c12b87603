//! Request-scoped state.

use rustc_hash::FxHashMap;

/// Default bundle that accumulated script bundles are compiled under.
pub const REQUIRED_BUNDLE: &str = "Required";

/// State for one request, passed explicitly through the call chain.
///
/// Collects the JS bundles the rendered page asked for so they can be
/// compiled as dependencies of one virtual bundle. Starts empty and is
/// dropped with the request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    required_js: FxHashMap<String, Vec<String>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require JS bundle `name` under [`REQUIRED_BUNDLE`]
    pub fn add_required_js(&mut self, name: impl Into<String>) {
        self.add_required_js_to(REQUIRED_BUNDLE, name);
    }

    /// Require JS bundle `name` under `bundle`. Duplicates are kept.
    pub fn add_required_js_to(&mut self, bundle: impl Into<String>, name: impl Into<String>) {
        self.required_js
            .entry(bundle.into())
            .or_default()
            .push(name.into());
    }

    /// Bundles required under `bundle`, in the order they were added
    pub fn required(&self, bundle: &str) -> &[String] {
        self.required_js.get(bundle).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.required_js.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_in_order_with_duplicates() {
        let mut ctx = RequestContext::new();
        ctx.add_required_js("Forms");
        ctx.add_required_js("Modal");
        ctx.add_required_js("Forms");

        assert_eq!(ctx.required(REQUIRED_BUNDLE), ["Forms", "Modal", "Forms"]);
    }

    #[test]
    fn bundles_are_kept_apart() {
        let mut ctx = RequestContext::new();
        ctx.add_required_js_to("Footer", "Analytics");

        assert!(ctx.required(REQUIRED_BUNDLE).is_empty());
        assert_eq!(ctx.required("Footer"), ["Analytics"]);
        assert!(!ctx.is_empty());
    }

    #[test]
    fn starts_empty() {
        assert!(RequestContext::new().is_empty());
    }
}
