//! The css-minify filter inside a full bundle compilation.

use std::fs;
use std::sync::Arc;

use satchel_bundler::{
    AssetService, Error, FilterRegistry, LocalPublisher, MemorySourceLoader, StaticConfiguration,
};
use serde_json::{Value, json};
use tempfile::TempDir;

fn service(dir: &TempDir, filters: Value) -> AssetService {
    let mut registry = FilterRegistry::with_builtins();
    satchel_filter_css::register(&mut registry);

    let config = StaticConfiguration::assets(json!({ "Bundles": { "Css": { "Site": {
        "Files": ["css/reset.css", "css/site.css"],
        "Filters": filters,
        "PreCompileMerge": true
    } } } }));
    let loader = MemorySourceLoader::new()
        .with_file("css/reset.css", "html {\n  margin: 0px;\n}\n")
        .with_file("css/site.css", "body {\n  color: #ff0000;\n}\n");

    AssetService::new(
        Arc::new(config),
        Arc::new(LocalPublisher::new(
            dir.path().join("store"),
            dir.path().join("web"),
            "/assets",
        )),
    )
    .with_filters(registry)
    .with_loader(Arc::new(loader))
}

fn published(dir: &TempDir, uri: &str) -> String {
    let relative = uri.trim_start_matches("/assets/");
    fs::read_to_string(dir.path().join("web").join(relative)).unwrap()
}

#[test]
fn merged_stylesheet_is_minified() {
    let dir = TempDir::new().unwrap();
    let uris = service(&dir, json!({ "css-minify": null }))
        .css_bundle_uris("Site")
        .unwrap();

    assert_eq!(uris.len(), 1);
    assert!(uris[0].ends_with("/Site.css"));
    assert_eq!(published(&dir, &uris[0]), "html{margin:0}body{color:red}");
}

#[test]
fn banner_survives_when_prepended_after_minification() {
    let dir = TempDir::new().unwrap();
    let uris = service(
        &dir,
        json!({ "css-minify": [], "prepend": ["/* site */\n"] }),
    )
    .css_bundle_uris("Site")
    .unwrap();

    assert!(published(&dir, &uris[0]).starts_with("/* site */\nhtml{"));
}

#[test]
fn invalid_options_fail_construction() {
    let dir = TempDir::new().unwrap();
    let err = service(&dir, json!({ "css-minify": [{ "minfy": true }] }))
        .css_bundle_uris("Site")
        .unwrap_err();

    assert!(matches!(err, Error::Construction { ref filter, .. } if filter == "css-minify"));
}
