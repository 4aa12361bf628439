//! Tests for user config loading.

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

/// Write JSON5 contents to a path, creating parent directories if needed.
fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

/// JSON5 syntax (comments, unquoted keys, trailing commas) is accepted.
#[test]
fn parses_json5_documents() {
    let config = UserConfig::load_from_str(
        r#"{
            // project overrides
            srcDir: 'app',
            vite: { clearScreen: false, },
        }"#,
    )
    .expect("config");
    assert_eq!(
        config.value(),
        &json!({ "srcDir": "app", "vite": { "clearScreen": false } })
    );
}

#[test]
fn rejects_non_object_roots() {
    let err = UserConfig::load_from_str("[1, 2]").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(format!("{err}").contains("expected an object"));

    let err = UserConfig::from_value(json!("app")).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn reports_parse_and_read_failures() {
    let err = UserConfig::load_from_str("{ srcDir: ").unwrap_err();
    assert!(matches!(err, ConfigError::ParseFailed(_)));

    let temp = TempDir::new().expect("tmp");
    let err = UserConfig::load_from_path(temp.path().join("missing.json5")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed(_)));
}

#[test]
fn loads_from_path() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("keystone.json5");
    write_json5(&path, "{ dev: true }");
    let config = UserConfig::load_from_path(&path).expect("config");
    assert_eq!(config.into_value(), json!({ "dev": true }));
}

#[test]
fn default_is_an_empty_object() {
    assert_eq!(UserConfig::default().value(), &json!({}));
}

/// Later layers win; objects merge key by key.
#[test]
fn layers_merge_in_precedence_order() {
    let temp = TempDir::new().expect("tmp");
    let base = temp.path().join("base.json5");
    let project = temp.path().join("project").join("keystone.json5");
    write_json5(
        &base,
        "{ srcDir: 'src', vite: { clearScreen: true, mode: 'production' } }",
    );
    write_json5(&project, "{ vite: { mode: 'staging' } }");

    let layered = LayeredUserConfig::load([
        UserConfigLayer::file("base", &base),
        UserConfigLayer::file("project", &project),
        UserConfigLayer::inline("cli", "{ dev: true }"),
    ])
    .expect("layered");

    assert_eq!(
        layered.config.value(),
        &json!({
            "srcDir": "src",
            "vite": { "clearScreen": true, "mode": "staging" },
            "dev": true
        })
    );
    let labels: Vec<&str> = layered
        .layers
        .iter()
        .map(|layer| layer.label.as_str())
        .collect();
    assert_eq!(labels, vec!["base", "project", "cli"]);
    assert_eq!(layered.layers[0].path.as_deref(), Some(base.as_path()));
    assert_eq!(layered.layers[2].path, None);
}

#[test]
fn missing_optional_layers_are_skipped() {
    let temp = TempDir::new().expect("tmp");
    let layered = LayeredUserConfig::load([
        UserConfigLayer::optional_file("home", temp.path().join("absent.json5")),
        UserConfigLayer::value("runtime", json!({ "debug": true })),
    ])
    .expect("layered");
    assert_eq!(layered.layers.len(), 1);
    assert_eq!(layered.layers[0].label, "runtime");
    assert_eq!(layered.into_value(), json!({ "debug": true }));
}

#[test]
fn missing_required_layers_fail() {
    let temp = TempDir::new().expect("tmp");
    let err = LayeredUserConfig::load([UserConfigLayer::file(
        "project",
        temp.path().join("absent.json5"),
    )])
    .unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed(_)));
}

#[test]
fn invalid_layers_name_the_layer() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("list.json5");
    write_json5(&path, "['not', 'an', 'object']");
    let err = LayeredUserConfig::load([UserConfigLayer::file("project", &path)]).unwrap_err();
    assert!(format!("{err}").contains("project("));
}
