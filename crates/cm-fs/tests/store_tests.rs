//! Tests for the document store

use cm_fs::{DocumentStore, Error, NormalizedPath};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tempfile::tempdir;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Settings {
    root_manifest: String,
    lock_timeout_secs: u64,
}

#[test]
fn json_round_trip_keeps_layout() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("composer.json"));
    let store = DocumentStore::new();
    let doc = json!({"name": "drupal/drupal", "require": {"symfony/yaml": "2.6.*"}});

    let bytes = store.save(&path, &doc).unwrap();
    let text = std::fs::read_to_string(path.to_native()).unwrap();

    assert_eq!(bytes, text.len() as u64);
    assert!(text.contains("\n    \"require\": {\n        \"symfony/yaml\""));
    let loaded: serde_json::Value = store.load(&path).unwrap();
    assert_eq!(loaded, doc);
}

#[test]
fn toml_settings_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("composer_manager.toml");
    std::fs::write(&path, "root_manifest = \"composer.json\"\nlock_timeout_secs = 3\n").unwrap();

    let settings: Settings = DocumentStore::new().load(&NormalizedPath::new(&path)).unwrap();

    assert_eq!(
        settings,
        Settings {
            root_manifest: "composer.json".into(),
            lock_timeout_secs: 3
        }
    );
}

#[rstest]
#[case("composer.json", "{not json", "JSON")]
#[case("composer_manager.toml", "= broken", "TOML")]
fn malformed_documents_report_format(
    #[case] name: &str,
    #[case] content: &str,
    #[case] format: &str,
) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();

    let err = DocumentStore::new()
        .load::<serde_json::Value>(&NormalizedPath::new(&path))
        .unwrap_err();

    match err {
        Error::DocumentParse { format: f, .. } => assert_eq!(f, format),
        other => panic!("expected DocumentParse, got {:?}", other),
    }
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("composer.yml"));

    let err = DocumentStore::new().save(&path, &json!({})).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { .. }));
}
