//! Tests for atomic writes

use cm_fs::{NormalizedPath, io};
use tempfile::tempdir;

#[test]
fn write_atomic_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("core/vendor/composer/installed.json"));

    let written = io::write_text(&path, "[]\n").unwrap();

    assert_eq!(written, 3);
    assert_eq!(io::read_text(&path).unwrap(), "[]\n");
}

#[test]
fn write_atomic_replaces_existing_content() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("composer.json"));

    io::write_text(&path, "{\"name\": \"old\"}\n").unwrap();
    io::write_text(&path, "{}\n").unwrap();

    assert_eq!(io::read_text(&path).unwrap(), "{}\n");
}

#[test]
fn write_atomic_leaves_no_temp_file_behind() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("composer.json"));

    io::write_text(&path, "{}\n").unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .flatten()
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left: {:?}", leftovers);
}

#[test]
fn read_text_missing_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("missing.json"));

    let err = io::read_text(&path).unwrap_err();
    assert!(err.to_string().contains("missing.json"), "got: {}", err);
}

#[test]
fn failed_write_removes_temp_file() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("composer.json/occupied")).unwrap();
    let path = NormalizedPath::new(dir.path().join("composer.json"));

    assert!(io::write_text(&path, "{}\n").is_err());

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .flatten()
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left: {:?}", leftovers);
}
