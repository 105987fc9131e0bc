//! [`TestSite`] builder for composer-manager test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

/// A temporary site root with helpers to lay out core, extensions and the
/// installed-package snapshot.
///
/// # Example
///
/// ```rust,no_run
/// use cm_test_utils::TestSite;
/// use serde_json::json;
///
/// let site = TestSite::new();
/// site.core_manifest(&json!({"name": "drupal/core", "require": {}}));
/// site.module("modules/test1", "test1", Some(&json!({"name": "drupal/test1"})));
/// site.assert_file_exists("modules/test1/test1.info.yml");
/// ```
pub struct TestSite {
    temp_dir: TempDir,
}

impl Default for TestSite {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSite {
    /// Create an empty site root.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("TestSite::write: failed to create {}: {e}", parent.display()));
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("TestSite::write: failed to write {}: {e}", path.display()));
    }

    pub fn write_json(&self, relative: &str, value: &Value) {
        self.write(relative, &serde_json::to_string_pretty(value).unwrap());
    }

    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("Could not read {}: {e}", path.display()))
    }

    pub fn read_json(&self, relative: &str) -> Value {
        serde_json::from_str(&self.read(relative)).unwrap()
    }

    /// Write `core/composer.json`.
    pub fn core_manifest(&self, manifest: &Value) {
        self.write_json("core/composer.json", manifest);
    }

    /// Write `core/vendor/composer/installed.json`.
    pub fn installed(&self, packages: &Value) {
        self.write_json("core/vendor/composer/installed.json", packages);
    }

    /// Create a module in `directory`, optionally shipping a `composer.json`.
    pub fn module(&self, directory: &str, name: &str, manifest: Option<&Value>) {
        self.extension(directory, name, "module", manifest);
    }

    /// Create an installation profile in `directory`.
    pub fn profile(&self, directory: &str, name: &str, manifest: Option<&Value>) {
        self.extension(directory, name, "profile", manifest);
    }

    fn extension(&self, directory: &str, name: &str, kind: &str, manifest: Option<&Value>) {
        self.write(&format!("{directory}/{name}.info.yml"), &format!("name: {name}\ntype: {kind}\n"));
        if let Some(manifest) = manifest {
            self.write_json(&format!("{directory}/composer.json"), manifest);
        }
    }

    /// Assert that `relative` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, relative: &str) {
        let full_path = self.path(relative);
        assert!(full_path.exists(), "Expected file to exist: {}", full_path.display());
    }

    /// Assert that `relative` does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, relative: &str) {
        let full_path = self.path(relative);
        assert!(!full_path.exists(), "Expected file NOT to exist: {}", full_path.display());
    }
}
