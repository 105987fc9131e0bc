//! Site settings read from `composer_manager.toml`
//!
//! Every key is optional. A site without the file uses the standard layout:
//!
//! ```toml
//! core_manifest = "core/composer.json"
//! root_manifest = "composer.json"
//! installed = "core/vendor/composer/installed.json"
//! lock_file = ".composer-manager.lock"
//! lock_timeout_secs = 10
//! composer_binary = "composer"
//! # module_path = "modules/contrib/composer_manager"
//! ```

use std::time::Duration;

use cm_fs::{DocumentStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name of the settings document at the site root.
pub const SETTINGS_FILENAME: &str = "composer_manager.toml";

/// Location of this module when it cannot be discovered.
pub const DEFAULT_MODULE_PATH: &str = "modules/composer_manager";

fn default_core_manifest() -> String {
    "core/composer.json".to_string()
}

fn default_root_manifest() -> String {
    "composer.json".to_string()
}

fn default_installed() -> String {
    "core/vendor/composer/installed.json".to_string()
}

fn default_lock_file() -> String {
    ".composer-manager.lock".to_string()
}

fn default_lock_timeout_secs() -> u64 {
    10
}

fn default_composer_binary() -> String {
    "composer".to_string()
}

/// Paths are relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_core_manifest")]
    pub core_manifest: String,

    #[serde(default = "default_root_manifest")]
    pub root_manifest: String,

    /// Installed-package snapshot written by the resolver.
    #[serde(default = "default_installed")]
    pub installed: String,

    /// This module's directory; discovered when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_path: Option<String>,

    #[serde(default = "default_lock_file")]
    pub lock_file: String,

    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,

    #[serde(default = "default_composer_binary")]
    pub composer_binary: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            core_manifest: default_core_manifest(),
            root_manifest: default_root_manifest(),
            installed: default_installed(),
            module_path: None,
            lock_file: default_lock_file(),
            lock_timeout_secs: default_lock_timeout_secs(),
            composer_binary: default_composer_binary(),
        }
    }
}

impl Settings {
    /// Load settings for the site at `root`, falling back to defaults when the
    /// file does not exist.
    pub fn load(root: &NormalizedPath) -> Result<Self> {
        let path = root.join(SETTINGS_FILENAME);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let settings = DocumentStore::new()
            .load(&path)
            .map_err(|source| Error::ManifestRead {
                path: path.to_native(),
                source,
            })?;
        tracing::debug!(%path, "loaded settings");
        Ok(settings)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.lock_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_document_overrides_keys() {
        let settings: Settings = toml::from_str(
            r#"
            lock_timeout_secs = 3
            module_path = "modules/contrib/composer_manager"
            "#,
        )
        .unwrap();
        assert_eq!(settings.lock_timeout_secs, 3);
        assert_eq!(settings.module_path.as_deref(), Some("modules/contrib/composer_manager"));
        assert_eq!(settings.core_manifest, "core/composer.json");
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&NormalizedPath::new(dir.path())).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
