//! Building the root `composer.json`
//!
//! The root manifest replaces the one shipped with core. It carries core's
//! requirements merged with every extension's, a fixed identity, provenance
//! metadata, and the entries that keep this module's own Composer commands
//! working after the file is regenerated.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use cm_fs::NormalizedPath;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::manifest::{
    Autoload, ComponentManifest, ComponentPackage, ConstraintMap, PathSpec, Stability,
    is_platform_package,
};
use crate::merge::ManifestMerger;

/// Package name of the generated root manifest.
pub const ROOT_PACKAGE_NAME: &str = "drupal/drupal";
/// Package name of the core manifest, replaced by the root package.
pub const CORE_PACKAGE_NAME: &str = "drupal/core";
pub const ROOT_LICENSE: &str = "GPL-2.0+";

/// Installer plugin the shipped root manifest used to require.
pub const INSTALLER_PACKAGE: &str = "composer/installers";
pub const INSTALLER_CONSTRAINT: &str = "^1.0.20";

/// PSR-4 namespace holding the Composer command callbacks.
pub const COMMAND_NAMESPACE: &str = "Drupal\\composer_manager\\Composer\\";
const COMMAND_CLASS: &str = "Drupal\\composer_manager\\Composer\\Command";

/// Script bindings injected into every root manifest.
pub const FIXED_SCRIPTS: [(&str, &str); 4] = [
    ("post-install-cmd", "rewriteAutoload"),
    ("drupal-rebuild", "rebuild"),
    ("drupal-install", "install"),
    ("drupal-update", "update"),
];

/// Fixed installation policy of the root manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RootConfig {
    pub preferred_install: String,
    pub autoloader_suffix: String,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            preferred_install: "dist".to_string(),
            autoloader_suffix: "Drupal8".to_string(),
        }
    }
}

/// The `extra` section: provenance plus anything an alter hook adds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(rename = "_generator")]
    pub generator: String,
    /// Contributing package names joined by `", "`.
    #[serde(rename = "_sources")]
    pub sources: String,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// The generated root manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RootManifest {
    pub name: String,
    #[serde(rename = "type")]
    pub package_type: String,
    pub license: String,
    pub require: ConstraintMap,
    #[serde(default)]
    pub require_dev: ConstraintMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conflict: ConstraintMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub provide: ConstraintMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub suggest: ConstraintMap,
    pub minimum_stability: Stability,
    pub prefer_stable: bool,
    /// `None` keeps the key out of the document entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repositories: Option<Vec<Value>>,
    pub replace: ConstraintMap,
    #[serde(default)]
    pub scripts: BTreeMap<String, Value>,
    #[serde(default)]
    pub autoload: Autoload,
    #[serde(default)]
    pub config: RootConfig,
    pub extra: Provenance,
}

impl RootManifest {
    /// Re-establish the document invariants after outside modification.
    ///
    /// Drops platform packages from both requirement maps and turns an empty
    /// repository list into an absent one.
    pub fn normalize(&mut self) {
        filter_platform_packages(&mut self.require);
        filter_platform_packages(&mut self.require_dev);
        if self.repositories.as_ref().is_some_and(Vec::is_empty) {
            self.repositories = None;
        }
    }

    /// Contributor names recorded in `extra._sources`.
    pub fn sources(&self) -> Vec<&str> {
        self.extra
            .sources
            .split(", ")
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// Remove every platform pseudo-package from `requirements`.
pub fn filter_platform_packages(requirements: &mut ConstraintMap) {
    requirements.retain(|package, _| {
        let keep = !is_platform_package(package);
        if !keep {
            tracing::debug!(%package, "dropping platform package");
        }
        keep
    });
}

/// Builds [`RootManifest`]s from the core manifest and extension manifests.
#[derive(Debug, Clone)]
pub struct RootPackageBuilder {
    /// Directory of this module relative to the site root.
    module_path: NormalizedPath,
    /// Directory holding the core manifest, relative to the site root.
    core_directory: String,
    /// Fixed generation time; `None` stamps the current time.
    generated_at: Option<DateTime<Utc>>,
    merger: ManifestMerger,
}

impl RootPackageBuilder {
    pub fn new(module_path: impl Into<NormalizedPath>) -> Self {
        Self {
            module_path: module_path.into(),
            core_directory: "core".to_string(),
            generated_at: None,
            merger: ManifestMerger::new(),
        }
    }

    /// Use a different directory name when rebasing core's `lib/` paths.
    pub fn with_core_directory(mut self, directory: impl Into<String>) -> Self {
        self.core_directory = directory.into();
        self
    }

    /// Stamp every build with `at` instead of the current time.
    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    pub fn module_path(&self) -> &NormalizedPath {
        &self.module_path
    }

    /// Build the root manifest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoreManifest`] when `core` has no `name` or no
    /// `require` section.
    pub fn build(
        &self,
        core: &ComponentManifest,
        extensions: &[ComponentPackage],
    ) -> Result<RootManifest> {
        if core.name.as_deref().is_none_or(str::is_empty) {
            return Err(Error::InvalidCoreManifest {
                reason: "missing \"name\"".to_string(),
            });
        }
        if core.require.is_none() {
            return Err(Error::InvalidCoreManifest {
                reason: "missing \"require\"".to_string(),
            });
        }

        let mut base = core.clone();
        base.minimum_stability.get_or_insert(Stability::Stable);
        base.prefer_stable.get_or_insert(true);
        base.repositories.get_or_insert_with(Vec::new);
        base.autoload = base.autoload.map_paths(|path| self.rebase_core_path(path));

        let mut merged = self.merger.merge(&base, extensions);
        merged
            .require
            .insert(INSTALLER_PACKAGE.to_string(), INSTALLER_CONSTRAINT.to_string());
        filter_platform_packages(&mut merged.require);
        filter_platform_packages(&mut merged.require_dev);

        let mut replace = merged.replace;
        replace.insert(CORE_PACKAGE_NAME.to_string(), "self.version".to_string());

        let mut autoload = merged.autoload;
        autoload.psr4.insert(
            COMMAND_NAMESPACE.to_string(),
            PathSpec::One(self.module_path.join("src/Composer").to_string()),
        );

        let mut scripts = base.scripts.clone();
        for (event, method) in FIXED_SCRIPTS {
            scripts.insert(
                event.to_string(),
                Value::String(format!("{}::{}", COMMAND_CLASS, method)),
            );
        }

        let generated_at = self.generated_at.unwrap_or_else(Utc::now);
        let sources = merged.sources.join(", ");
        tracing::info!(%sources, packages = merged.require.len(), "built root manifest");

        let mut root = RootManifest {
            name: ROOT_PACKAGE_NAME.to_string(),
            package_type: "project".to_string(),
            license: ROOT_LICENSE.to_string(),
            require: merged.require,
            require_dev: merged.require_dev,
            conflict: merged.conflict,
            provide: merged.provide,
            suggest: merged.suggest,
            minimum_stability: merged.minimum_stability,
            prefer_stable: merged.prefer_stable,
            repositories: Some(merged.repositories),
            replace,
            scripts,
            autoload,
            config: RootConfig::default(),
            extra: Provenance {
                generator: format!(
                    "Generated by composer_manager on {}",
                    generated_at.to_rfc3339_opts(SecondsFormat::Secs, false)
                ),
                sources,
                other: BTreeMap::new(),
            },
        };
        root.normalize();

        Ok(root)
    }

    /// Make a core-relative autoload path relative to the site root.
    fn rebase_core_path(&self, path: &str) -> String {
        if path.starts_with("lib/") {
            format!("{}/{}", self.core_directory, path)
        } else if let Some(rest) = path.strip_prefix("../") {
            rest.to_string()
        } else {
            path.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebase_core_path_rules() {
        let builder = RootPackageBuilder::new("modules/composer_manager");
        assert_eq!(builder.rebase_core_path("lib/Drupal.php"), "core/lib/Drupal.php");
        assert_eq!(builder.rebase_core_path("../vendor/autoload.php"), "vendor/autoload.php");
        assert_eq!(builder.rebase_core_path("includes/bootstrap.inc"), "includes/bootstrap.inc");
    }

    #[test]
    fn normalize_drops_empty_repositories() {
        let core = ComponentManifest {
            name: Some("drupal/core".into()),
            require: Some(ConstraintMap::new()),
            ..Default::default()
        };
        let mut root = RootPackageBuilder::new("modules/composer_manager")
            .build(&core, &[])
            .unwrap();
        assert!(root.repositories.is_none());

        root.repositories = Some(Vec::new());
        root.normalize();
        assert!(root.repositories.is_none());
    }

    #[test]
    fn sources_split_provenance() {
        let core = ComponentManifest {
            name: Some("drupal/core".into()),
            require: Some(ConstraintMap::new()),
            ..Default::default()
        };
        let root = RootPackageBuilder::new("modules/composer_manager")
            .build(&core, &[])
            .unwrap();
        assert_eq!(root.sources(), vec!["drupal/core"]);
    }
}
