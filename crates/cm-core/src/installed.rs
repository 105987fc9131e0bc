//! The resolver's record of installed packages
//!
//! Composer writes `vendor/composer/installed.json` after every install. Older
//! releases emit a bare array of packages; Composer 2 wraps it in an object
//! with a `packages` key. A `composer.lock` file carries the same records split
//! into `packages` and `packages-dev`. All three shapes load into an
//! [`InstalledSnapshot`].

use cm_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::manifest::{ConstraintMap, map_or_empty_list};

/// Version string of a package tracking a moving branch head.
pub const FLOATING_VERSION: &str = "dev-master";

/// Where an installed package was fetched from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSource {
    #[serde(rename = "type", default)]
    pub source_type: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub reference: String,
}

/// One package as recorded by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub require: ConstraintMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PackageSource>,
}

impl InstalledPackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            homepage: None,
            require: ConstraintMap::new(),
            source: None,
        }
    }

    /// Version as shown to operators.
    ///
    /// A floating `dev-master` install is pinned to its commit so that two
    /// installs of the same branch can be told apart.
    pub fn display_version(&self) -> String {
        match &self.source {
            Some(source) if self.version == FLOATING_VERSION && !source.reference.is_empty() => {
                format!("{}#{}", self.version, source.reference)
            }
            _ => self.version.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    List(Vec<InstalledPackage>),
    Lock {
        packages: Vec<InstalledPackage>,
        #[serde(default, rename = "packages-dev")]
        packages_dev: Vec<InstalledPackage>,
    },
}

/// Every package the resolver reports as installed, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledSnapshot {
    packages: Vec<InstalledPackage>,
}

impl InstalledSnapshot {
    pub fn new(packages: Vec<InstalledPackage>) -> Self {
        Self { packages }
    }

    pub fn packages(&self) -> &[InstalledPackage] {
        &self.packages
    }

    pub fn get(&self, name: &str) -> Option<&InstalledPackage> {
        self.packages.iter().find(|package| package.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Parse any of the supported snapshot shapes.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        let packages = match serde_json::from_str(content)? {
            SnapshotDocument::List(packages) => packages,
            SnapshotDocument::Lock {
                mut packages,
                packages_dev,
            } => {
                packages.extend(packages_dev);
                packages
            }
        };
        Ok(Self { packages })
    }

    /// Load the snapshot at `path`.
    ///
    /// # Errors
    ///
    /// A missing file is [`Error::SnapshotRead`], never an empty snapshot.
    /// Content that is not a package list is [`Error::SnapshotParse`].
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let content = cm_fs::io::read_text(path).map_err(|source| Error::SnapshotRead {
            path: path.to_native(),
            source,
        })?;
        let snapshot = Self::from_json(&content).map_err(|e| Error::SnapshotParse {
            path: path.to_native(),
            message: e.to_string(),
        })?;
        tracing::debug!(%path, packages = snapshot.packages.len(), "loaded installed packages");
        Ok(snapshot)
    }
}
