//! Cross-referencing the root manifest with installed packages
//!
//! The report answers, per package: which constraint is requested, which
//! version is installed, and who asked for it. A required package without a
//! version is missing; an installed package without a requester is orphaned.
//! Either case means the resolver has to run again.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::builder::RootManifest;
use crate::installed::InstalledSnapshot;
use crate::manifest::{ComponentManifest, ComponentPackage, ConstraintMap};

/// Reconciled view of a single package.
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledPackage {
    /// Requested constraint; empty when nothing requests the package.
    pub constraint: String,
    pub description: String,
    pub homepage: String,
    pub require: ConstraintMap,
    /// Requesters without duplicates, in discovery order.
    pub required_by: Vec<String>,
    /// Installed version; empty when the package is not installed.
    pub version: String,
}

impl ReconciledPackage {
    fn requested(constraint: &str) -> Self {
        Self {
            constraint: constraint.to_string(),
            ..Default::default()
        }
    }

    /// Installed but no longer requested by anyone.
    pub fn is_orphaned(&self) -> bool {
        self.required_by.is_empty()
    }

    /// Requested but not installed.
    pub fn is_missing(&self) -> bool {
        self.version.is_empty()
    }

    pub fn needs_attention(&self) -> bool {
        self.is_missing() || self.is_orphaned()
    }

    fn add_requester(&mut self, requester: &str) {
        if !self.required_by.iter().any(|r| r == requester) {
            self.required_by.push(requester.to_string());
        }
    }
}

/// Per-package reconciliation result, sorted by package name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReconciliationReport {
    packages: BTreeMap<String, ReconciledPackage>,
}

impl ReconciliationReport {
    pub fn get(&self, name: &str) -> Option<&ReconciledPackage> {
        self.packages.get(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReconciledPackage)> {
        self.packages.iter().map(|(name, package)| (name.as_str(), package))
    }

    /// Whether the resolver must run to bring the installation in line.
    pub fn needs_update(&self) -> bool {
        self.packages.values().any(ReconciledPackage::needs_attention)
    }

    /// Names of requested packages that are not installed.
    pub fn missing(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, package)| package.is_missing())
            .map(|(name, _)| name)
            .collect()
    }

    /// Names of installed packages nothing requests.
    pub fn orphaned(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, package)| package.is_orphaned())
            .map(|(name, _)| name)
            .collect()
    }
}

impl<'a> IntoIterator for &'a ReconciliationReport {
    type Item = (&'a String, &'a ReconciledPackage);
    type IntoIter = std::collections::btree_map::Iter<'a, String, ReconciledPackage>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.iter()
    }
}

/// Builds [`ReconciliationReport`]s.
///
/// Holds the manifests that decide who requires a package: core first, then
/// the components in discovery order.
#[derive(Debug, Clone, Copy)]
pub struct PackageReconciler<'a> {
    base: &'a ComponentManifest,
    components: &'a [ComponentPackage],
}

impl<'a> PackageReconciler<'a> {
    pub fn new(base: &'a ComponentManifest, components: &'a [ComponentPackage]) -> Self {
        Self { base, components }
    }

    pub fn reconcile(&self, root: &RootManifest, installed: &InstalledSnapshot) -> ReconciliationReport {
        let mut packages: BTreeMap<String, ReconciledPackage> = root
            .require
            .iter()
            .map(|(name, constraint)| (name.clone(), ReconciledPackage::requested(constraint)))
            .collect();

        for package in installed.packages() {
            let entry = packages.entry(package.name.clone()).or_insert_with(|| {
                tracing::debug!(package = %package.name, "installed package is no longer required");
                ReconciledPackage::default()
            });
            entry.description = package.description.clone().unwrap_or_default();
            entry.homepage = package.homepage.clone().unwrap_or_default();
            entry.require = package.require.clone();
            entry.version = package.display_version();
        }

        for (name, entry) in packages.iter_mut() {
            if let Some(requester) = self.direct_requester(name) {
                entry.add_requester(requester);
            }
        }

        let edges: Vec<(String, String)> = packages
            .iter()
            .flat_map(|(name, entry)| {
                entry
                    .require
                    .keys()
                    .map(move |dependency| (dependency.clone(), name.clone()))
            })
            .collect();
        for (dependency, dependent) in edges {
            if let Some(entry) = packages.get_mut(&dependency) {
                entry.add_requester(&dependent);
            }
        }

        ReconciliationReport { packages }
    }

    /// Core if it requires `package`, else the first named component that does.
    ///
    /// When several components require the same package only the first is
    /// reported.
    fn direct_requester(&self, package: &str) -> Option<&'a str> {
        if self.base.requires(package) {
            return self.base.name.as_deref();
        }
        self.components
            .iter()
            .filter(|component| component.manifest.requires(package))
            .find_map(ComponentPackage::package_name)
    }
}
