//! Manifest merging and dependency reconciliation for composer-manager
//!
//! Every extension of a site may ship a `composer.json`. This crate merges
//! them with core's manifest into one root manifest for Composer, and
//! cross-references that manifest with what Composer installed:
//!
//! - **Merging**: first-wins combination of requirements, stability and
//!   autoload sections ([`ManifestMerger`])
//! - **Root manifest**: fixed identity, provenance and command wiring on top
//!   of the merge ([`RootPackageBuilder`])
//! - **Reconciliation**: who requires what, what is missing or orphaned
//!   ([`PackageReconciler`])
//! - **Orchestration**: discovery, session caching, locked rebuilds and
//!   resolver runs ([`PackageManager`])
//!
//! # Architecture
//!
//! ```text
//!                    cm-cli
//!                      |
//!                   cm-core
//!     discovery -> merge -> builder -> reconcile
//!                      |
//!                    cm-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use cm_core::PackageManager;
//!
//! let mut manager = PackageManager::open("/var/www/drupal")?;
//! let report = manager.rebuild_root_package()?;
//! if manager.needs_update()? {
//!     manager.update()?;
//! }
//! ```

pub mod builder;
pub mod config;
pub mod discovery;
pub mod error;
pub mod hooks;
pub mod installed;
pub mod lock;
pub mod manager;
pub mod manifest;
pub mod merge;
pub mod reconcile;
pub mod resolver;

pub use builder::{RootConfig, RootManifest, RootPackageBuilder, Provenance};
pub use config::Settings;
pub use discovery::{Extension, ExtensionDiscovery, ExtensionKind, ExtensionSource};
pub use error::{Error, Result};
pub use hooks::{Hooks, InstallListener, ManifestAlter};
pub use installed::{InstalledPackage, InstalledSnapshot, PackageSource};
pub use lock::{LockGuard, NoopLock, WriteLock};
pub use manager::{PackageManager, RebuildReport};
pub use manifest::{Autoload, ComponentManifest, ComponentPackage, ConstraintMap, PathSpec, Stability};
pub use merge::{ManifestMerger, MergedRequirementSet};
pub use reconcile::{PackageReconciler, ReconciledPackage, ReconciliationReport};
pub use resolver::{ComposerCommand, DependencyResolver, ResolverAction, ResolverOutput};
