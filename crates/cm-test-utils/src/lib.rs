//! Shared test utilities for the composer-manager workspace.
//!
//! This crate is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`site`]: [`TestSite`](site::TestSite) builder for a site directory tree
//! - [`fixtures`]: canned manifests and a fully populated standard site

pub mod fixtures;
pub mod site;

pub use site::TestSite;
