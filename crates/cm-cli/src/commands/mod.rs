//! Command implementations for cm-cli

pub mod needs_update;
pub mod rebuild;
pub mod resolver;
pub mod status;

use std::path::Path;

use cm_core::PackageManager;

use crate::error::Result;

pub use needs_update::run_needs_update;
pub use rebuild::run_rebuild;
pub use resolver::{run_install, run_update};
pub use status::run_status;

/// Open the site at `root` with its `composer_manager.toml` settings.
fn open_site(root: &Path) -> Result<PackageManager> {
    Ok(PackageManager::open(root)?)
}
