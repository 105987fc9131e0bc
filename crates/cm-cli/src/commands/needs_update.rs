//! Needs-update command implementation

use std::path::Path;

use colored::Colorize;

use super::open_site;
use crate::error::Result;

/// Report whether the resolver has to run. Returns `true` when it does.
pub fn run_needs_update(root: &Path) -> Result<bool> {
    let mut manager = open_site(root)?;
    let needed = manager.needs_update()?;
    if needed {
        println!("{}", "Update needed".yellow().bold());
    } else {
        println!("{}", "Up to date".green());
    }
    Ok(needed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_test_utils::{TestSite, fixtures};
    use serde_json::json;

    #[test]
    fn test_standard_site_needs_update() {
        let site = fixtures::standard_site();
        assert!(run_needs_update(site.root()).unwrap());
    }

    #[test]
    fn test_fully_installed_site_is_up_to_date() {
        let site = TestSite::new();
        site.core_manifest(&json!({
            "name": "drupal/core",
            "require": {"composer/installers": "^1.0", "symfony/yaml": "~2.7"}
        }));
        site.installed(&json!([
            {"name": "symfony/yaml", "version": "v2.7.0"},
            {"name": "composer/installers", "version": "v1.0.21"}
        ]));

        assert!(!run_needs_update(site.root()).unwrap());
    }
}
