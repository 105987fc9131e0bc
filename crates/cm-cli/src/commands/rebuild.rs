//! Rebuild command implementation

use std::path::Path;

use colored::Colorize;

use super::open_site;
use crate::error::Result;

/// Regenerate the root composer.json
pub fn run_rebuild(root: &Path) -> Result<()> {
    let mut manager = open_site(root)?;
    let report = manager.rebuild_root_package()?;

    let state = if report.changed {
        "written".green()
    } else {
        "up to date".dimmed()
    };
    println!("{} {} ({})", "Root manifest".bold(), report.path.as_str().cyan(), state);
    println!("{}:   {} bytes", "Size".dimmed(), report.bytes);
    println!("{}:   {}", "Checksum".dimmed(), report.checksum);
    println!("{}:", "Sources".bold());
    for source in &report.sources {
        println!("  {} {}", "+".green(), source);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_test_utils::fixtures;

    #[test]
    fn test_rebuild_writes_root_manifest() {
        let site = fixtures::standard_site();

        run_rebuild(site.root()).unwrap();

        let written = site.read_json("composer.json");
        assert_eq!(written["name"], "drupal/drupal");
        assert!(written["extra"]["_sources"].as_str().unwrap().starts_with("drupal/core, "));
    }

    #[test]
    fn test_rebuild_without_core_manifest_fails() {
        let site = cm_test_utils::TestSite::new();
        assert!(run_rebuild(site.root()).is_err());
        site.assert_file_not_exists("composer.json");
    }
}
