//! Status command implementation

use std::path::Path;

use colored::Colorize;
use cm_core::{ReconciledPackage, ReconciliationReport};
use serde_json::json;

use super::open_site;
use crate::error::Result;

/// Run the status command
pub fn run_status(root: &Path, json: bool) -> Result<()> {
    let mut manager = open_site(root)?;
    let report = manager.required_packages()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status_document(report))?);
        return Ok(());
    }

    println!("{}", "Composer Packages".bold());
    println!();

    if report.is_empty() {
        println!("  {}", "No packages required or installed".dimmed());
        return Ok(());
    }

    let width = report.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, package) in report.iter() {
        println!(
            "  {} {}  {:<12} {:<12} {}",
            marker(package),
            format!("{:<width$}", name).cyan(),
            display_or_dash(&package.constraint),
            display_or_dash(&package.version),
            package.required_by.join(", ").dimmed(),
        );
    }
    println!();

    let missing = report.missing();
    let orphaned = report.orphaned();
    if !missing.is_empty() {
        println!("{}: {}", "Missing".yellow().bold(), missing.join(", "));
    }
    if !orphaned.is_empty() {
        println!("{}: {}", "Orphaned".yellow().bold(), orphaned.join(", "));
    }
    if report.needs_update() {
        println!("Run {} to bring the installation in line.", "composer-manager update".cyan());
    } else {
        println!("{}", "All packages installed".green());
    }

    Ok(())
}

/// JSON document printed by `status --json`.
fn status_document(report: &ReconciliationReport) -> serde_json::Value {
    json!({
        "packages": report,
        "needs_update": report.needs_update(),
    })
}

fn marker(package: &ReconciledPackage) -> colored::ColoredString {
    if package.is_missing() {
        "!".red()
    } else if package.is_orphaned() {
        "?".yellow()
    } else {
        "+".green()
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
