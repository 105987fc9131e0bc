//! Install and update commands

use std::path::Path;

use colored::Colorize;
use cm_core::ResolverOutput;

use super::open_site;
use crate::error::Result;

/// Run `composer install` in the site root
pub fn run_install(root: &Path) -> Result<()> {
    let mut manager = open_site(root)?;
    println!("{} {}", "Running".bold(), "composer install".cyan());
    let output = manager.install()?;
    print_output(&output);
    println!("{}", "Dependencies installed".green());
    Ok(())
}

/// Rebuild the root manifest, then run `composer update`
pub fn run_update(root: &Path) -> Result<()> {
    let mut manager = open_site(root)?;
    println!("{} {}", "Running".bold(), "composer update".cyan());
    let output = manager.update()?;
    print_output(&output);
    println!("{}", "Dependencies updated".green());
    Ok(())
}

fn print_output(output: &ResolverOutput) {
    for line in output.stdout.lines() {
        println!("  {}", line);
    }
    for line in output.stderr.lines() {
        eprintln!("  {}", line.dimmed());
    }
}
