//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// composer-manager - Manage the Composer dependencies of a Drupal site
#[derive(Parser, Debug)]
#[command(name = "composer-manager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Site root (defaults to the current directory)
    #[arg(long, global = true, env = "COMPOSER_MANAGER_ROOT")]
    pub root: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show required and installed packages
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Regenerate the root composer.json from core and extension manifests
    Rebuild,

    /// Run `composer install` in the site root
    Install,

    /// Regenerate the root composer.json, then run `composer update`
    Update,

    /// Exit with status 1 when packages are missing or orphaned
    NeedsUpdate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_json() {
        let cli = Cli::try_parse_from(["composer-manager", "status", "--json"]).unwrap();
        assert_eq!(cli.command, Commands::Status { json: true });
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["composer-manager", "rebuild", "--root", "/srv/www", "-v"]).unwrap();
        assert_eq!(cli.command, Commands::Rebuild);
        assert_eq!(cli.root, Some(PathBuf::from("/srv/www")));
        assert!(cli.verbose);
    }

    #[test]
    fn parse_needs_update() {
        let cli = Cli::try_parse_from(["composer-manager", "needs-update"]).unwrap();
        assert_eq!(cli.command, Commands::NeedsUpdate);
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["composer-manager"]).is_err());
    }
}
