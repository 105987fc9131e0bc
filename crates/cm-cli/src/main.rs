//! composer-manager CLI
//!
//! Rebuilds a site's root composer.json from its extensions and reports on
//! installed packages.

mod cli;
mod commands;
mod error;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::{CliError, Result};

/// Exit status for failures, distinct from the "update needed" status.
const ERROR_EXIT: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{}: {}", "hint".yellow(), hint);
            }
            ExitCode::from(ERROR_EXIT)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("{}", "warning: tracing subscriber already installed".yellow());
        }
        tracing::debug!("Verbose mode enabled");
    }

    let root = site_root(cli.root)?;
    execute_command(cli.command, &root)
}

fn execute_command(cmd: Commands, root: &Path) -> Result<ExitCode> {
    match cmd {
        Commands::Status { json } => commands::run_status(root, json).map(|_| ExitCode::SUCCESS),
        Commands::Rebuild => commands::run_rebuild(root).map(|_| ExitCode::SUCCESS),
        Commands::Install => commands::run_install(root).map(|_| ExitCode::SUCCESS),
        Commands::Update => commands::run_update(root).map(|_| ExitCode::SUCCESS),
        Commands::NeedsUpdate => commands::run_needs_update(root).map(|needed| {
            if needed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }),
    }
}

fn site_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let root = match explicit {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    if !root.is_dir() {
        return Err(CliError::user(format!("Site root not found: {}", root.display())));
    }
    Ok(root)
}
