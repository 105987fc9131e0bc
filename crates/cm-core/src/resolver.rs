//! Running the external dependency resolver
//!
//! Resolving constraints into an install plan is Composer's job. This module
//! only invokes it against the generated root manifest and reports the
//! outcome.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// What the resolver is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolverAction {
    /// Install exactly what the lock file records.
    Install,
    /// Re-resolve every constraint and rewrite the lock file.
    Update,
}

impl ResolverAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for ResolverAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Captured output of a successful resolver run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs the dependency resolver for a site.
pub trait DependencyResolver {
    /// Run `action` with `working_dir` as the project root.
    fn run(&self, action: ResolverAction, working_dir: &Path) -> Result<ResolverOutput>;
}

/// Invokes the `composer` executable.
#[derive(Debug, Clone)]
pub struct ComposerCommand {
    program: PathBuf,
    extra_args: Vec<String>,
}

impl ComposerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    /// Append arguments to every invocation.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for ComposerCommand {
    fn default() -> Self {
        Self::new("composer")
    }
}

impl DependencyResolver for ComposerCommand {
    fn run(&self, action: ResolverAction, working_dir: &Path) -> Result<ResolverOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(working_dir)
            .arg(action.as_str())
            .arg("--no-interaction")
            .args(&self.extra_args);

        tracing::info!(program = %self.program.display(), %action, dir = %working_dir.display(), "running resolver");
        let output = cmd.output().map_err(|source| Error::ResolverSpawn {
            program: self.program.display().to_string(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if output.status.success() {
            Ok(ResolverOutput { stdout, stderr })
        } else {
            let code = output.status.code().unwrap_or(-1);
            tracing::warn!(%action, code, "resolver failed");
            Err(Error::ResolverFailed {
                action: action.to_string(),
                code,
                stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_spawn_error() {
        let composer = ComposerCommand::new("/nonexistent/composer-binary");
        let dir = std::env::temp_dir();
        let err = composer.run(ResolverAction::Install, &dir).unwrap_err();
        assert!(matches!(err, Error::ResolverSpawn { .. }));
    }

    #[test]
    fn action_names() {
        assert_eq!(ResolverAction::Install.to_string(), "install");
        assert_eq!(ResolverAction::Update.to_string(), "update");
    }
}
