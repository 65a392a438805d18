//! Subcommand handlers.
//!
//! Each handler returns the process exit code; unexpected failures bubble up
//! as `anyhow` errors and are printed by `main`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use tokenloom_engine::{Config, Project, TokenError};

use crate::cli::{Cli, Command};
use crate::report;

mod build;
mod init;
mod search;
mod validate;

pub fn run(cli: &Cli) -> Result<ExitCode> {
    match &cli.command {
        Command::Init(args) => init::run(args),
        Command::Validate(args) => validate::run(cli, args),
        Command::Build(args) => build::run(cli, args),
        Command::Search(args) => search::run(cli, args),
        Command::Version => {
            println!("tokenloom {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Configuration plus the source roots a command works on.
#[derive(Debug)]
pub(crate) struct Workspace {
    pub config: Config,
    pub roots: Vec<PathBuf>,
}

impl Workspace {
    /// Roots from the command line win; otherwise the config's `sources`,
    /// relative to the directory holding the config.
    pub fn open(dirs: &[PathBuf], config_file: Option<&Path>) -> Result<Self> {
        let (config, base_dir) = match config_file {
            Some(path) => {
                let config = Config::load(path)?;
                let base = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                (config, base)
            }
            None => {
                let base = dirs.first().cloned().unwrap_or_else(|| PathBuf::from("."));
                (Config::discover(&base)?, base)
            }
        };

        let roots = if dirs.is_empty() {
            config.source_roots(&base_dir)
        } else {
            dirs.to_vec()
        };
        tracing::debug!(roots = ?roots, "opened workspace");
        Ok(Self { config, roots })
    }

    pub fn load(&self) -> Result<Project, TokenError> {
        Project::load(&self.roots, &self.config)
    }
}

/// Loads the project, printing load failures as diagnostics.
pub(crate) fn load_or_report(workspace: &Workspace) -> Result<Option<Project>> {
    match workspace.load() {
        Ok(project) => Ok(Some(project)),
        Err(err @ (TokenError::Io { .. }
        | TokenError::DirectoryNotFound { .. }
        | TokenError::Parse { .. }
        | TokenError::Structural { .. })) => {
            report::print_all(&err.to_diagnostics());
            Ok(None)
        }
        Err(err) => Err(err).context("failed to load tokens"),
    }
}
