//! `tokenloom` - build CSS and catalogs from design token files.
//!
//! Run `tokenloom --help` for the command list.

use std::process::ExitCode;

use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod report;

use cli::Cli;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tokenloom=debug,tokenloom_engine=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("tokenloom=warn,tokenloom_engine=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match commands::run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", style("error:").red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
