use std::process::ExitCode;

use anyhow::Result;
use tokenloom_engine::ValidationOptions;

use super::{load_or_report, Workspace};
use crate::cli::{Cli, ValidateArgs};
use crate::report;

pub fn run(cli: &Cli, args: &ValidateArgs) -> Result<ExitCode> {
    let workspace = Workspace::open(&args.dirs, cli.config.as_deref())?;
    let Some(mut project) = load_or_report(&workspace)? else {
        return Ok(ExitCode::FAILURE);
    };
    if args.strict_layers {
        project.set_options(ValidationOptions {
            strict_layers: true,
            ..project.options()
        });
    }

    let report = project.validate();
    report::print_all(&report.diagnostics);

    let errors = report.error_count();
    let warnings = report.warnings().count();
    if errors > 0 {
        eprintln!("{}", report::summary(errors, warnings));
        return Ok(ExitCode::FAILURE);
    }
    println!(
        "{} tokens, {} themes: ok ({})",
        project.base().tokens().len(),
        project.themes().len(),
        report::summary(errors, warnings)
    );
    Ok(ExitCode::SUCCESS)
}
