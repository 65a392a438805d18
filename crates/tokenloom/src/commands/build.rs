use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use tokenloom_engine::{CatalogOptions, TokenError, ValidationOptions};

use super::{load_or_report, Workspace};
use crate::cli::{BuildArgs, Cli, Format};
use crate::report::{self, ConsoleSink};

pub fn run(cli: &Cli, args: &BuildArgs) -> Result<ExitCode> {
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

    let mut sink = ConsoleSink::default();
    let compiled = match project.compile(&mut sink) {
        Ok(compiled) => compiled,
        Err(TokenError::Validation {
            errors,
            diagnostics,
        }) => {
            report::print_all(&diagnostics);
            let warnings = diagnostics.iter().filter(|d| !d.is_error()).count();
            eprintln!("{}", report::summary(errors, warnings));
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err).context("build failed"),
    };
    if sink.emitted > 0 {
        eprintln!("{}", report::summary(0, sink.emitted));
    }

    let config = &workspace.config;
    let (content, file_name) = match args.format {
        Format::Tailwind => (compiled.to_css(), &config.output.css_file),
        Format::Catalog => {
            let options = CatalogOptions {
                rich: args.rich || config.catalog.rich,
                category: args.category.clone().or_else(|| config.catalog.category.clone()),
            };
            let catalog = compiled.to_catalog(&options, Utc::now());
            let mut json = catalog.to_json_pretty().context("failed to serialise catalog")?;
            json.push('\n');
            (json, &config.output.catalog_file)
        }
    };

    let output_dir: Option<PathBuf> = args.output.clone().or_else(|| config.output.dir.clone());
    match output_dir {
        Some(dir) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            let path = dir.join(file_name);
            fs::write(&path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(ExitCode::SUCCESS)
}
