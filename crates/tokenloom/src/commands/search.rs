use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use console::style;
use tokenloom_engine::{Query, SearchFilters, TokenError, TracingSink};

use super::{load_or_report, Workspace};
use crate::cli::{Cli, SearchArgs};
use crate::report;

pub fn run(cli: &Cli, args: &SearchArgs) -> Result<ExitCode> {
    let query = args
        .query
        .as_deref()
        .map(Query::parse)
        .transpose()
        .context("invalid search pattern")?;

    let dirs: Vec<PathBuf> = args.dir.iter().cloned().collect();
    let workspace = Workspace::open(&dirs, cli.config.as_deref())?;
    let Some(project) = load_or_report(&workspace)? else {
        return Ok(ExitCode::FAILURE);
    };

    let compiled = match project.compile(&mut TracingSink) {
        Ok(compiled) => compiled,
        Err(TokenError::Validation { diagnostics, .. }) => {
            report::print_all(diagnostics.iter().filter(|d| d.is_error()));
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err).context("search failed"),
    };

    let filters = SearchFilters {
        token_type: args.token_type.clone(),
        category: args.category.clone(),
    };
    let hits = compiled.search(query.as_ref(), &filters);
    if hits.is_empty() {
        eprintln!("no matching tokens");
        return Ok(ExitCode::SUCCESS);
    }

    let width = hits.iter().map(|hit| hit.path.len()).max().unwrap_or(0);
    for hit in &hits {
        let mut line = format!("{:width$}  {}", hit.path, hit.css_value, width = width);
        if let Some(token_type) = &hit.token_type {
            line.push_str(&format!("  {}", style(format!("({})", token_type)).dim()));
        }
        if let Some(description) = &hit.description {
            line.push_str(&format!("  {}", style(description).italic()));
        }
        println!("{}", line);
    }
    Ok(ExitCode::SUCCESS)
}
