//! Command-line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Build CSS cascade layers and JSON catalogs from design token files.
#[derive(Debug, Parser)]
#[command(name = "tokenloom")]
#[command(about = "Build CSS cascade layers and JSON catalogs from design token files")]
pub struct Cli {
    /// Show debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: tokenloom.yaml in the first source directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scaffold a starter token project
    Init(InitArgs),

    /// Check token files and report every problem
    Validate(ValidateArgs),

    /// Validate, then write the stylesheet or catalog
    Build(BuildArgs),

    /// Find tokens by path, value or description
    Search(SearchArgs),

    /// Print the version
    Version,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to scaffold into
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Token source directories
    pub dirs: Vec<PathBuf>,

    /// Enforce $layer alias rules
    #[arg(long)]
    pub strict_layers: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// CSS cascade layers for a utility-class framework
    Tailwind,
    /// JSON catalog of tokens, components and themes
    Catalog,
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Token source directories
    pub dirs: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Tailwind)]
    pub format: Format,

    /// Directory to write into (stdout when omitted)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Include descriptions, usage notes and sources in the catalog
    #[arg(long)]
    pub rich: bool,

    /// Restrict the catalog to one top-level group
    #[arg(long)]
    pub category: Option<String>,

    /// Enforce $layer alias rules
    #[arg(long)]
    pub strict_layers: bool,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Substring, or /regex/
    pub query: Option<String>,

    /// Only tokens of this $type
    #[arg(long = "type", value_name = "TYPE")]
    pub token_type: Option<String>,

    /// Only tokens under this top-level group
    #[arg(long)]
    pub category: Option<String>,

    /// Token source directory
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_defaults() {
        let cli = Cli::try_parse_from(["tokenloom", "build"]).unwrap();
        match cli.command {
            Command::Build(args) => {
                assert_eq!(args.format, Format::Tailwind);
                assert!(args.dirs.is_empty());
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tokenloom",
            "search",
            "blue",
            "--type",
            "color",
            "--verbose",
            "--config",
            "custom.yaml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.query.as_deref(), Some("blue"));
                assert_eq!(args.token_type.as_deref(), Some("color"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
