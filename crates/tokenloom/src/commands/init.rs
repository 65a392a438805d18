use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tokenloom_engine::{Config, CONFIG_FILE};

use crate::cli::InitArgs;

const COLOR_TOKENS: &str = r##"{
  "color": {
    "$type": "color",
    "blue": { "$value": "#3b82f6", "$description": "Brand blue" },
    "primary": { "$value": "{color.blue}" },
    "bg": { "$value": "#ffffff" },
    "fg": { "$value": "#111827" }
  }
}
"##;

const SPACING_TOKENS: &str = r##"{
  "spacing": {
    "$type": "dimension",
    "$scale": { "base": "0.25rem", "multipliers": [1, 2, 4, 8] }
  }
}
"##;

const BUTTON_TOKENS: &str = r##"{
  "button": {
    "$class": "btn",
    "$description": "Primary action",
    "padding": ["{spacing.2}", "{spacing.4}"],
    "background": "{color.primary}",
    "color": "{color.bg}",
    "&:hover": { "opacity": 0.9 },
    "sizes": {
      "sm": { "fontSize": "0.875rem" }
    }
  }
}
"##;

const DARK_THEME: &str = r##"{
  "dark": {
    "$description": "Dark mode",
    "color": {
      "bg": { "$value": "#111827" },
      "fg": { "$value": "#f9fafb" }
    }
  }
}
"##;

pub fn run(args: &InitArgs) -> Result<ExitCode> {
    let config = Config {
        sources: vec![PathBuf::from("tokens")],
        ..Config::default()
    };
    let config_yaml = config.to_yaml().context("failed to render config")?;

    let files: [(PathBuf, &str); 5] = [
        (args.dir.join(CONFIG_FILE), config_yaml.as_str()),
        (args.dir.join("tokens/color.tokens.json"), COLOR_TOKENS),
        (args.dir.join("tokens/spacing.tokens.json"), SPACING_TOKENS),
        (args.dir.join("tokens/components/button.tokens.json"), BUTTON_TOKENS),
        (args.dir.join("tokens/themes/dark.json"), DARK_THEME),
    ];

    let existing: Vec<String> = files
        .iter()
        .filter(|(path, _)| path.exists())
        .map(|(path, _)| path.display().to_string())
        .collect();
    if !existing.is_empty() {
        bail!("refusing to overwrite existing files: {}", existing.join(", "));
    }

    for (path, content) in &files {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
        println!("created {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
