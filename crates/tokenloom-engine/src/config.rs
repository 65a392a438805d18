//! Project configuration.
//!
//! An optional `tokenloom.yaml` next to the token sources:
//!
//! ```yaml
//! sources: [tokens]
//! suffixes: [.tokens.json, .json]
//! default_theme: light
//! strict_layers: false
//! allow_theme_additions: false
//! output:
//!   dir: dist
//!   css_file: tokens.css
//!   catalog_file: catalog.json
//! catalog:
//!   rich: true
//!   category: color
//! ```
//!
//! Every field is optional. A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::loader::{Loader, DEFAULT_SUFFIXES};
use crate::validate::ValidationOptions;

/// File name looked up by [`Config::discover`].
pub const CONFIG_FILE: &str = "tokenloom.yaml";

/// Source directory used when neither the command line nor the config name one.
pub const DEFAULT_SOURCE_DIR: &str = "tokens";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Token roots, relative to the config file's directory.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<PathBuf>,
    pub suffixes: Vec<String>,
    pub default_theme: String,
    pub strict_layers: bool,
    pub allow_theme_additions: bool,
    pub output: OutputConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    pub css_file: String,
    pub catalog_file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub rich: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            default_theme: "light".to_string(),
            strict_layers: false,
            allow_theme_additions: false,
            output: OutputConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            css_file: "tokens.css".to_string(),
            catalog_file: "catalog.json".to_string(),
        }
    }
}

impl Config {
    /// Reads and parses `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `<dir>/tokenloom.yaml`, or defaults when there is none.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Source roots resolved against `base_dir`.
    ///
    /// With no configured sources this is `<base_dir>/tokens` when that
    /// directory exists, otherwise `base_dir` itself.
    pub fn source_roots(&self, base_dir: &Path) -> Vec<PathBuf> {
        if !self.sources.is_empty() {
            return self.sources.iter().map(|s| base_dir.join(s)).collect();
        }
        let tokens = base_dir.join(DEFAULT_SOURCE_DIR);
        if tokens.is_dir() {
            vec![tokens]
        } else {
            vec![base_dir.to_path_buf()]
        }
    }

    pub fn loader(&self) -> Loader {
        Loader::new(self.suffixes.iter().cloned())
    }

    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            strict_layers: self.strict_layers,
            allow_theme_additions: self.allow_theme_additions,
        }
    }

    /// Renders the config as YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
