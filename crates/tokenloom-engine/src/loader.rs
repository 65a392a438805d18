//! Token file discovery and loading.
//!
//! # Layout
//!
//! ```text
//! tokens/
//!   color.tokens.json        base
//!   components/button.json   base
//!   themes/
//!     dark.json              theme "dark"
//!     high-contrast.json     theme "high-contrast"
//! ```
//!
//! Every root is walked recursively in sorted order. Directories named
//! `themes` are skipped during the base load; themes are looked up at
//! `<root>/themes/` and `<root>/tokens/themes/`.
//!
//! Files are deep-merged in walk order, so for any given layout the later
//! file (by sorted path) wins a conflict. Once merging is done the
//! [`scale`](crate::scale) expander runs on the result.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::dictionary::{Dictionary, Node};
use crate::error::TokenError;
use crate::scale;

/// Directory name holding theme files.
pub const THEMES_DIR: &str = "themes";

/// Suffixes recognised when none are configured.
pub const DEFAULT_SUFFIXES: &[&str] = &[".tokens.json", ".json"];

/// Reads token files from disk.
#[derive(Debug, Clone)]
pub struct Loader {
    /// Longest first, so `.tokens.json` is stripped before `.json`.
    suffixes: Vec<String>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIXES.iter().map(|s| s.to_string()))
    }
}

impl Loader {
    pub fn new(suffixes: impl IntoIterator<Item = String>) -> Self {
        let mut suffixes: Vec<String> = suffixes.into_iter().filter(|s| !s.is_empty()).collect();
        suffixes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        suffixes.dedup();
        Self { suffixes }
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// The matching suffix, when `path` is a token file.
    fn matching_suffix(&self, path: &Path) -> Option<&str> {
        let name = path.file_name()?.to_str()?;
        self.suffixes
            .iter()
            .find(|suffix| name.len() > suffix.len() && name.ends_with(suffix.as_str()))
            .map(String::as_str)
    }

    pub fn is_token_file(&self, path: &Path) -> bool {
        self.matching_suffix(path).is_some()
    }

    /// File name minus the token suffix.
    pub fn theme_name(&self, path: &Path) -> Option<String> {
        let suffix = self.matching_suffix(path)?;
        let name = path.file_name()?.to_str()?;
        Some(name[..name.len() - suffix.len()].to_string())
    }

    /// Loads and merges every base token file under `roots`.
    pub fn load_base(
        &self,
        roots: &[PathBuf],
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Dictionary, TokenError> {
        let mut base = Dictionary::new();
        for root in roots {
            if !root.is_dir() {
                return Err(TokenError::DirectoryNotFound { path: root.clone() });
            }
            for file in self.token_files(root, true)? {
                let dict = self.load_file(&file)?;
                base.merge(&dict, sink);
            }
        }
        report_scale_errors(&mut base, sink);
        tracing::debug!(tokens = base.tokens().len(), "loaded base dictionary");
        Ok(base)
    }

    /// Loads every theme found under `roots`, keyed by theme name.
    ///
    /// A theme defined in several files (or several roots) is merged in walk order.
    pub fn load_themes(
        &self,
        roots: &[PathBuf],
        sink: &mut dyn DiagnosticSink,
    ) -> Result<BTreeMap<String, Dictionary>, TokenError> {
        let mut themes: BTreeMap<String, Dictionary> = BTreeMap::new();
        for root in roots {
            for dir in theme_dirs(root) {
                for file in self.token_files(&dir, false)? {
                    let Some(name) = self.theme_name(&file) else {
                        continue;
                    };
                    let mut dict = self.load_file(&file)?;
                    unwrap_theme_root(&mut dict, &name, &file);
                    themes.entry(name).or_default().merge(&dict, sink);
                }
            }
        }
        for (name, theme) in themes.iter_mut() {
            report_scale_errors(theme, sink);
            tracing::debug!(theme = %name, tokens = theme.tokens().len(), "loaded theme");
        }
        Ok(themes)
    }

    /// Reads and decodes a single token file.
    pub fn load_file(&self, path: &Path) -> Result<Dictionary, TokenError> {
        let content = std::fs::read_to_string(path).map_err(|source| TokenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let json: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| TokenError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
                line: e.line(),
                column: e.column(),
            })?;
        tracing::debug!(file = %path.display(), "loaded token file");
        Dictionary::from_json(&json, Some(path)).ok_or_else(|| TokenError::Structural {
            path: path.to_path_buf(),
            message: format!("top-level value must be an object, found {}", json_kind(&json)),
        })
    }

    /// Token files under `root`, sorted by path.
    pub fn token_files(&self, root: &Path, skip_themes: bool) -> Result<Vec<PathBuf>, TokenError> {
        let mut files = Vec::new();
        self.walk(root, skip_themes, &mut files)?;
        Ok(files)
    }

    fn walk(&self, dir: &Path, skip_themes: bool, files: &mut Vec<PathBuf>) -> Result<(), TokenError> {
        let io_error = |source| TokenError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            entries.push(entry.map_err(io_error)?.path());
        }
        entries.sort();

        for path in entries {
            if path.is_dir() {
                if skip_themes && path.file_name().is_some_and(|n| n == THEMES_DIR) {
                    continue;
                }
                self.walk(&path, skip_themes, files)?;
            } else if path.is_file() && self.is_token_file(&path) {
                files.push(path);
            }
        }
        Ok(())
    }
}

/// `<root>/themes` and `<root>/tokens/themes`, whichever exist.
pub fn theme_dirs(root: &Path) -> Vec<PathBuf> {
    [root.join(THEMES_DIR), root.join("tokens").join(THEMES_DIR)]
        .into_iter()
        .filter(|dir| dir.is_dir())
        .collect()
}

/// `{"dark": {...}}` in `dark.json` is unwrapped to `{...}`.
fn unwrap_theme_root(dict: &mut Dictionary, name: &str, file: &Path) {
    let root = dict.root();
    if !root.meta.is_empty() || root.children.len() != 1 {
        return;
    }
    let Some(Node::Group(inner)) = root.children.get(name) else {
        return;
    };
    *dict = Dictionary::from_group(inner.clone(), Some(file));
}

fn report_scale_errors(dict: &mut Dictionary, sink: &mut dyn DiagnosticSink) {
    for err in scale::expand(dict) {
        let file = dict
            .sources()
            .iter()
            .find(|(path, _)| path.starts_with(&format!("{}.", err.path)))
            .map(|(_, file)| file.clone());
        sink.emit(
            Diagnostic::error(DiagnosticKind::Scale, err.to_string())
                .at(&err.path)
                .in_file(file.as_deref()),
        );
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
