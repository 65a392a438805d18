//! Fatal error types.
//!
//! IO and parse failures short-circuit loading. Everything the validator can
//! find is reported as [`Diagnostic`]s instead; when a build meets an error
//! diagnostic it aborts with [`TokenError::Validation`] carrying the full list.

use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostic::{Diagnostic, DiagnosticKind};

/// Errors that abort loading or building.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to parse {}: {message} (line {line}, column {column})", path.display())]
    Parse {
        path: PathBuf,
        message: String,
        line: usize,
        column: usize,
    },

    #[error("invalid token file {}: {message}", path.display())]
    Structural { path: PathBuf, message: String },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Theme(#[from] ThemeError),

    #[error(transparent)]
    Scale(#[from] ScaleError),

    #[error("validation failed with {errors} error(s)")]
    Validation {
        errors: usize,
        diagnostics: Vec<Diagnostic>,
    },
}

impl TokenError {
    /// Flattens the error into diagnostics for reporting.
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            TokenError::Validation { diagnostics, .. } => diagnostics.clone(),
            TokenError::Io { path, .. } | TokenError::DirectoryNotFound { path } => {
                vec![Diagnostic::error(DiagnosticKind::Io, self.to_string())
                    .in_file(Some(path.as_path()))]
            }
            TokenError::Parse { path, .. } => {
                vec![Diagnostic::error(DiagnosticKind::Parse, self.to_string())
                    .in_file(Some(path.as_path()))]
            }
            TokenError::Structural { path, .. } => {
                vec![Diagnostic::error(DiagnosticKind::Structural, self.to_string())
                    .in_file(Some(path.as_path()))]
            }
            TokenError::Resolve(err) => vec![err.to_diagnostic()],
            TokenError::Theme(err) => vec![Diagnostic::error(DiagnosticKind::Theme, err.to_string())],
            TokenError::Scale(err) => {
                vec![Diagnostic::error(DiagnosticKind::Scale, err.message.clone()).at(&err.path)]
            }
        }
    }
}

/// Errors raised while substituting aliases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("{path}: reference to undefined token {{{target}}}")]
    UndefinedReference { path: String, target: String },

    #[error("alias cycle: {}", cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },

    #[error("{path}: malformed alias in {value:?}: {reason}")]
    MalformedAlias {
        path: String,
        value: String,
        reason: String,
    },
}

impl ResolveError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::UndefinedReference { path, .. } => {
                Diagnostic::error(DiagnosticKind::Reference, self.to_string()).at(path)
            }
            ResolveError::Cycle { cycle } => {
                let diag = Diagnostic::error(DiagnosticKind::Cycle, self.to_string());
                match cycle.first() {
                    Some(first) => diag.at(first),
                    None => diag,
                }
            }
            ResolveError::MalformedAlias { path, .. } => {
                Diagnostic::error(DiagnosticKind::Reference, self.to_string()).at(path)
            }
        }
    }
}

/// Errors raised by theme inheritance and default-theme selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error("theme '{theme}' extends unknown theme '{parent}'")]
    UnknownParent { theme: String, parent: String },

    #[error("theme inheritance cycle: {}", chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error("theme '{theme}' exceeds the maximum $extends depth of {limit}")]
    TooDeep { theme: String, limit: usize },

    #[error("multiple themes declare $default: {}", themes.join(", "))]
    AmbiguousDefault { themes: Vec<String> },
}

/// Errors reading the project configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A `$scale` definition that cannot be expanded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: invalid $scale: {message}")]
pub struct ScaleError {
    pub path: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_display() {
        let err = ResolveError::Cycle {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "alias cycle: a -> b -> a");
        assert_eq!(err.to_diagnostic().path.as_deref(), Some("a"));
    }

    #[test]
    fn test_undefined_reference_display() {
        let err = ResolveError::UndefinedReference {
            path: "color.brand".into(),
            target: "color.nope".into(),
        };
        assert_eq!(
            err.to_string(),
            "color.brand: reference to undefined token {color.nope}"
        );
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as _;
        let err = TokenError::Io {
            path: PathBuf::from("tokens/a.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("tokens/a.json"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_validation_error_flattens() {
        let err = TokenError::Validation {
            errors: 1,
            diagnostics: vec![Diagnostic::error(DiagnosticKind::Cycle, "x")],
        };
        assert_eq!(err.to_diagnostics().len(), 1);
        assert_eq!(err.to_string(), "validation failed with 1 error(s)");
    }
}
