//! Diagnostics and diagnostic sinks.
//!
//! Validation is only useful when it reports every problem at once, so the
//! engine accumulates [`Diagnostic`]s rather than failing on the first one.
//! Warnings produced while loading (merge overwrites, unknown metadata keys)
//! are streamed to a caller-provided [`DiagnosticSink`] and never affect the
//! returned artifacts.
//!
//! # Sinks
//!
//! - `Vec<Diagnostic>` collects everything (used by tests and the CLI).
//! - [`TracingSink`] forwards to `tracing` at warn/error level.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Category of a diagnostic, one per failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    Io,
    Parse,
    Structural,
    TypeMismatch,
    Reference,
    Cycle,
    Layer,
    Theme,
    Scale,
    /// A later file replaced a value installed by an earlier one.
    Merge,
    /// Unknown or misplaced `$` metadata.
    Metadata,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::Io => "io",
            DiagnosticKind::Parse => "parse",
            DiagnosticKind::Structural => "structural",
            DiagnosticKind::TypeMismatch => "type-mismatch",
            DiagnosticKind::Reference => "reference",
            DiagnosticKind::Cycle => "cycle",
            DiagnosticKind::Layer => "layer",
            DiagnosticKind::Theme => "theme",
            DiagnosticKind::Scale => "scale",
            DiagnosticKind::Merge => "merge",
            DiagnosticKind::Metadata => "metadata",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A secondary location attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Related {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// A single validation or loading finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Dotted token path the finding is about, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// File that installed `path`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<Related>,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            path: None,
            file: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, message)
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn in_file(mut self, file: Option<&Path>) -> Self {
        self.file = file.map(Path::to_path_buf);
        self
    }

    pub fn with_related(mut self, path: impl Into<String>, file: Option<&Path>) -> Self {
        self.related.push(Related {
            path: path.into(),
            file: file.map(Path::to_path_buf),
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}[{}]", severity, self.kind)?;
        if let Some(path) = &self.path {
            write!(f, " {}", path)?;
        }
        if let Some(file) = &self.file {
            write!(f, " ({})", file.display())?;
        }
        write!(f, ": {}", self.message)?;
        for related in &self.related {
            write!(f, "\n  related: {}", related.path)?;
            if let Some(file) = &related.file {
                write!(f, " ({})", file.display())?;
            }
        }
        Ok(())
    }
}

/// Destination for diagnostics produced while the engine runs.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards diagnostics to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        let path = diagnostic.path.as_deref().unwrap_or("");
        match diagnostic.severity {
            Severity::Error => tracing::error!(kind = %diagnostic.kind, path, "{}", diagnostic.message),
            Severity::Warning => tracing::warn!(kind = %diagnostic.kind, path, "{}", diagnostic.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_location() {
        let diag = Diagnostic::error(DiagnosticKind::Reference, "unknown alias {color.nope}")
            .at("color.brand")
            .in_file(Some(Path::new("tokens/color.json")));
        let text = diag.to_string();
        assert!(text.starts_with("error[reference] color.brand"));
        assert!(text.contains("tokens/color.json"));
        assert!(text.contains("{color.nope}"));
    }

    #[test]
    fn test_display_related() {
        let diag = Diagnostic::error(DiagnosticKind::Layer, "semantic token aliases component")
            .at("semantic.bg")
            .with_related("component.button.bg", None);
        assert!(diag.to_string().contains("related: component.button.bg"));
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        sink.emit(Diagnostic::warning(DiagnosticKind::Merge, "overwritten"));
        assert_eq!(sink.len(), 1);
        assert!(!sink[0].is_error());
    }
}
