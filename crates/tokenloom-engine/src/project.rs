//! The build pipeline.
//!
//! ```text
//! Project::load ──> validate ──> compile ──> to_css / to_catalog / search
//!   files, merge,     checks,      inherit, resolve,
//!   scale expansion   themes       diff, extract
//! ```
//!
//! [`Project::validate`] collects every diagnostic, including the ones
//! raised while loading. [`Project::compile`] refuses to go on when any of
//! them is an error.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::catalog::{build_catalog, Catalog, CatalogOptions, CatalogSource};
use crate::config::Config;
use crate::css::{emit_css, GenerationContext};
use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::diff::diff;
use crate::dictionary::Dictionary;
use crate::error::TokenError;
use crate::extract::responsive::resolved_breakpoints;
use crate::extract::{
    extract_components, extract_keyframes, extract_properties, extract_responsive,
};
use crate::resolve::{resolve, resolve_with_graph, ResolvedTokens};
use crate::search::{search, Query, SearchFilters, SearchHit};
use crate::theme::{self, CompiledTheme, ThemeInfo};
use crate::validate::{check_theme_paths, validate, ValidationOptions, ValidationReport};
use crate::value::Value;

/// Loaded sources: the merged base dictionary and every theme.
#[derive(Debug, Clone)]
pub struct Project {
    base: Dictionary,
    themes: BTreeMap<String, Dictionary>,
    options: ValidationOptions,
    configured_default: Option<String>,
    load_diagnostics: Vec<Diagnostic>,
}

impl Project {
    /// Loads base tokens and themes from `roots`.
    ///
    /// IO and parse failures abort. Merge warnings and scale errors are kept
    /// and surface in [`validate`](Self::validate).
    pub fn load(roots: &[PathBuf], config: &Config) -> Result<Self, TokenError> {
        let loader = config.loader();
        let mut load_diagnostics = Vec::new();
        let base = loader.load_base(roots, &mut load_diagnostics)?;
        let themes = loader.load_themes(roots, &mut load_diagnostics)?;
        tracing::debug!(
            roots = roots.len(),
            themes = themes.len(),
            "loaded project"
        );
        let mut project = Self::from_parts(base, themes, config);
        project.load_diagnostics = load_diagnostics;
        Ok(project)
    }

    /// Builds a project from dictionaries already in memory.
    pub fn from_parts(base: Dictionary, themes: BTreeMap<String, Dictionary>, config: &Config) -> Self {
        Self {
            base,
            themes,
            options: config.validation_options(),
            configured_default: Some(config.default_theme.clone()).filter(|name| !name.is_empty()),
            load_diagnostics: Vec::new(),
        }
    }

    pub fn base(&self) -> &Dictionary {
        &self.base
    }

    pub fn themes(&self) -> &BTreeMap<String, Dictionary> {
        &self.themes
    }

    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    pub fn set_options(&mut self, options: ValidationOptions) {
        self.options = options;
    }

    /// Validates base and every theme.
    pub fn validate(&self) -> ValidationReport {
        let mut report = validate(&self.base, self.options);
        let mut diagnostics = self.load_diagnostics.clone();
        diagnostics.append(&mut report.diagnostics);
        report.diagnostics = diagnostics;

        if let Err(err) = theme::select_default(&self.themes, self.configured_default.as_deref()) {
            report.extend([Diagnostic::error(DiagnosticKind::Theme, err.to_string())]);
        }

        let mut chain_errors = BTreeSet::new();
        for (name, raw) in &self.themes {
            if let Err(err) = theme::inheritance_chain(name, &self.themes) {
                if chain_errors.insert(err.to_string()) {
                    report.extend([Diagnostic::error(DiagnosticKind::Theme, err.to_string())]);
                }
                continue;
            }
            report.extend(self.validate_theme(name, raw));
        }
        report
    }

    /// Diagnostics a theme introduces on top of base.
    fn validate_theme(&self, name: &str, raw: &Dictionary) -> Vec<Diagnostic> {
        let mut out = Vec::new();

        if let Ok(inherited) = theme::inherited_paths(name, &self.base, &self.themes) {
            out.extend(check_theme_paths(name, raw, &inherited, self.options));
        }

        let mut merged = self.base.clone();
        let mut overrides = Vec::new();
        if let Ok(chain) = theme::inheritance_chain(name, &self.themes) {
            for link in &chain {
                if let Some(theme) = self.themes.get(link) {
                    merged.merge(theme, &mut overrides);
                }
            }
        }

        // Only what the theme itself touches; the rest is reported for base.
        let mut own: BTreeSet<String> = raw.token_paths();
        own.extend(raw.sources().keys().cloned());
        let theme_report = validate(&merged, self.options);
        out.extend(
            theme_report
                .diagnostics
                .into_iter()
                .filter(|diag| touches(diag, &own))
                .map(|mut diag| {
                    diag.message = format!("theme '{}': {}", name, diag.message);
                    diag
                }),
        );
        out
    }

    /// Validates, then resolves and extracts everything needed for output.
    ///
    /// Warnings are forwarded to `sink`. Any error aborts with
    /// [`TokenError::Validation`].
    pub fn compile(&self, sink: &mut dyn DiagnosticSink) -> Result<CompiledProject, TokenError> {
        let report = self.validate();
        if report.has_errors() {
            return Err(TokenError::Validation {
                errors: report.error_count(),
                diagnostics: report.diagnostics,
            });
        }
        for warning in report.warnings() {
            sink.emit(warning.clone());
        }

        let resolved = resolve_with_graph(&self.base, report.graph())?;
        for (path, token) in resolved.iter() {
            if matches!(token.value, Value::Map(_)) {
                sink.emit(
                    Diagnostic::warning(
                        DiagnosticKind::TypeMismatch,
                        format!("{}: object value has no CSS form and is not emitted", path),
                    )
                    .at(path.as_str())
                    .in_file(self.base.source_of(path)),
                );
            }
        }

        let default_theme = theme::select_default(&self.themes, self.configured_default.as_deref())?;
        let themes = self.compile_themes(&resolved)?;

        let (components, containers) = extract_components(&self.base);
        let properties = extract_properties(&self.base, &resolved);
        let keyframes = extract_keyframes(&self.base);
        let breakpoints = resolved_breakpoints(&self.base, &resolved);
        let responsive = extract_responsive(&self.base, &resolved, &breakpoints)?;

        tracing::debug!(
            tokens = resolved.len(),
            themes = themes.len(),
            components = components.len(),
            "compiled project"
        );

        Ok(CompiledProject {
            dictionary: self.base.clone(),
            context: GenerationContext {
                base: resolved,
                themes,
                default_theme,
                components,
                properties,
                keyframes,
                breakpoints,
                responsive,
                containers,
            },
        })
    }

    fn compile_themes(&self, base: &ResolvedTokens) -> Result<Vec<CompiledTheme>, TokenError> {
        let merged = theme::inherit(&self.base, &self.themes)?;
        let mut compiled = Vec::with_capacity(merged.len());
        for (name, dict) in &merged {
            let resolved = resolve(dict)?;
            let info = self
                .themes
                .get(name)
                .map(|raw| ThemeInfo::of(name, raw))
                .unwrap_or_else(|| ThemeInfo::of(name, dict));
            let diff = diff(&resolved, base);
            tracing::debug!(theme = %name, changed = diff.len(), "compiled theme");
            compiled.push(CompiledTheme {
                info,
                resolved,
                diff,
            });
        }
        Ok(compiled)
    }
}

/// True when the diagnostic's path, or any related path (cycle members),
/// is in `paths`.
fn touches(diag: &Diagnostic, paths: &BTreeSet<String>) -> bool {
    diag.path.iter().chain(diag.related.iter().map(|r| &r.path)).any(|p| paths.contains(p))
}

/// Resolved and extracted output of a [`Project`].
#[derive(Debug, Clone)]
pub struct CompiledProject {
    dictionary: Dictionary,
    context: GenerationContext,
}

impl CompiledProject {
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn resolved(&self) -> &ResolvedTokens {
        &self.context.base
    }

    pub fn themes(&self) -> &[CompiledTheme] {
        &self.context.themes
    }

    pub fn default_theme(&self) -> Option<&str> {
        self.context.default_theme.as_deref()
    }

    pub fn context(&self) -> &GenerationContext {
        &self.context
    }

    pub fn to_css(&self) -> String {
        emit_css(&self.context)
    }

    pub fn to_catalog(&self, options: &CatalogOptions, generated_at: DateTime<Utc>) -> Catalog {
        let source = CatalogSource {
            dictionary: &self.dictionary,
            resolved: &self.context.base,
            themes: &self.context.themes,
            components: &self.context.components,
        };
        build_catalog(source, options, generated_at)
    }

    pub fn search(&self, query: Option<&Query>, filters: &SearchFilters) -> Vec<SearchHit> {
        search(&self.context.base, &self.dictionary, query, filters)
    }
}
