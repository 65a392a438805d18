//! Dictionary validation.
//!
//! [`validate`] runs every check in one pass and returns a
//! [`ValidationReport`] with all findings, so a user sees the complete list
//! instead of fixing problems one at a time:
//!
//! 1. **Structure**: tokens carry `$value`; raw values appear only inside
//!    components; keys are legal path segments; metadata keys are known.
//! 2. **Type inference**: `$type` is inherited from the nearest group.
//! 3. **Type compatibility**: literal values match their type.
//! 4. **Reference integrity**: every `{path}` names an existing token.
//! 5. **Cycle freedom**: the alias graph is acyclic.
//! 6. **Theme completeness**: see [`check_theme_paths`].
//! 7. **Layer rules** (opt-in): `brand` tokens are literal, `semantic`
//!    tokens alias only `brand`, `component` tokens alias only `semantic`.
//!
//! The alias graph built for checks 4 and 5 is kept on the report so the
//! resolver does not rebuild it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::alias;
use crate::css::literal;
use crate::diagnostic::{Diagnostic, DiagnosticKind, Severity};
use crate::dictionary::{join_path, Dictionary, Group, Node, Token};
use crate::error::{ResolveError, TokenError};
use crate::extract::responsive;
use crate::graph::{self, AliasGraph};
use crate::value::Value;

/// Metadata keys with a defined meaning. Anything else is warned about.
pub const KNOWN_METADATA: &[&str] = &[
    "$value",
    "$type",
    "$description",
    "$usage",
    "$avoid",
    "$deprecated",
    "$customizable",
    "$property",
    "$responsive",
    "$container",
    "$layer",
    "$extends",
    "$scale",
    "$keyframes",
    "$class",
    "$component",
    "$contains",
    "$requires",
    "$default",
    "$extensions",
    "$schema",
];

/// `$type` values the validator knows how to check. Others pass with a warning.
pub const KNOWN_TYPES: &[&str] = &[
    "color",
    "dimension",
    "duration",
    "number",
    "integer",
    "fontFamily",
    "fontWeight",
    "cubicBezier",
    "string",
    "boolean",
    "shadow",
    "border",
    "transition",
    "typography",
    "gradient",
    "strokeStyle",
    "effect",
];

/// Metadata that only makes sense on a token; a group carrying it with no
/// children is a token that lost its `$value`.
const TOKEN_ONLY_METADATA: &[&str] = &[
    "$usage",
    "$avoid",
    "$deprecated",
    "$customizable",
    "$property",
    "$responsive",
];

const LAYER_KEY: &str = "$layer";

const FONT_WEIGHT_KEYWORDS: &[&str] = &[
    "thin", "hairline", "extra-light", "ultra-light", "light", "normal", "regular", "book",
    "medium", "semi-bold", "demi-bold", "bold", "extra-bold", "ultra-bold", "black", "heavy",
    "extra-black", "ultra-black", "lighter", "bolder",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Enforce `$layer` alias rules.
    pub strict_layers: bool,
    /// Accept theme paths that exist in neither base nor any ancestor theme.
    pub allow_theme_additions: bool,
}

/// Everything [`validate`] found.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<Diagnostic>,
    graph: AliasGraph,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// The alias graph built while validating.
    pub fn graph(&self) -> &AliasGraph {
        &self.graph
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Fails with [`TokenError::Validation`] when any error was found.
    pub fn into_result(self) -> Result<Self, TokenError> {
        let errors = self.error_count();
        if errors > 0 {
            Err(TokenError::Validation {
                errors,
                diagnostics: self.diagnostics,
            })
        } else {
            Ok(self)
        }
    }
}

/// Runs checks 1 to 5 and, when enabled, 7.
pub fn validate(dict: &Dictionary, options: ValidationOptions) -> ValidationReport {
    let mut diagnostics = Vec::new();

    let mut structure = StructureCheck {
        dict,
        out: &mut diagnostics,
    };
    structure.check_meta_keys(&dict.root().meta, "");
    structure.check_group(dict.root(), "", false);

    let breakpoints: BTreeSet<String> = responsive::breakpoints(dict)
        .into_iter()
        .map(|bp| bp.name)
        .collect();

    for entry in dict.tokens() {
        let file = dict.source_of(&entry.path);
        check_token_type(&entry.path, entry.token, entry.inferred_type, file, &mut diagnostics);
        check_token_metadata(dict, &entry.path, entry.token, &breakpoints, file, &mut diagnostics);
    }

    check_property_names(dict, &mut diagnostics);

    let (graph, issues) = AliasGraph::from_dictionary(dict);
    for issue in issues {
        let path = issue_path(&issue);
        diagnostics.push(issue.to_diagnostic().in_file(dict.source_of(path)));
    }
    for cycle in graph.cycles() {
        let mut diag = ResolveError::Cycle {
            cycle: cycle.clone(),
        }
        .to_diagnostic()
        .in_file(dict.source_of(&cycle[0]));
        for member in &cycle[1..cycle.len().saturating_sub(1)] {
            diag = diag.with_related(member.as_str(), dict.source_of(member));
        }
        diagnostics.push(diag);
    }

    if options.strict_layers {
        check_layers(dict, &graph, &mut diagnostics);
    }

    let report = ValidationReport { diagnostics, graph };
    tracing::debug!(
        errors = report.error_count(),
        warnings = report.warnings().count(),
        "validated dictionary"
    );
    report
}

/// Check 6: every token path in `theme` must exist in `inherited`
/// (base plus every ancestor theme), unless additions are allowed.
pub fn check_theme_paths(
    name: &str,
    theme: &Dictionary,
    inherited: &BTreeSet<String>,
    options: ValidationOptions,
) -> Vec<Diagnostic> {
    if options.allow_theme_additions {
        return Vec::new();
    }
    theme
        .tokens()
        .into_iter()
        .filter(|entry| !inherited.contains(&entry.path))
        .map(|entry| {
            Diagnostic::error(
                DiagnosticKind::Theme,
                format!(
                    "theme '{}' overrides '{}', which is not defined in base or any parent theme",
                    name, entry.path
                ),
            )
            .in_file(theme.source_of(&entry.path))
            .at(entry.path)
        })
        .collect()
}

/// Distinct paths must not flatten to the same custom property
/// (`a.b` and `a-b` are both `--a-b`).
fn check_property_names(dict: &Dictionary, out: &mut Vec<Diagnostic>) {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for entry in dict.tokens() {
        let name = alias::custom_property_name(&entry.path);
        match seen.get(&name) {
            Some(first) => out.push(
                Diagnostic::error(
                    DiagnosticKind::Structural,
                    format!("'{}' and '{}' both emit {}", first, entry.path, name),
                )
                .at(entry.path.as_str())
                .in_file(dict.source_of(&entry.path))
                .with_related(first.as_str(), dict.source_of(first)),
            ),
            None => {
                seen.insert(name, entry.path);
            }
        }
    }
}

fn issue_path(issue: &ResolveError) -> &str {
    match issue {
        ResolveError::UndefinedReference { path, .. } | ResolveError::MalformedAlias { path, .. } => {
            path
        }
        ResolveError::Cycle { cycle } => cycle.first().map(String::as_str).unwrap_or(""),
    }
}

// ============================================================================
// Structure
// ============================================================================

struct StructureCheck<'a> {
    dict: &'a Dictionary,
    out: &'a mut Vec<Diagnostic>,
}

impl StructureCheck<'_> {
    fn file_for(&self, path: &str) -> Option<&Path> {
        self.dict.source_of(path).or_else(|| {
            let prefix = format!("{}.", path);
            self.dict
                .sources()
                .iter()
                .find(|(leaf, _)| leaf.starts_with(&prefix))
                .map(|(_, file)| file.as_path())
        })
    }

    fn error(&mut self, kind: DiagnosticKind, path: &str, message: String) {
        let diag = Diagnostic::error(kind, message)
            .at(path)
            .in_file(self.file_for(path));
        self.out.push(diag);
    }

    fn warning(&mut self, kind: DiagnosticKind, path: &str, message: String) {
        let diag = Diagnostic::warning(kind, message)
            .at(path)
            .in_file(self.file_for(path));
        self.out.push(diag);
    }

    fn check_meta_keys<'k>(&mut self, meta: impl IntoIterator<Item = (&'k String, &'k Value)>, path: &str) {
        for (key, value) in meta {
            if !KNOWN_METADATA.contains(&key.as_str()) {
                self.warning(
                    DiagnosticKind::Metadata,
                    path,
                    format!("unknown metadata key '{}'", key),
                );
            }
            if key == "$type" && value.as_str().is_none() {
                self.error(
                    DiagnosticKind::Structural,
                    path,
                    format!("$type must be a string, found {}", value.kind_name()),
                );
            }
        }
    }

    fn check_group(&mut self, group: &Group, prefix: &str, in_component: bool) {
        let in_component = in_component || group.is_component();

        for (key, node) in &group.children {
            let path = join_path(prefix, key);
            if key.is_empty() || key.contains(['.', '{', '}']) {
                self.error(
                    DiagnosticKind::Structural,
                    &path,
                    format!("key '{}' may not be empty or contain '.', '{{' or '}}'", key),
                );
            }

            match node {
                Node::Token(token) => {
                    self.check_meta_keys(&token.meta, &path);
                    for extra in token.extra.keys() {
                        self.warning(
                            DiagnosticKind::Metadata,
                            &path,
                            format!("key '{}' next to $value is ignored", extra),
                        );
                    }
                }
                Node::Group(child) => {
                    if !in_component {
                        self.check_meta_keys(&child.meta, &path);
                    }
                    let token_meta = child
                        .meta
                        .keys()
                        .any(|k| TOKEN_ONLY_METADATA.contains(&k.as_str()));
                    if child.children.is_empty() && token_meta {
                        self.error(
                            DiagnosticKind::Structural,
                            &path,
                            "token missing $value".to_string(),
                        );
                    }
                    self.check_group(child, &path, in_component);
                }
                Node::Literal(value) => {
                    if !in_component {
                        self.error(
                            DiagnosticKind::Structural,
                            &path,
                            format!("token missing $value (found bare {})", value.kind_name()),
                        );
                    }
                }
            }
        }
    }
}

// ============================================================================
// Types
// ============================================================================

fn check_token_type(
    path: &str,
    token: &Token,
    inferred_type: Option<&str>,
    file: Option<&Path>,
    out: &mut Vec<Diagnostic>,
) {
    let Some(ty) = inferred_type else {
        return;
    };
    if !KNOWN_TYPES.contains(&ty) {
        out.push(
            Diagnostic::warning(DiagnosticKind::Metadata, format!("unknown $type '{}'", ty))
                .at(path)
                .in_file(file),
        );
        return;
    }
    if let Err(message) = check_value(ty, &token.value) {
        out.push(
            Diagnostic::error(
                DiagnosticKind::TypeMismatch,
                format!("value {} is not a valid {}: {}", describe(&token.value), ty, message),
            )
            .at(path)
            .in_file(file),
        );
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{:?}", s),
        Value::Map(_) => "object".to_string(),
        other => other.to_css_string(),
    }
}

/// Checks one value against a known type. Anything containing an alias
/// passes; aliases are checked by reference integrity instead.
fn check_value(ty: &str, value: &Value) -> Result<(), String> {
    if let Value::String(s) = value {
        if alias::has_alias(s) {
            return Ok(());
        }
    }

    match ty {
        "color" => match value {
            Value::String(s) if literal::is_color(s) => Ok(()),
            Value::String(_) => Err("expected a hex, named or functional color".into()),
            Value::Map(map) if map.contains_key("hex") || map.contains_key("components") => Ok(()),
            _ => Err("expected a color string".into()),
        },
        "dimension" => check_measure(value, literal::is_dimension, literal::is_length_unit, "length"),
        "duration" => check_measure(value, literal::is_duration, literal::is_time_unit, "time in ms or s"),
        "number" => match value {
            v if v.is_number() => Ok(()),
            _ => Err("expected a number".into()),
        },
        "integer" => match value {
            Value::Integer(_) => Ok(()),
            Value::Float(f) if f.fract() == 0.0 => Ok(()),
            _ => Err("expected an integer".into()),
        },
        "fontFamily" => match value {
            Value::String(_) => Ok(()),
            Value::List(items) if !items.is_empty() && items.iter().all(|i| i.as_str().is_some()) => {
                Ok(())
            }
            _ => Err("expected a string or a list of strings".into()),
        },
        "fontWeight" => match value {
            v if v.is_number() => match v.as_f64() {
                Some(w) if (1.0..=1000.0).contains(&w) => Ok(()),
                _ => Err("numeric weights range from 1 to 1000".into()),
            },
            Value::String(s) if FONT_WEIGHT_KEYWORDS.contains(&s.as_str()) => Ok(()),
            _ => Err("expected a weight keyword or a number".into()),
        },
        "cubicBezier" => match value {
            Value::List(items) if items.len() == 4 => {
                let coords: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
                match coords {
                    Some(c) if (0.0..=1.0).contains(&c[0]) && (0.0..=1.0).contains(&c[2]) => Ok(()),
                    Some(_) => Err("x coordinates must lie in [0, 1]".into()),
                    None => Err("coordinates must be numbers".into()),
                }
            }
            Value::String(_) => Ok(()),
            _ => Err("expected four numbers".into()),
        },
        "string" => match value {
            Value::String(_) => Ok(()),
            _ => Err("expected a string".into()),
        },
        "boolean" => match value {
            Value::Bool(_) => Ok(()),
            _ => Err("expected true or false".into()),
        },
        _ => Ok(()),
    }
}

fn check_measure(
    value: &Value,
    is_literal: fn(&str) -> bool,
    is_unit: fn(&str) -> bool,
    expected: &str,
) -> Result<(), String> {
    match value {
        Value::String(s) if is_literal(s) => Ok(()),
        Value::Integer(0) => Ok(()),
        Value::Float(f) if *f == 0.0 => Ok(()),
        Value::Map(map) => {
            let number = map.get("value").is_some_and(Value::is_number);
            let unit = map.get("unit").and_then(Value::as_str).is_some_and(is_unit);
            if number && unit {
                Ok(())
            } else {
                Err(format!("expected {{\"value\": number, \"unit\": {}}}", expected))
            }
        }
        Value::List(items) if !items.is_empty() => {
            for item in items {
                check_measure(item, is_literal, is_unit, expected)?;
            }
            Ok(())
        }
        _ => Err(format!("expected a {}", expected)),
    }
}

// ============================================================================
// Metadata
// ============================================================================

fn check_token_metadata(
    dict: &Dictionary,
    path: &str,
    token: &Token,
    breakpoints: &BTreeSet<String>,
    file: Option<&Path>,
    out: &mut Vec<Diagnostic>,
) {
    let mut warn = |message: String| {
        out.push(
            Diagnostic::warning(DiagnosticKind::Metadata, message)
                .at(path)
                .in_file(file),
        )
    };

    if let Some(usage) = token.meta("$usage") {
        let ok = match usage {
            Value::String(_) => true,
            Value::List(items) => items.iter().all(|i| i.as_str().is_some()),
            _ => false,
        };
        if !ok {
            warn("$usage should be a list of strings".to_string());
        }
    }
    if let Some(deprecated) = token.meta("$deprecated") {
        if !matches!(deprecated, Value::Bool(_) | Value::String(_)) {
            warn("$deprecated should be a boolean or a message".to_string());
        }
    }
    if let Some(customizable) = token.meta("$customizable") {
        if customizable.as_bool().is_none() {
            warn("$customizable should be a boolean".to_string());
        }
    }
    if let Some(property) = token.meta("$property") {
        let ok = match property {
            Value::Bool(_) => true,
            Value::Map(map) => map.get("inherits").map_or(true, |v| v.as_bool().is_some()),
            _ => false,
        };
        if !ok {
            warn("$property should be a boolean or {\"inherits\": boolean}".to_string());
        }
    }

    match token.meta("$responsive") {
        Some(Value::Map(overrides)) => {
            for (name, value) in overrides {
                if !breakpoints.contains(name) {
                    out.push(
                        Diagnostic::error(
                            DiagnosticKind::Structural,
                            format!("$responsive names unknown breakpoint '{}'", name),
                        )
                        .at(path)
                        .in_file(file),
                    );
                }
                for issue in override_reference_issues(dict, path, value) {
                    out.push(issue.to_diagnostic().in_file(file));
                }
            }
        }
        Some(_) => out.push(
            Diagnostic::error(
                DiagnosticKind::Structural,
                "$responsive must map breakpoint names to values",
            )
            .at(path)
            .in_file(file),
        ),
        None => {}
    }
}

/// Reference integrity for a `$responsive` override value.
fn override_reference_issues(dict: &Dictionary, path: &str, value: &Value) -> Vec<ResolveError> {
    match graph::value_references(value) {
        Ok(targets) => targets
            .into_iter()
            .filter(|target| !dict.contains_token(target))
            .map(|target| ResolveError::UndefinedReference {
                path: path.to_string(),
                target: target.to_string(),
            })
            .collect(),
        Err((text, reason)) => vec![ResolveError::MalformedAlias {
            path: path.to_string(),
            value: text,
            reason,
        }],
    }
}

// ============================================================================
// Layers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Brand,
    Semantic,
    Component,
}

impl Layer {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "brand" => Some(Layer::Brand),
            "semantic" => Some(Layer::Semantic),
            "component" => Some(Layer::Component),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Layer::Brand => "brand",
            Layer::Semantic => "semantic",
            Layer::Component => "component",
        }
    }

    /// The only layer this one may alias, if any.
    fn may_alias(self) -> Option<Layer> {
        match self {
            Layer::Brand => None,
            Layer::Semantic => Some(Layer::Brand),
            Layer::Component => Some(Layer::Semantic),
        }
    }
}

fn layer_of(dict: &Dictionary, path: &str) -> Option<Layer> {
    let top = path.split('.').next()?;
    dict.root()
        .get(top)?
        .as_group()?
        .meta(LAYER_KEY)?
        .as_str()
        .and_then(Layer::parse)
}

fn check_layers(dict: &Dictionary, graph: &AliasGraph, out: &mut Vec<Diagnostic>) {
    for (key, node) in &dict.root().children {
        let Node::Group(group) = node else {
            continue;
        };
        if let Some(name) = group.meta(LAYER_KEY).and_then(Value::as_str) {
            if Layer::parse(name).is_none() {
                out.push(
                    Diagnostic::warning(
                        DiagnosticKind::Layer,
                        format!("unknown $layer '{}' (expected brand, semantic or component)", name),
                    )
                    .at(key.as_str()),
                );
            }
        }
    }

    for entry in dict.tokens() {
        let Some(layer) = layer_of(dict, &entry.path) else {
            continue;
        };
        for target in graph.dependencies(&entry.path) {
            let target_layer = layer_of(dict, target);
            let allowed = layer.may_alias().is_some_and(|l| Some(l) == target_layer);
            if allowed {
                continue;
            }
            let message = match (layer.may_alias(), target_layer) {
                (None, _) => format!("{} tokens may not contain aliases, found {{{}}}", layer.name(), target),
                (Some(expected), Some(actual)) => format!(
                    "{} tokens may alias only {} tokens, but {{{}}} is {}",
                    layer.name(),
                    expected.name(),
                    target,
                    actual.name()
                ),
                (Some(expected), None) => format!(
                    "{} tokens may alias only {} tokens, but {{{}}} has no layer",
                    layer.name(),
                    expected.name(),
                    target
                ),
            };
            out.push(
                Diagnostic::error(DiagnosticKind::Layer, message)
                    .at(entry.path.as_str())
                    .in_file(dict.source_of(&entry.path))
                    .with_related(target, dict.source_of(target)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(json: serde_json::Value) -> ValidationReport {
        check_with(json, ValidationOptions::default())
    }

    fn check_with(json: serde_json::Value, options: ValidationOptions) -> ValidationReport {
        let dict = Dictionary::from_json(&json, Some(Path::new("tokens.json"))).unwrap();
        validate(&dict, options)
    }

    fn kinds(report: &ValidationReport) -> Vec<DiagnosticKind> {
        report.errors().map(|d| d.kind).collect()
    }

    // =========================================================================
    // Structure
    // =========================================================================

    #[test]
    fn test_clean_dictionary_passes() {
        let report = check(json!({
            "color": {"$type": "color", "blue": {"$value": "#3b82f6"}, "primary": {"$value": "{color.blue}"}},
            "space": {"$type": "dimension", "md": {"$value": "1rem", "$description": "Medium"}}
        }));
        assert!(!report.has_errors(), "{:?}", report.diagnostics);
        assert_eq!(report.warnings().count(), 0);
        assert!(report.graph().contains("color.primary"));
    }

    #[test]
    fn test_bare_value_outside_component_is_structural() {
        let report = check(json!({"color": {"red": "#f00"}}));
        assert_eq!(kinds(&report), vec![DiagnosticKind::Structural]);
        assert!(report.diagnostics[0].message.contains("missing $value"));
    }

    #[test]
    fn test_bare_values_inside_component_are_allowed() {
        let report = check(json!({
            "button": {"$class": "btn", "padding": "1rem", "variants": {"primary": {"color": "red"}}}
        }));
        assert!(!report.has_errors(), "{:?}", report.diagnostics);
    }

    #[test]
    fn test_group_with_token_metadata_and_no_value() {
        let report = check(json!({"color": {"red": {"$deprecated": true}}}));
        assert_eq!(kinds(&report), vec![DiagnosticKind::Structural]);
    }

    #[test]
    fn test_illegal_key_characters() {
        let report = check(json!({"color": {"a.b": {"$value": "#fff"}}}));
        assert!(kinds(&report).contains(&DiagnosticKind::Structural));
    }

    #[test]
    fn test_unknown_metadata_warns_only() {
        let report = check(json!({"color": {"red": {"$value": "#f00", "$flavour": "x", "note": 1}}}));
        assert!(!report.has_errors());
        assert_eq!(report.warnings().count(), 2);
    }

    // =========================================================================
    // Types
    // =========================================================================

    #[test]
    fn test_type_mismatches() {
        let report = check(json!({
            "color": {"$type": "color", "bad": {"$value": "#12"}},
            "space": {"$type": "dimension", "bad": {"$value": "12"}, "zero": {"$value": 0}},
            "time": {"$type": "duration", "bad": {"$value": "2px"}, "ok": {"$value": "150ms"}},
            "n": {"$type": "number", "bad": {"$value": "four"}}
        }));
        let paths: Vec<_> = report.errors().map(|d| d.path.clone().unwrap()).collect();
        assert_eq!(paths, vec!["color.bad", "n.bad", "space.bad", "time.bad"]);
        assert!(report.errors().all(|d| d.kind == DiagnosticKind::TypeMismatch));
    }

    #[test]
    fn test_composite_values_accepted() {
        let report = check(json!({
            "space": {"$type": "dimension", "md": {"$value": {"value": 16, "unit": "px"}}},
            "c": {"$type": "color", "x": {"$value": {"colorSpace": "srgb", "components": [1, 0, 0], "hex": "#ff0000"}}},
            "font": {"$type": "fontFamily", "body": {"$value": ["Inter", "sans-serif"]}},
            "ease": {"$type": "cubicBezier", "out": {"$value": [0.2, 0, 0, 1]}}
        }));
        assert!(!report.has_errors(), "{:?}", report.diagnostics);
    }

    #[test]
    fn test_unknown_type_warns() {
        let report = check(json!({"x": {"$type": "sparkle", "y": {"$value": 1}}}));
        assert!(!report.has_errors());
        assert!(report.warnings().any(|d| d.message.contains("sparkle")));
    }

    #[test]
    fn test_alias_values_skip_type_check() {
        let report = check(json!({
            "space": {"$type": "dimension", "a": {"$value": "4px"}, "b": {"$value": "{space.a}"}}
        }));
        assert!(!report.has_errors());
    }

    // =========================================================================
    // References and cycles
    // =========================================================================

    #[test]
    fn test_undefined_reference() {
        let report = check(json!({"color": {"a": {"$value": "{color.missing}"}}}));
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, DiagnosticKind::Reference);
        assert_eq!(errors[0].path.as_deref(), Some("color.a"));
        assert_eq!(errors[0].file.as_deref(), Some(Path::new("tokens.json")));
    }

    #[test]
    fn test_alias_to_group_is_undefined() {
        let report = check(json!({"color": {"a": {"$value": "{color}"}}}));
        assert_eq!(kinds(&report), vec![DiagnosticKind::Reference]);
    }

    #[test]
    fn test_cycle_reports_all_members() {
        let report = check(json!({"a": {"$value": "{b}"}, "b": {"$value": "{a}"}}));
        let cycle: Vec<_> = report
            .errors()
            .filter(|d| d.kind == DiagnosticKind::Cycle)
            .collect();
        assert_eq!(cycle.len(), 1);
        assert!(cycle[0].message.contains("a -> b -> a"));
        assert_eq!(cycle[0].related[0].path, "b");
    }

    #[test]
    fn test_responsive_unknown_breakpoint() {
        let report = check(json!({
            "breakpoint": {"md": {"$value": "768px"}},
            "space": {"gutter": {"$value": "1rem", "$responsive": {"md": "2rem", "xl": "3rem"}}}
        }));
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'xl'"));
    }

    #[test]
    fn test_paths_flattening_to_one_property_collide() {
        let report = check(json!({
            "a": {"b": {"$value": "1px"}},
            "a-b": {"$value": "2px"},
            "a-c": {"$value": "3px"}
        }));
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1, "{:?}", errors);
        assert_eq!(errors[0].kind, DiagnosticKind::Structural);
        assert_eq!(errors[0].path.as_deref(), Some("a-b"));
        assert_eq!(errors[0].related[0].path, "a.b");
        assert!(errors[0].message.contains("--a-b"));
    }

    #[test]
    fn test_responsive_override_references_are_checked() {
        let report = check(json!({
            "breakpoint": {"md": {"$value": "768px"}},
            "space": {
                "sm": {"$value": "1rem"},
                "g": {"$value": "1rem", "$responsive": {"md": "{space.nope}"}},
                "h": {"$value": "1rem", "$responsive": {"md": "calc({space.sm} * 2)"}},
                "i": {"$value": "1rem", "$responsive": {"md": "{space.sm"}}
            }
        }));
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 2, "{:?}", errors);
        assert_eq!(errors[0].kind, DiagnosticKind::Reference);
        assert_eq!(errors[0].path.as_deref(), Some("space.g"));
        assert!(errors[0].message.contains("{space.nope}"));
        assert_eq!(errors[1].path.as_deref(), Some("space.i"));
    }

    // =========================================================================
    // Layers
    // =========================================================================

    fn layered() -> serde_json::Value {
        json!({
            "brand": {"$layer": "brand", "blue": {"$value": "#00f"}, "alias": {"$value": "{brand.blue}"}},
            "semantic": {"$layer": "semantic", "primary": {"$value": "{brand.blue}"}, "bad": {"$value": "{component.bg}"}},
            "component": {"$layer": "component", "bg": {"$value": "{semantic.primary}"}, "skip": {"$value": "{brand.blue}"}}
        })
    }

    #[test]
    fn test_layers_ignored_by_default() {
        assert!(!check(layered()).has_errors());
    }

    #[test]
    fn test_strict_layers() {
        let report = check_with(
            layered(),
            ValidationOptions {
                strict_layers: true,
                ..Default::default()
            },
        );
        let layer_errors: Vec<_> = report
            .errors()
            .filter(|d| d.kind == DiagnosticKind::Layer)
            .map(|d| (d.path.clone().unwrap(), d.related[0].path.clone()))
            .collect();
        assert_eq!(
            layer_errors,
            vec![
                ("brand.alias".to_string(), "brand.blue".to_string()),
                ("component.skip".to_string(), "brand.blue".to_string()),
                ("semantic.bad".to_string(), "component.bg".to_string()),
            ]
        );
    }

    // =========================================================================
    // Themes
    // =========================================================================

    #[test]
    fn test_theme_paths_must_exist() {
        let theme = Dictionary::from_json(
            &json!({"color": {"bg": {"$value": "#000"}, "new": {"$value": "#111"}}}),
            None,
        )
        .unwrap();
        let inherited: BTreeSet<String> = ["color.bg".to_string()].into();
        let diags = check_theme_paths("dark", &theme, &inherited, ValidationOptions::default());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].path.as_deref(), Some("color.new"));

        let allowed = ValidationOptions {
            allow_theme_additions: true,
            ..Default::default()
        };
        assert!(check_theme_paths("dark", &theme, &inherited, allowed).is_empty());
    }
}
