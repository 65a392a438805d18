//! JSON catalog of resolved tokens, components and themes.
//!
//! ```json
//! {
//!   "meta": { "schema_version": "1.0", "generated_at": "…", "tool_version": "0.4.0" },
//!   "tokens": { "color.bg": "#fff" },
//!   "components": { "button": { "classes": ["btn"], "definitions": { ".btn": { … } } } },
//!   "themes": { "dark": { "extends": null, "tokens": { … }, "diff": { … } } }
//! }
//! ```
//!
//! With `rich` enabled each token becomes an object carrying its type,
//! description, usage notes and source file. Empty sections are omitted.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::dictionary::Dictionary;
use crate::extract::ComponentDefinition;
use crate::resolve::{ResolvedToken, ResolvedTokens};
use crate::theme::CompiledTheme;
use crate::value::Value;

pub const SCHEMA_VERSION: &str = "1.0";

/// Catalog shaping options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogOptions {
    pub rich: bool,
    /// Restrict to one top-level group.
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    pub meta: CatalogMeta,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tokens: BTreeMap<String, CatalogToken>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, CatalogComponent>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub themes: BTreeMap<String, CatalogTheme>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogMeta {
    pub schema_version: &'static str,
    pub generated_at: String,
    pub tool_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CatalogToken {
    Plain(Value),
    Rich(RichToken),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichToken {
    pub value: Value,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub usage: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avoid: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customizable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogComponent {
    pub classes: Vec<String>,
    /// Selector to declarations, values unresolved.
    pub definitions: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogTheme {
    pub extends: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tokens: ResolvedTokens,
    pub diff: ResolvedTokens,
}

impl Catalog {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Everything a catalog is projected from.
#[derive(Debug, Clone, Copy)]
pub struct CatalogSource<'a> {
    pub dictionary: &'a Dictionary,
    pub resolved: &'a ResolvedTokens,
    pub themes: &'a [CompiledTheme],
    pub components: &'a [ComponentDefinition],
}

/// Builds a catalog stamped with `generated_at`.
pub fn build_catalog(
    source: CatalogSource<'_>,
    options: &CatalogOptions,
    generated_at: DateTime<Utc>,
) -> Catalog {
    let in_category = |path: &str| match &options.category {
        Some(category) => path.split('.').next() == Some(category.as_str()),
        None => true,
    };

    let tokens = source
        .resolved
        .iter()
        .filter(|(path, _)| in_category(path))
        .map(|(path, token)| {
            let entry = if options.rich {
                CatalogToken::Rich(rich_token(source.dictionary, path, token))
            } else {
                CatalogToken::Plain(token.value.clone())
            };
            (path.clone(), entry)
        })
        .collect();

    let components = source
        .components
        .iter()
        .filter(|component| in_category(&component.path))
        .map(|component| (component.path.clone(), catalog_component(component)))
        .collect();

    let filter = |tokens: &ResolvedTokens| -> ResolvedTokens {
        tokens
            .iter()
            .filter(|(path, _)| in_category(path))
            .map(|(path, token)| (path.clone(), token.clone()))
            .collect()
    };
    let themes = source
        .themes
        .iter()
        .map(|theme| {
            (
                theme.name().to_string(),
                CatalogTheme {
                    extends: theme.info.extends.clone(),
                    description: theme.info.description.clone(),
                    tokens: filter(&theme.resolved),
                    diff: filter(&theme.diff),
                },
            )
        })
        .collect();

    Catalog {
        meta: CatalogMeta {
            schema_version: SCHEMA_VERSION,
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            tool_version: env!("CARGO_PKG_VERSION"),
            category: options.category.clone(),
        },
        tokens,
        components,
        themes,
    }
}

fn rich_token(dict: &Dictionary, path: &str, resolved: &ResolvedToken) -> RichToken {
    let token = dict.token(path);
    let meta = |key: &str| token.and_then(|t| t.meta(key)).cloned();
    RichToken {
        value: resolved.value.clone(),
        token_type: resolved.token_type.clone(),
        description: token.and_then(|t| t.description()).map(str::to_string),
        usage: match meta("$usage") {
            Some(Value::List(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::String(single)) => vec![single],
            _ => Vec::new(),
        },
        avoid: meta("$avoid"),
        deprecated: meta("$deprecated"),
        customizable: meta("$customizable").and_then(|v| v.as_bool()),
        source: dict.source_of(path).map(|p| p.display().to_string()),
    }
}

fn catalog_component(component: &ComponentDefinition) -> CatalogComponent {
    let mut definitions: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
    for rule in component.rules().filter(|rule| !rule.is_empty()) {
        definitions
            .entry(rule.selector.clone())
            .or_default()
            .extend(rule.declarations.clone());
    }
    CatalogComponent {
        classes: component.classes().into_iter().map(str::to_string).collect(),
        definitions,
        description: component.description.clone(),
        contains: component.contains.clone(),
        requires: component.requires.clone(),
    }
}
