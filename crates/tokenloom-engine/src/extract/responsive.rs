//! Breakpoints and responsive token overrides.
//!
//! Breakpoints are the tokens of the top-level `breakpoint` (or
//! `breakpoints`) group. A token overrides its value per breakpoint with
//! `$responsive`:
//!
//! ```json
//! "breakpoint": { "md": { "$value": "768px" }, "lg": { "$value": "64rem" } },
//! "space": { "gutter": { "$value": "1rem", "$responsive": { "md": "1.5rem", "lg": "{space.xl}" } } }
//! ```
//!
//! Breakpoints sort by their pixel width (`rem`/`em` count as 16px); widths
//! that cannot be converted sort last, by name.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::alias::custom_property_name;
use crate::css::literal;
use crate::dictionary::{Dictionary, Node};
use crate::error::ResolveError;
use crate::resolve::{normalize_composite, resolve_value, ResolvedTokens};
use crate::value::Value;

const BREAKPOINT_GROUPS: &[&str] = &["breakpoint", "breakpoints"];

#[derive(Debug, Clone, PartialEq)]
pub struct Breakpoint {
    pub name: String,
    /// The `min-width` value as written (after resolution, when available).
    pub value: String,
    pub min_width_px: Option<f64>,
}

/// A token with per-breakpoint values, resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsiveToken {
    pub path: String,
    pub token_type: Option<String>,
    /// Breakpoint name to override value.
    pub overrides: BTreeMap<String, Value>,
}

impl ResponsiveToken {
    pub fn custom_property(&self) -> String {
        custom_property_name(&self.path)
    }
}

/// Breakpoints declared in `dict`, smallest first. Values come from the raw
/// dictionary; see [`resolved_breakpoints`] for aliased widths.
pub fn breakpoints(dict: &Dictionary) -> Vec<Breakpoint> {
    collect_breakpoints(dict, None)
}

/// Breakpoints with widths taken from `resolved`.
pub fn resolved_breakpoints(dict: &Dictionary, resolved: &ResolvedTokens) -> Vec<Breakpoint> {
    collect_breakpoints(dict, Some(resolved))
}

fn collect_breakpoints(dict: &Dictionary, resolved: Option<&ResolvedTokens>) -> Vec<Breakpoint> {
    // First group wins when a name appears in both.
    let mut by_name: BTreeMap<String, Breakpoint> = BTreeMap::new();
    for group_key in BREAKPOINT_GROUPS {
        let Some(Node::Group(group)) = dict.root().get(group_key) else {
            continue;
        };
        for (name, node) in &group.children {
            let Node::Token(token) = node else {
                continue;
            };
            let path = format!("{}.{}", group_key, name);
            let value = resolved
                .and_then(|r| r.get(&path))
                .map(|t| t.value.to_css_string())
                .unwrap_or_else(|| token.value.to_css_string());
            by_name.entry(name.clone()).or_insert_with(|| Breakpoint {
                name: name.clone(),
                min_width_px: literal::to_pixels(&value),
                value,
            });
        }
    }
    let mut out: Vec<Breakpoint> = by_name.into_values().collect();
    out.sort_by(compare_breakpoints);
    out
}

fn compare_breakpoints(a: &Breakpoint, b: &Breakpoint) -> Ordering {
    match (a.min_width_px, b.min_width_px) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    }
}

/// Tokens carrying `$responsive`, with override values resolved against the
/// base map. Overrides naming unknown breakpoints are dropped; the validator
/// reports them.
pub fn extract_responsive(
    dict: &Dictionary,
    resolved: &ResolvedTokens,
    breakpoints: &[Breakpoint],
) -> Result<Vec<ResponsiveToken>, ResolveError> {
    let mut out = Vec::new();
    for entry in dict.tokens() {
        let Some(Value::Map(raw)) = entry.token.meta("$responsive") else {
            continue;
        };
        let token_type = resolved
            .get(&entry.path)
            .and_then(|t| t.token_type.clone())
            .or_else(|| entry.inferred_type.map(str::to_string));

        let mut overrides = BTreeMap::new();
        for (name, value) in raw {
            if !breakpoints.iter().any(|bp| &bp.name == name) {
                continue;
            }
            let value = resolve_value(&entry.path, value, resolved)?;
            overrides.insert(name.clone(), normalize_composite(token_type.as_deref(), value));
        }
        if !overrides.is_empty() {
            out.push(ResponsiveToken {
                path: entry.path,
                token_type,
                overrides,
            });
        }
    }
    Ok(out)
}
