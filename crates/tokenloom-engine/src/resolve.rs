//! Alias resolution.
//!
//! [`resolve`] flattens a dictionary into [`ResolvedTokens`], a map from
//! dotted path to alias-free value. Tokens are evaluated in topological order
//! of the alias graph so every referent is final before it is used.
//!
//! # Substitution rules
//!
//! | Raw value | Result |
//! |-----------|--------|
//! | `"{spacing.base}"` (pure alias) | the referent's value *and* type, unchanged (numbers stay numbers) |
//! | `"1px solid {color.border}"` | referent serialised and spliced into the string |
//! | `["{font.base}", "serif"]` | element-wise; a list referent is flattened in place |
//! | `{"value": 4, "unit": "px"}` | `"4px"` (composite dimension/duration) |
//! | `{"hex": "#fff", …}` | `"#fff"` (composite color) |
//! | other objects | passed through untouched |
//! | numbers, booleans | passed through untouched |

use std::collections::BTreeMap;

use serde::Serialize;

use crate::alias;
use crate::css::serialize;
use crate::dictionary::Dictionary;
use crate::error::ResolveError;
use crate::graph::AliasGraph;
use crate::value::{format_number, Value};

/// A resolved token: final value plus inferred `$type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedToken {
    pub value: Value,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl ResolvedToken {
    pub fn new(value: impl Into<Value>, token_type: Option<&str>) -> Self {
        Self {
            value: value.into(),
            token_type: token_type.map(str::to_string),
        }
    }

    /// The value as it appears in a custom property declaration.
    pub fn css_value(&self, path: &str) -> String {
        serialize::token_value(&self.value, self.token_type.as_deref(), path)
    }
}

/// Flat map from dotted path to resolved token, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedTokens {
    tokens: BTreeMap<String, ResolvedToken>,
}

impl ResolvedTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&ResolvedToken> {
        self.tokens.get(path)
    }

    pub fn value(&self, path: &str) -> Option<&Value> {
        self.get(path).map(|t| &t.value)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.tokens.contains_key(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, token: ResolvedToken) {
        self.tokens.insert(path.into(), token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResolvedToken)> {
        self.tokens.iter()
    }
}

impl FromIterator<(String, ResolvedToken)> for ResolvedTokens {
    fn from_iter<I: IntoIterator<Item = (String, ResolvedToken)>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ResolvedTokens {
    type Item = (&'a String, &'a ResolvedToken);
    type IntoIter = std::collections::btree_map::Iter<'a, String, ResolvedToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Resolves every token in `dict`.
pub fn resolve(dict: &Dictionary) -> Result<ResolvedTokens, ResolveError> {
    let (graph, issues) = AliasGraph::from_dictionary(dict);
    if let Some(issue) = issues.into_iter().next() {
        return Err(issue);
    }
    resolve_with_graph(dict, &graph)
}

/// Resolves `dict` using a graph already built for it (by validation).
pub fn resolve_with_graph(
    dict: &Dictionary,
    graph: &AliasGraph,
) -> Result<ResolvedTokens, ResolveError> {
    let records: BTreeMap<String, (&Value, Option<&str>)> = dict
        .tokens()
        .into_iter()
        .map(|entry| (entry.path, (&entry.token.value, entry.inferred_type)))
        .collect();

    let order = graph
        .topological_order()
        .map_err(|cycles| {
            cycles
                .into_iter()
                .next()
                .unwrap_or(ResolveError::Cycle { cycle: Vec::new() })
        })?;

    let mut resolved = ResolvedTokens::new();
    for path in order {
        let Some(&(raw, token_type)) = records.get(path) else {
            continue;
        };
        let token = resolve_token(path, raw, token_type, &resolved)?;
        resolved.insert(path, token);
    }

    tracing::debug!(tokens = resolved.len(), "resolved dictionary");
    Ok(resolved)
}

fn resolve_token(
    path: &str,
    raw: &Value,
    token_type: Option<&str>,
    resolved: &ResolvedTokens,
) -> Result<ResolvedToken, ResolveError> {
    if let Some(target) = raw.as_str().and_then(alias::pure_alias) {
        let referent = lookup(path, target, resolved)?;
        return Ok(ResolvedToken {
            value: referent.value.clone(),
            token_type: token_type
                .map(str::to_string)
                .or_else(|| referent.token_type.clone()),
        });
    }
    let value = resolve_value(path, raw, resolved)?;
    Ok(ResolvedToken::new(normalize_composite(token_type, value), token_type))
}

/// Substitutes aliases inside `raw` against already-resolved tokens.
///
/// Also used for `$responsive` overrides and component properties, which
/// are resolved against the finished base map.
pub fn resolve_value(path: &str, raw: &Value, resolved: &ResolvedTokens) -> Result<Value, ResolveError> {
    match raw {
        Value::String(text) => {
            if let Some(target) = alias::pure_alias(text) {
                return Ok(lookup(path, target, resolved)?.value.clone());
            }
            let refs = alias::parse_aliases(text).map_err(|reason| ResolveError::MalformedAlias {
                path: path.to_string(),
                value: text.clone(),
                reason,
            })?;
            if refs.is_empty() {
                return Ok(raw.clone());
            }
            let spliced = alias::splice(text, &refs, |target| {
                lookup(path, target, resolved).map(|token| token.css_value(target))
            })?;
            Ok(Value::String(spliced))
        }
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str().and_then(alias::pure_alias) {
                    Some(target) => match &lookup(path, target, resolved)?.value {
                        Value::List(inner) => out.extend(inner.iter().cloned()),
                        other => out.push(other.clone()),
                    },
                    None => out.push(resolve_value(path, item, resolved)?),
                }
            }
            Ok(Value::List(out))
        }
        other => Ok(other.clone()),
    }
}

fn lookup<'r>(
    path: &str,
    target: &str,
    resolved: &'r ResolvedTokens,
) -> Result<&'r ResolvedToken, ResolveError> {
    resolved
        .get(target)
        .ok_or_else(|| ResolveError::UndefinedReference {
            path: path.to_string(),
            target: target.to_string(),
        })
}

/// Collapses W3C object-form values into their CSS string.
pub fn normalize_composite(token_type: Option<&str>, value: Value) -> Value {
    if let Value::Map(map) = &value {
        if let Some(text) = composite_string(token_type, map) {
            return Value::String(text);
        }
    }
    value
}

fn composite_string(token_type: Option<&str>, map: &BTreeMap<String, Value>) -> Option<String> {
    let measure = || {
        let number = map.get("value").and_then(Value::as_f64)?;
        let unit = map.get("unit").and_then(Value::as_str)?;
        Some(format!("{}{}", format_number(number), unit))
    };
    let hex = || map.get("hex").and_then(Value::as_str).map(str::to_string);
    match token_type {
        Some("dimension") | Some("duration") => measure(),
        Some("color") => hex(),
        None => measure().or_else(hex),
        Some(_) => None,
    }
}
