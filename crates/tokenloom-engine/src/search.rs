//! Token search over a resolved map.
//!
//! A query is a case-insensitive substring, or a regular expression when
//! wrapped in slashes (`/^color\.(bg|fg)/`). It is matched against the
//! token path, its CSS value and its description.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::dictionary::Dictionary;
use crate::resolve::ResolvedTokens;
use crate::value::Value;

#[derive(Debug, Clone)]
pub enum Query {
    /// Lowercased needle.
    Substring(String),
    Pattern(Regex),
}

impl Query {
    pub fn parse(text: &str) -> Result<Self, regex::Error> {
        let trimmed = text.trim();
        match trimmed
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
        {
            Some(pattern) if !pattern.is_empty() => RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map(Query::Pattern),
            _ => Ok(Query::Substring(trimmed.to_lowercase())),
        }
    }

    pub fn matches(&self, haystack: &str) -> bool {
        match self {
            Query::Substring(needle) => haystack.to_lowercase().contains(needle.as_str()),
            Query::Pattern(regex) => regex.is_match(haystack),
        }
    }
}

/// Filters applied on top of the query.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Inferred `$type`.
    pub token_type: Option<String>,
    /// Top-level group.
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub path: String,
    pub value: Value,
    pub css_value: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Tokens matching `query` (every token when `None`) and `filters`, by path.
pub fn search(
    resolved: &ResolvedTokens,
    dict: &Dictionary,
    query: Option<&Query>,
    filters: &SearchFilters,
) -> Vec<SearchHit> {
    resolved
        .iter()
        .filter(|(path, token)| {
            let type_ok = filters
                .token_type
                .as_deref()
                .map_or(true, |wanted| token.token_type.as_deref() == Some(wanted));
            let category_ok = filters
                .category
                .as_deref()
                .map_or(true, |wanted| path.split('.').next() == Some(wanted));
            type_ok && category_ok
        })
        .filter_map(|(path, token)| {
            let css_value = token.css_value(path);
            let description = dict
                .token(path)
                .and_then(|t| t.description())
                .map(str::to_string);
            let matched = match query {
                None => true,
                Some(query) => {
                    query.matches(path)
                        || query.matches(&css_value)
                        || description.as_deref().is_some_and(|d| query.matches(d))
                }
            };
            matched.then(|| SearchHit {
                path: path.clone(),
                value: token.value.clone(),
                css_value,
                token_type: token.token_type.clone(),
                description,
            })
        })
        .collect()
}
