//! Theme inheritance.
//!
//! A theme is a partial dictionary that overrides base tokens. Its root may
//! declare:
//!
//! - `$extends: "<name>"`: the parent theme (absent means base)
//! - `$default: true`: emit this theme under `:root` as well
//! - `$description`
//!
//! The effective dictionary of a theme is base, then every ancestor from
//! the root-most down, then the theme itself, deep-merged in that order.

use std::collections::{BTreeMap, BTreeSet};

use crate::dictionary::Dictionary;
use crate::error::ThemeError;
use crate::resolve::ResolvedTokens;
use crate::value::Value;

/// Longest permitted `$extends` chain.
pub const MAX_EXTENDS_DEPTH: usize = 16;

/// Root-level facts about a theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeInfo {
    pub name: String,
    pub extends: Option<String>,
    pub description: Option<String>,
    /// Declared `$default: true`.
    pub declares_default: bool,
}

impl ThemeInfo {
    pub fn of(name: &str, theme: &Dictionary) -> Self {
        Self {
            name: name.to_string(),
            extends: theme.meta("$extends").and_then(Value::as_str).map(str::to_string),
            description: theme
                .meta("$description")
                .and_then(Value::as_str)
                .map(str::to_string),
            declares_default: theme.meta("$default").and_then(Value::as_bool) == Some(true),
        }
    }
}

/// A theme after inheritance and resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTheme {
    pub info: ThemeInfo,
    /// Full resolved map: base, ancestors and the theme's own overrides.
    pub resolved: ResolvedTokens,
    /// Entries of `resolved` that differ from base.
    pub diff: ResolvedTokens,
}

impl CompiledTheme {
    pub fn name(&self) -> &str {
        &self.info.name
    }
}

/// Ancestors of `name`, root-most first, followed by `name` itself.
pub fn inheritance_chain(
    name: &str,
    themes: &BTreeMap<String, Dictionary>,
) -> Result<Vec<String>, ThemeError> {
    let mut chain = vec![name.to_string()];
    let mut current = name.to_string();

    loop {
        let Some(theme) = themes.get(&current) else {
            break;
        };
        let Some(parent) = ThemeInfo::of(&current, theme).extends else {
            break;
        };
        if !themes.contains_key(&parent) {
            return Err(ThemeError::UnknownParent {
                theme: current,
                parent,
            });
        }
        if let Some(pos) = chain.iter().position(|seen| *seen == parent) {
            let mut cycle = chain[pos..].to_vec();
            cycle.push(parent);
            return Err(ThemeError::Cycle { chain: cycle });
        }
        if chain.len() > MAX_EXTENDS_DEPTH {
            return Err(ThemeError::TooDeep {
                theme: name.to_string(),
                limit: MAX_EXTENDS_DEPTH,
            });
        }
        chain.push(parent.clone());
        current = parent;
    }

    chain.reverse();
    Ok(chain)
}

/// Builds every theme's effective dictionary.
pub fn inherit(
    base: &Dictionary,
    themes: &BTreeMap<String, Dictionary>,
) -> Result<BTreeMap<String, Dictionary>, ThemeError> {
    let mut merged = BTreeMap::new();
    for name in themes.keys() {
        let chain = inheritance_chain(name, themes)?;
        let mut dict = base.clone();
        // Overriding base values is what a theme is for; those warnings are noise.
        let mut overrides = Vec::new();
        for link in &chain {
            if let Some(theme) = themes.get(link) {
                dict.merge(theme, &mut overrides);
            }
        }
        tracing::debug!(theme = %name, chain = ?chain, "inherited theme");
        merged.insert(name.clone(), dict);
    }
    Ok(merged)
}

/// Token paths visible to `name` before its own overrides: base plus every
/// ancestor theme.
pub fn inherited_paths(
    name: &str,
    base: &Dictionary,
    themes: &BTreeMap<String, Dictionary>,
) -> Result<BTreeSet<String>, ThemeError> {
    let mut paths = base.token_paths();
    for link in inheritance_chain(name, themes)? {
        if link == name {
            continue;
        }
        if let Some(theme) = themes.get(&link) {
            paths.extend(theme.token_paths());
        }
    }
    Ok(paths)
}

/// Picks the default theme.
///
/// A theme declaring `$default: true` wins; more than one is ambiguous.
/// Otherwise the theme named `configured` is used when it exists.
pub fn select_default(
    themes: &BTreeMap<String, Dictionary>,
    configured: Option<&str>,
) -> Result<Option<String>, ThemeError> {
    let declared: Vec<String> = themes
        .iter()
        .filter(|(name, theme)| ThemeInfo::of(name, theme).declares_default)
        .map(|(name, _)| name.clone())
        .collect();

    match declared.len() {
        0 => Ok(configured
            .filter(|name| themes.contains_key(*name))
            .map(str::to_string)),
        1 => Ok(declared.into_iter().next()),
        _ => Err(ThemeError::AmbiguousDefault { themes: declared }),
    }
}
