//! Alias syntax.
//!
//! An alias is `{dotted.path}` anywhere inside a string value. A value that
//! is exactly one alias (`"{color.blue}"`) is a *pure* alias; anything else
//! (`"1px solid {color.border}"`) embeds aliases in surrounding text.
//!
//! Braces must balance: `{`, `}` and `{}` on their own are malformed, as are
//! nested braces and paths with empty segments or whitespace.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ALIAS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}\s]+)\}").expect("alias pattern is a valid regex"));

/// One `{path}` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRef<'a> {
    pub path: &'a str,
    /// Byte range of the whole `{path}` occurrence.
    pub range: Range<usize>,
}

/// Extracts every alias, rejecting malformed brace syntax.
pub fn parse_aliases(value: &str) -> Result<Vec<AliasRef<'_>>, String> {
    let mut refs = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = value[cursor..].find(['{', '}']) {
        let start = cursor + offset;
        if value[start..].starts_with('}') {
            return Err(format!("unmatched '}}' at byte {}", start));
        }
        let inner_start = start + 1;
        let close = value[inner_start..]
            .find(['{', '}'])
            .map(|o| inner_start + o)
            .ok_or_else(|| format!("unclosed '{{' at byte {}", start))?;
        if value[close..].starts_with('{') {
            return Err(format!("nested '{{' at byte {}", close));
        }
        let path = &value[inner_start..close];
        validate_alias_path(path)?;
        refs.push(AliasRef {
            path,
            range: start..close + 1,
        });
        cursor = close + 1;
    }

    Ok(refs)
}

fn validate_alias_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("empty alias '{}'".to_string());
    }
    if path.chars().any(char::is_whitespace) {
        return Err(format!("alias '{{{}}}' contains whitespace", path));
    }
    if path.split('.').any(str::is_empty) {
        return Err(format!("alias '{{{}}}' has an empty path segment", path));
    }
    Ok(())
}

pub fn has_alias(value: &str) -> bool {
    ALIAS_PATTERN.is_match(value)
}

/// Returns the referenced path when `value` is exactly one alias.
pub fn pure_alias(value: &str) -> Option<&str> {
    let inner = value.strip_prefix('{')?.strip_suffix('}')?;
    if inner.is_empty() || inner.contains(['{', '}']) || validate_alias_path(inner).is_err() {
        return None;
    }
    Some(inner)
}

/// Replaces every alias using `lookup`, which receives the referenced path.
pub fn splice<E>(
    value: &str,
    refs: &[AliasRef<'_>],
    mut lookup: impl FnMut(&str) -> Result<String, E>,
) -> Result<String, E> {
    let mut out = String::with_capacity(value.len());
    let mut cursor = 0;
    for alias in refs {
        out.push_str(&value[cursor..alias.range.start]);
        out.push_str(&lookup(alias.path)?);
        cursor = alias.range.end;
    }
    out.push_str(&value[cursor..]);
    Ok(out)
}

/// `color.brand.primary` -> `--color-brand-primary`.
pub fn custom_property_name(path: &str) -> String {
    let mut name = String::with_capacity(path.len() + 2);
    name.push_str("--");
    for ch in path.chars() {
        if ch == '.' || ch.is_whitespace() {
            name.push('-');
        } else {
            name.push(ch);
        }
    }
    name
}

/// Rewrites `{a.b}` occurrences into `var(--a-b)`.
pub fn rewrite_to_var(value: &str) -> String {
    ALIAS_PATTERN
        .replace_all(value, |caps: &Captures<'_>| {
            format!("var({})", custom_property_name(&caps[1]))
        })
        .into_owned()
}
