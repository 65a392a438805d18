//! Theme diffs.
//!
//! A theme only needs to emit what it changes. [`diff`] keeps the entries of
//! a resolved theme whose value differs from base, or that base lacks;
//! [`apply_diff`] is its inverse, so `apply_diff(base, diff(theme, base))`
//! reproduces `theme` whenever the theme's paths cover base.

use crate::resolve::ResolvedTokens;

/// Entries of `theme` that are new or changed relative to `base`.
///
/// Values compare structurally (scalars by value, lists element-wise).
/// The token type is not part of the comparison.
pub fn diff(theme: &ResolvedTokens, base: &ResolvedTokens) -> ResolvedTokens {
    theme
        .iter()
        .filter(|(path, token)| base.value(path) != Some(&token.value))
        .map(|(path, token)| (path.clone(), token.clone()))
        .collect()
}

/// Overlays `diff` on `base`.
pub fn apply_diff(base: &ResolvedTokens, diff: &ResolvedTokens) -> ResolvedTokens {
    let mut out = base.clone();
    for (path, token) in diff {
        out.insert(path.clone(), token.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ResolvedToken;
    use crate::value::Value;

    fn tokens(entries: &[(&str, Value)]) -> ResolvedTokens {
        entries
            .iter()
            .map(|(path, value)| (path.to_string(), ResolvedToken::new(value.clone(), None)))
            .collect()
    }

    #[test]
    fn test_diff_keeps_changed_and_added() {
        let base = tokens(&[("color.bg", "#fff".into()), ("color.fg", "#000".into())]);
        let theme = tokens(&[
            ("color.bg", "#000".into()),
            ("color.fg", "#000".into()),
            ("color.accent", "#f0f".into()),
        ]);
        let d = diff(&theme, &base);
        let paths: Vec<_> = d.iter().map(|(path, _)| path.as_str()).collect();
        assert_eq!(paths, vec!["color.accent", "color.bg"]);
    }

    #[test]
    fn test_diff_compares_lists_element_wise() {
        let base = tokens(&[("font", Value::List(vec!["Inter".into(), "serif".into()]))]);
        let same = tokens(&[("font", Value::List(vec!["Inter".into(), "serif".into()]))]);
        let other = tokens(&[("font", Value::List(vec!["Inter".into(), "sans".into()]))]);
        assert!(diff(&same, &base).is_empty());
        assert_eq!(diff(&other, &base).len(), 1);
    }

    #[test]
    fn test_numbers_compare_by_kind() {
        let base = tokens(&[("n", Value::Integer(1))]);
        let theme = tokens(&[("n", Value::Float(1.0))]);
        assert_eq!(diff(&theme, &base).len(), 1);
    }

    #[test]
    fn test_apply_diff_reproduces_theme() {
        let base = tokens(&[("a", 1i64.into()), ("b", 2i64.into())]);
        let theme = tokens(&[("a", 1i64.into()), ("b", 3i64.into()), ("c", 4i64.into())]);
        assert_eq!(apply_diff(&base, &diff(&theme, &base)), theme);
    }
}
