//! Typed custom properties (`@property`).
//!
//! A token opts in with `$property: true`, or `$property: {"inherits": false}`
//! to control inheritance. Only types with a CSS syntax are registered:
//!
//! | `$type` | syntax |
//! |---------|--------|
//! | `color` | `<color>` |
//! | `dimension` | `<length>` |
//! | `number` | `<number>` |
//! | `duration` | `<time>` |
//! | `effect` | `<integer>` |

use crate::alias::custom_property_name;
use crate::dictionary::Dictionary;
use crate::resolve::ResolvedTokens;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyToken {
    pub path: String,
    /// Custom property name, `--a-b`.
    pub name: String,
    pub syntax: &'static str,
    pub inherits: bool,
    pub initial_value: String,
}

/// CSS syntax string for a token type.
pub fn css_syntax(token_type: &str) -> Option<&'static str> {
    match token_type {
        "color" => Some("<color>"),
        "dimension" => Some("<length>"),
        "number" => Some("<number>"),
        "duration" => Some("<time>"),
        "effect" => Some("<integer>"),
        _ => None,
    }
}

/// Registered properties, sorted by path.
pub fn extract_properties(dict: &Dictionary, resolved: &ResolvedTokens) -> Vec<PropertyToken> {
    let mut out = Vec::new();
    for entry in dict.tokens() {
        let inherits = match entry.token.meta("$property") {
            Some(Value::Bool(true)) => true,
            Some(Value::Map(options)) => options
                .get("inherits")
                .and_then(Value::as_bool)
                .unwrap_or(true),
            _ => continue,
        };
        let Some(token) = resolved.get(&entry.path) else {
            continue;
        };
        let token_type = token.token_type.as_deref().or(entry.inferred_type);
        let Some(syntax) = token_type.and_then(css_syntax) else {
            tracing::debug!(path = %entry.path, ?token_type, "no @property syntax for type");
            continue;
        };
        if !token.value.is_scalar() {
            tracing::debug!(path = %entry.path, "skipping @property with a non-scalar value");
            continue;
        }
        out.push(PropertyToken {
            name: custom_property_name(&entry.path),
            syntax,
            inherits,
            initial_value: token.value.to_css_string(),
            path: entry.path,
        });
    }
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve;
    use serde_json::json;

    fn extract(json: serde_json::Value) -> Vec<PropertyToken> {
        let dict = Dictionary::from_json(&json, None).unwrap();
        let resolved = resolve(&dict).unwrap();
        extract_properties(&dict, &resolved)
    }

    #[test]
    fn test_opted_in_tokens_are_registered() {
        let props = extract(json!({
            "color": {"$type": "color", "brand": {"$value": "#3b82f6", "$property": true}, "plain": {"$value": "#000"}},
            "ratio": {"$type": "number", "$value": 1.0, "$property": {"inherits": false}}
        }));
        assert_eq!(
            props,
            vec![
                PropertyToken {
                    path: "color.brand".into(),
                    name: "--color-brand".into(),
                    syntax: "<color>",
                    inherits: true,
                    initial_value: "#3b82f6".into(),
                },
                PropertyToken {
                    path: "ratio".into(),
                    name: "--ratio".into(),
                    syntax: "<number>",
                    inherits: false,
                    initial_value: "1".into(),
                },
            ]
        );
    }

    #[test]
    fn test_alias_initial_value_is_resolved() {
        let props = extract(json!({
            "space": {"$type": "dimension", "base": {"$value": "4px"}, "gap": {"$value": "{space.base}", "$property": true}}
        }));
        assert_eq!(props[0].initial_value, "4px");
        assert_eq!(props[0].syntax, "<length>");
    }

    #[test]
    fn test_unknown_types_are_skipped() {
        let props = extract(json!({
            "font": {"$type": "fontFamily", "body": {"$value": "Inter", "$property": true}},
            "untyped": {"$value": "x", "$property": true}
        }));
        assert!(props.is_empty());
    }
}
