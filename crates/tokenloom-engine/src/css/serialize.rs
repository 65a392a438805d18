//! Value serialisation for CSS declarations.
//!
//! Scalars render verbatim, numbers minimally. Lists need a separator, and
//! the right one depends on the property: `margin: 1rem 2rem` but
//! `font-family: Inter, sans-serif`. Properties whose list form is
//! space-separated are listed in [`SPACE_SEPARATED`]; everything else,
//! including unknown properties, joins with `", "`.

use crate::alias;
use crate::value::{format_number, Value};

/// Properties (and property families, by prefix) whose lists join with a space.
pub const SPACE_SEPARATED: &[&str] = &[
    "margin",
    "padding",
    "border",
    "outline",
    "inset",
    "grid-template",
    "grid-area",
    "grid-row",
    "grid-column",
    "gap",
    "row-gap",
    "column-gap",
    "flex",
    "background-position",
    "background-size",
    "text-decoration",
    "font",
    "clip-path",
];

/// Exact matches only; these must not swallow `font-family` and friends.
const EXACT_ONLY: &[&str] = &["font", "gap", "flex", "background-position", "background-size"];

const VENDOR_PREFIXES: &[&str] = &["-webkit-", "-moz-", "-ms-", "-o-"];

/// Separator for list values of `property`.
pub fn list_separator(property: &str) -> &'static str {
    let lower = property.trim().to_ascii_lowercase();
    let name = VENDOR_PREFIXES
        .iter()
        .find_map(|prefix| lower.strip_prefix(prefix))
        .unwrap_or(&lower);

    let space = SPACE_SEPARATED.iter().any(|candidate| {
        if EXACT_ONLY.contains(candidate) {
            name == *candidate || is_flex_longhand(name, candidate)
        } else {
            name == *candidate || name.starts_with(&format!("{}-", candidate))
        }
    });
    if space {
        " "
    } else {
        ", "
    }
}

/// `flex-flow` lists are space-separated; `flex-direction` and the rest are single values.
fn is_flex_longhand(name: &str, candidate: &str) -> bool {
    candidate == "flex" && name == "flex-flow"
}

/// Renders a component or keyframe declaration value, rewriting aliases
/// to `var(--…)`.
pub fn property_value(property: &str, value: &Value) -> String {
    let text = match value {
        Value::List(_) => value.join(list_separator(property)),
        other => other.to_css_string(),
    };
    alias::rewrite_to_var(&text)
}

/// Renders a resolved token for a custom property declaration.
///
/// Lists take their separator from the token type, falling back to the last
/// path segment read as a property name (`spacing.padding` joins like `padding`).
pub fn token_value(value: &Value, token_type: Option<&str>, path: &str) -> String {
    let Value::List(items) = value else {
        return value.to_css_string();
    };
    match token_type {
        Some("cubicBezier") => {
            let coords: Vec<String> = items
                .iter()
                .map(|item| match item.as_f64() {
                    Some(n) => format_number(n),
                    None => item.to_css_string(),
                })
                .collect();
            format!("cubic-bezier({})", coords.join(", "))
        }
        Some("dimension") => value.join(" "),
        Some("fontFamily") | Some("shadow") | Some("transition") => value.join(", "),
        _ => {
            let property = path.rsplit('.').next().unwrap_or(path);
            value.join(list_separator(property))
        }
    }
}
