//! `$scale` expansion.
//!
//! A group may declare a generator instead of listing its tokens one by one:
//!
//! ```json
//! "spacing": { "$type": "dimension", "$scale": { "base": "0.25rem", "multipliers": [0, 0.5, 1, 2] } }
//! "radius":  { "$type": "dimension", "$scale": { "base": 4, "unit": "px", "multipliers": { "sm": 1, "md": 2 } } }
//! "weight":  { "$type": "fontWeight", "$scale": { "steps": { "regular": 400, "bold": 700 } } }
//! ```
//!
//! Expansion replaces `$scale` with one token per step. Array multipliers
//! name steps after the multiplier (`0.5` becomes `0_5`). A pure-alias base
//! produces `calc({alias} * m)` so the relationship survives into CSS.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::alias;
use crate::dictionary::{join_path, Dictionary, Group, Node, Token};
use crate::error::ScaleError;
use crate::value::{format_number, round4, Value};

const SCALE_KEY: &str = "$scale";

static DIMENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?(?:\d+\.?\d*|\.\d+))([a-zA-Z%]*)$").expect("dimension pattern is a valid regex")
});

/// Expands every `$scale` group in `dict`, returning one error per rejected scale.
///
/// Rejected scales are left out of the dictionary entirely.
pub fn expand(dict: &mut Dictionary) -> Vec<ScaleError> {
    let mut errors = Vec::new();
    let mut generated = Vec::new();
    expand_group(dict.root_mut(), "", &mut errors, &mut generated);

    for (group_path, leaf) in generated {
        // Attribute generated tokens to whichever file defined a sibling, if any.
        let prefix = format!("{}.", group_path);
        let sibling_source = dict
            .sources()
            .iter()
            .find(|(path, _)| path.starts_with(&prefix))
            .map(|(_, file)| file.clone());
        if let Some(file) = sibling_source {
            dict.record_source(leaf, file);
        }
    }

    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "rejected $scale definitions");
    }
    errors
}

fn expand_group(
    group: &mut Group,
    prefix: &str,
    errors: &mut Vec<ScaleError>,
    generated: &mut Vec<(String, String)>,
) {
    if let Some(spec) = group.meta.remove(SCALE_KEY) {
        match generate_steps(&spec) {
            Ok(steps) => {
                let token_type = group.declared_type().map(str::to_string);
                let collisions: Vec<&String> = steps
                    .keys()
                    .filter(|name| group.children.contains_key(*name))
                    .collect();
                if collisions.is_empty() {
                    for (name, value) in steps {
                        let mut token = Token::new(value);
                        if let Some(ty) = &token_type {
                            token = token.with_meta("$type", ty.as_str());
                        }
                        generated.push((prefix.to_string(), join_path(prefix, &name)));
                        group.children.insert(name, Node::Token(token));
                    }
                } else {
                    let names: Vec<&str> = collisions.iter().map(|s| s.as_str()).collect();
                    errors.push(scale_error(
                        prefix,
                        format!("generated step(s) {} collide with existing keys", names.join(", ")),
                    ));
                }
            }
            Err(message) => errors.push(scale_error(prefix, message)),
        }
    }

    for (key, child) in group.children.iter_mut() {
        if let Node::Group(child) = child {
            expand_group(child, &join_path(prefix, key), errors, generated);
        }
    }
}

fn scale_error(path: &str, message: impl Into<String>) -> ScaleError {
    ScaleError {
        path: if path.is_empty() { "(root)".to_string() } else { path.to_string() },
        message: message.into(),
    }
}

/// Computes step name to value for one `$scale` definition.
fn generate_steps(spec: &Value) -> Result<BTreeMap<String, Value>, String> {
    let spec = spec.as_map().ok_or("expected an object")?;
    let steps = spec.get("steps");
    let base = spec.get("base");

    match (steps, base) {
        (Some(_), Some(_)) => Err("declare either 'steps' or 'base', not both".to_string()),
        (None, None) => Err("missing 'steps' or 'base'".to_string()),
        (Some(steps), None) => {
            let steps = steps.as_map().ok_or("'steps' must be an object")?;
            if steps.is_empty() {
                return Err("'steps' is empty".to_string());
            }
            Ok(steps.clone())
        }
        (None, Some(base)) => {
            let base = Base::parse(base, spec.get("unit"))?;
            let multipliers = spec
                .get("multipliers")
                .ok_or("'base' requires 'multipliers'")?;
            let named = named_multipliers(multipliers)?;
            Ok(named
                .into_iter()
                .map(|(name, m)| (name, base.times(m)))
                .collect())
        }
    }
}

fn named_multipliers(multipliers: &Value) -> Result<Vec<(String, f64)>, String> {
    let non_numeric = |v: &Value| format!("multiplier {} is not a number", v);
    match multipliers {
        Value::List(items) if !items.is_empty() => items
            .iter()
            .map(|item| {
                let m = item.as_f64().ok_or_else(|| non_numeric(item))?;
                Ok((format_number(m).replace('.', "_"), m))
            })
            .collect(),
        Value::Map(map) if !map.is_empty() => map
            .iter()
            .map(|(name, item)| {
                let m = item.as_f64().ok_or_else(|| non_numeric(item))?;
                Ok((name.clone(), m))
            })
            .collect(),
        _ => Err("'multipliers' must be a non-empty array or object".to_string()),
    }
}

enum Base {
    Number(f64),
    Dimension(f64, String),
    Alias(String),
}

impl Base {
    fn parse(base: &Value, unit: Option<&Value>) -> Result<Self, String> {
        let unit = match unit {
            Some(u) => Some(u.as_str().ok_or("'unit' must be a string")?),
            None => None,
        };
        match (base, unit) {
            (v, Some(unit)) if v.is_number() => {
                Ok(Base::Dimension(v.as_f64().unwrap_or_default(), unit.to_string()))
            }
            (v, None) if v.is_number() => Ok(Base::Number(v.as_f64().unwrap_or_default())),
            (Value::String(s), _) => {
                if let Some(target) = alias::pure_alias(s) {
                    return Ok(Base::Alias(target.to_string()));
                }
                let caps = DIMENSION
                    .captures(s.trim())
                    .ok_or_else(|| format!("base {:?} is not a number, dimension or alias", s))?;
                let n: f64 = caps[1]
                    .parse()
                    .map_err(|_| format!("base {:?} is not a number", s))?;
                Ok(Base::Dimension(n, caps[2].to_string()))
            }
            (other, _) => Err(format!("base {} is not a number, dimension or alias", other)),
        }
    }

    fn times(&self, m: f64) -> Value {
        match self {
            Base::Number(n) => {
                let product = round4(n * m);
                if product.fract() == 0.0 && product.abs() < 1e15 {
                    Value::Integer(product as i64)
                } else {
                    Value::Float(product)
                }
            }
            Base::Dimension(n, unit) => {
                let product = round4(n * m);
                if product == 0.0 {
                    Value::from("0")
                } else {
                    Value::from(format!("{}{}", format_number(product), unit))
                }
            }
            Base::Alias(target) => Value::from(format!("calc({{{}}} * {})", target, format_number(m))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expand_json(json: serde_json::Value) -> (Dictionary, Vec<ScaleError>) {
        let mut dict = Dictionary::from_json(&json, None).unwrap();
        let errors = expand(&mut dict);
        (dict, errors)
    }

    fn value_at<'a>(dict: &'a Dictionary, path: &str) -> &'a Value {
        &dict.token(path).unwrap().value
    }

    // =========================================================================
    // Generators
    // =========================================================================

    #[test]
    fn test_dimension_base_with_array_multipliers() {
        let (dict, errors) = expand_json(json!({
            "spacing": {"$type": "dimension", "$scale": {"base": "0.25rem", "multipliers": [0, 0.5, 1, 2, 4]}}
        }));
        assert!(errors.is_empty());
        assert_eq!(value_at(&dict, "spacing.0"), &Value::from("0"));
        assert_eq!(value_at(&dict, "spacing.0_5"), &Value::from("0.125rem"));
        assert_eq!(value_at(&dict, "spacing.1"), &Value::from("0.25rem"));
        assert_eq!(value_at(&dict, "spacing.4"), &Value::from("1rem"));
        assert_eq!(
            dict.token("spacing.2").unwrap().declared_type(),
            Some("dimension")
        );
        assert!(dict.get("spacing").unwrap().as_group().unwrap().meta("$scale").is_none());
    }

    #[test]
    fn test_numeric_base_with_unit_and_named_multipliers() {
        let (dict, errors) = expand_json(json!({
            "radius": {"$scale": {"base": 4, "unit": "px", "multipliers": {"sm": 1, "md": 2, "lg": 2.5}}}
        }));
        assert!(errors.is_empty());
        assert_eq!(value_at(&dict, "radius.sm"), &Value::from("4px"));
        assert_eq!(value_at(&dict, "radius.lg"), &Value::from("10px"));
    }

    #[test]
    fn test_unitless_base_stays_numeric() {
        let (dict, _) = expand_json(json!({
            "ratio": {"$scale": {"base": 1.5, "multipliers": [1, 2]}}
        }));
        assert_eq!(value_at(&dict, "ratio.1"), &Value::Float(1.5));
        assert_eq!(value_at(&dict, "ratio.2"), &Value::Integer(3));
    }

    #[test]
    fn test_alias_base_produces_calc() {
        let (dict, errors) = expand_json(json!({
            "space": {"$scale": {"base": "{spacing.unit}", "multipliers": [2]}}
        }));
        assert!(errors.is_empty());
        assert_eq!(value_at(&dict, "space.2"), &Value::from("calc({spacing.unit} * 2)"));
    }

    #[test]
    fn test_steps_are_verbatim() {
        let (dict, errors) = expand_json(json!({
            "weight": {"$type": "fontWeight", "$scale": {"steps": {"regular": 400, "bold": 700}}}
        }));
        assert!(errors.is_empty());
        assert_eq!(value_at(&dict, "weight.bold"), &Value::Integer(700));
    }

    #[test]
    fn test_nested_scale_groups_expand() {
        let (dict, _) = expand_json(json!({
            "size": {"icon": {"$scale": {"steps": {"sm": "1rem"}}}}
        }));
        assert!(dict.contains_token("size.icon.sm"));
    }

    // =========================================================================
    // Rejections
    // =========================================================================

    #[test]
    fn test_both_generators_rejected() {
        let (_, errors) = expand_json(json!({
            "x": {"$scale": {"steps": {"a": 1}, "base": 1, "multipliers": [1]}}
        }));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "x");
    }

    #[test]
    fn test_non_numeric_multiplier_rejected() {
        let (_, errors) = expand_json(json!({
            "x": {"$scale": {"base": "1rem", "multipliers": [1, "two"]}}
        }));
        assert!(errors[0].message.contains("not a number"));
    }

    #[test]
    fn test_bad_base_rejected() {
        let (_, errors) = expand_json(json!({
            "x": {"$scale": {"base": "large", "multipliers": [1]}}
        }));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_collision_with_existing_sibling_rejected() {
        let (dict, errors) = expand_json(json!({
            "x": {"1": {"$value": "9px"}, "$scale": {"base": "1px", "multipliers": [1, 2]}}
        }));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("collide"));
        assert_eq!(value_at(&dict, "x.1"), &Value::from("9px"));
        assert!(!dict.contains_token("x.2"));
    }
}
