//! Seed scenarios: literal inputs with known observable output.

use std::collections::BTreeMap;

use serde_json::json;
use tokenloom_engine::css::property_value;
use tokenloom_engine::{
    resolve, validate, Config, DiagnosticKind, Dictionary, Project, ResolveError,
    TokenError, ValidationOptions, Value,
};

fn dict(json: serde_json::Value) -> Dictionary {
    Dictionary::from_json(&json, None).unwrap()
}

fn themes(entries: Vec<(&str, serde_json::Value)>) -> BTreeMap<String, Dictionary> {
    entries
        .into_iter()
        .map(|(name, json)| (name.to_string(), dict(json)))
        .collect()
}

/// Text of the rule whose selector line is exactly `selector {`.
fn rule_body<'a>(css: &'a str, selector: &str) -> Vec<&'a str> {
    let header = format!("{} {{", selector);
    let mut lines = css.lines().skip_while(|line| line.trim() != header);
    lines.next().expect("rule present");
    lines
        .take_while(|line| line.trim() != "}")
        .map(str::trim)
        .collect()
}

#[test]
fn s1_alias_chain() {
    let d = dict(json!({
        "color": {
            "blue": {"$value": "#3b82f6"},
            "primary": {"$value": "{color.blue}"},
            "brand": {"$value": "{color.primary}"}
        }
    }));
    let resolved = resolve(&d).unwrap();
    assert_eq!(resolved.value("color.brand"), Some(&Value::from("#3b82f6")));
}

#[test]
fn s2_pure_number_alias() {
    let d = dict(json!({
        "spacing": {
            "$type": "number",
            "base": {"$value": 4},
            "double": {"$value": "{spacing.base}"}
        }
    }));
    let resolved = resolve(&d).unwrap();
    assert_eq!(resolved.value("spacing.double"), Some(&Value::Integer(4)));
    assert_eq!(
        resolved.get("spacing.double").unwrap().token_type.as_deref(),
        Some("number")
    );
}

#[test]
fn s3_theme_diff() {
    let config = Config {
        allow_theme_additions: true,
        ..Config::default()
    };
    let project = Project::from_parts(
        dict(json!({"color": {"bg": {"$value": "#fff"}}})),
        themes(vec![(
            "dark",
            json!({"color": {"bg": {"$value": "#000"}, "fg": {"$value": "#fff"}}}),
        )]),
        &config,
    );
    let css = project.compile(&mut Vec::new()).unwrap().to_css();
    assert_eq!(
        rule_body(&css, "[data-theme=\"dark\"]"),
        vec!["--color-bg: #000;", "--color-fg: #fff;"]
    );
}

#[test]
fn s4_property_serialisation() {
    let margin = Value::List(vec!["1rem".into(), "2rem".into()]);
    let fonts = Value::List(vec!["Inter".into(), "sans-serif".into()]);
    assert_eq!(format!("margin: {};", property_value("margin", &margin)), "margin: 1rem 2rem;");
    assert_eq!(
        format!("font-family: {};", property_value("font-family", &fonts)),
        "font-family: Inter, sans-serif;"
    );

    let project = Project::from_parts(
        dict(json!({
            "card": {
                "$class": "card",
                "margin": ["1rem", "2rem"],
                "fontFamily": ["Inter", "sans-serif"]
            }
        })),
        BTreeMap::new(),
        &Config::default(),
    );
    let css = project.compile(&mut Vec::new()).unwrap().to_css();
    assert_eq!(
        rule_body(&css, ".card"),
        vec!["font-family: Inter, sans-serif;", "margin: 1rem 2rem;"]
    );
}

#[test]
fn s5_cycle() {
    let d = dict(json!({"a": {"$value": "{b}"}, "b": {"$value": "{a}"}}));

    let report = validate(&d, ValidationOptions::default());
    let cycles: Vec<_> = report
        .errors()
        .filter(|diag| diag.kind == DiagnosticKind::Cycle)
        .collect();
    assert_eq!(cycles.len(), 1);
    assert!(cycles[0].message.contains("a -> b -> a"));

    assert_eq!(
        resolve(&d).unwrap_err(),
        ResolveError::Cycle {
            cycle: vec!["a".into(), "b".into(), "a".into()]
        }
    );
}

#[test]
fn s6_default_theme_first() {
    let project = Project::from_parts(
        dict(json!({"color": {"bg": {"$value": "#eee"}}})),
        themes(vec![
            ("dark", json!({"color": {"bg": {"$value": "#000"}}})),
            ("light", json!({"color": {"bg": {"$value": "#fff"}}})),
        ]),
        &Config::default(),
    );
    let css = project.compile(&mut Vec::new()).unwrap().to_css();
    let light = css.find(":root, [data-theme=\"light\"] {").unwrap();
    let dark = css.find("[data-theme=\"dark\"] {").unwrap();
    assert!(light < dark);
}

#[test]
fn theme_closing_a_cycle_through_base_fails_validation() {
    let project = Project::from_parts(
        dict(json!({"a": {"$value": "{c}"}, "c": {"$value": "#fff"}})),
        themes(vec![("dark", json!({"c": {"$value": "{a}"}}))]),
        &Config::default(),
    );

    let report = project.validate();
    assert!(report
        .errors()
        .any(|diag| diag.kind == DiagnosticKind::Cycle && diag.message.contains("a -> c -> a")));

    match project.compile(&mut Vec::new()) {
        Err(TokenError::Validation { errors, .. }) => assert_eq!(errors, report.error_count()),
        other => panic!("expected a validation failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn responsive_reference_errors_fail_validation() {
    let project = Project::from_parts(
        dict(json!({
            "breakpoint": {"md": {"$value": "768px"}},
            "space": {"g": {"$value": "1rem", "$responsive": {"md": "{space.nope}"}}}
        })),
        BTreeMap::new(),
        &Config::default(),
    );
    let report = project.validate();
    assert_eq!(report.error_count(), 1);
    assert!(matches!(
        project.compile(&mut Vec::new()),
        Err(TokenError::Validation { errors: 1, .. })
    ));
}
