//! Component extraction.
//!
//! A group tagged with `$class` (or `$component: true`) describes a CSS
//! component:
//!
//! ```json
//! "button": {
//!   "$class": "btn",
//!   "padding": ["{spacing.2}", "{spacing.4}"],
//!   "&:hover": { "background": "{color.primary-hover}" },
//!   "variants": { "primary": { "background": "{color.primary}" } },
//!   "sizes": { "sm": { "$class": "btn-small", "fontSize": "0.875rem" } },
//!   "states": { "&:disabled": { "opacity": 0.5 } },
//!   "@container (min-width: 400px)": { "padding": "2rem" }
//! }
//! ```
//!
//! Raw children become declarations of the base rule. Children keyed with
//! `&` or `:` are pseudo-selector rules promoted next to the rule that owns
//! them; they never appear as declarations. Values are kept unresolved; the
//! emitter rewrites aliases to `var()` references.

use std::collections::BTreeMap;

use crate::dictionary::{join_path, Dictionary, Group, Node};
use crate::value::Value;

const VARIANTS: &str = "variants";
const SIZES: &str = "sizes";
const STATES: &str = "states";
const CONTAINER_PREFIX: &str = "@container";

/// One CSS rule: selector plus declarations keyed by kebab-case property.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: String,
    pub declarations: BTreeMap<String, Value>,
}

impl Rule {
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// A variant or size: its own class, main rule first, then its states.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentPart {
    pub name: String,
    pub class: String,
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDefinition {
    /// Dotted path of the defining group.
    pub path: String,
    pub class: String,
    pub description: Option<String>,
    pub contains: Vec<String>,
    pub requires: Vec<String>,
    /// Base rule followed by its promoted pseudo-selector rules.
    pub base: Vec<Rule>,
    pub variants: Vec<ComponentPart>,
    pub sizes: Vec<ComponentPart>,
    pub states: Vec<Rule>,
}

impl ComponentDefinition {
    /// Last path segment.
    pub fn name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Base class followed by every variant and size class.
    pub fn classes(&self) -> Vec<&str> {
        let mut classes = vec![self.class.as_str()];
        classes.extend(self.variants.iter().map(|v| v.class.as_str()));
        classes.extend(self.sizes.iter().map(|s| s.class.as_str()));
        classes
    }

    /// Every rule in emission order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.base
            .iter()
            .chain(self.variants.iter().flat_map(|v| v.rules.iter()))
            .chain(self.sizes.iter().flat_map(|s| s.rules.iter()))
            .chain(self.states.iter())
    }
}

/// Rules that apply under a container query.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerOverride {
    pub query: String,
    /// Path of the component the rules came from.
    pub component: String,
    pub rules: Vec<Rule>,
}

/// Components and container overrides found in `dict`, ordered by path.
pub fn extract_components(dict: &Dictionary) -> (Vec<ComponentDefinition>, Vec<ContainerOverride>) {
    let mut components = Vec::new();
    let mut containers = Vec::new();
    scan(dict.root(), "", &mut components, &mut containers);
    components.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(
        components = components.len(),
        containers = containers.len(),
        "extracted components"
    );
    (components, containers)
}

fn scan(
    group: &Group,
    prefix: &str,
    components: &mut Vec<ComponentDefinition>,
    containers: &mut Vec<ContainerOverride>,
) {
    for (key, node) in &group.children {
        let Node::Group(child) = node else {
            continue;
        };
        let path = join_path(prefix, key);
        if child.is_component() {
            let (component, overrides) = extract_one(&path, key, child);
            components.push(component);
            containers.extend(overrides);
        }
        scan(child, &path, components, containers);
    }
}

fn extract_one(path: &str, key: &str, group: &Group) -> (ComponentDefinition, Vec<ContainerOverride>) {
    let class = group
        .meta("$class")
        .and_then(Value::as_str)
        .unwrap_or(key)
        .trim_start_matches('.')
        .to_string();
    let selector = format!(".{}", class);
    let mut containers = ContainerSink {
        component: path,
        out: Vec::new(),
    };

    let base = rules_for(&selector, group, &mut containers);

    let variants = parts(group.get(VARIANTS), &class, &mut containers);
    let sizes = parts(group.get(SIZES), &class, &mut containers);

    let mut states = Vec::new();
    if let Some(Node::Group(state_group)) = group.get(STATES) {
        for (state_key, node) in &state_group.children {
            if let Node::Group(state) = node {
                let state_selector = compose_selector(&selector, state_key);
                let rules = rules_for(&state_selector, state, &mut containers);
                match container_query(state) {
                    Some(query) => containers.push(query, rules),
                    None => states.extend(rules),
                }
            }
        }
    }

    for (child_key, node) in &group.children {
        if let (Some(query), Node::Group(child)) = (container_key(child_key), node) {
            let rules = rules_for(&selector, child, &mut containers);
            containers.push(query.to_string(), rules);
        }
    }

    let component = ComponentDefinition {
        path: path.to_string(),
        class,
        description: group
            .meta("$description")
            .and_then(Value::as_str)
            .map(str::to_string),
        contains: string_list(group.meta("$contains")),
        requires: string_list(group.meta("$requires")),
        base,
        variants,
        sizes,
        states,
    };
    (component, containers.out)
}

struct ContainerSink<'a> {
    component: &'a str,
    out: Vec<ContainerOverride>,
}

impl ContainerSink<'_> {
    fn push(&mut self, query: String, rules: Vec<Rule>) {
        let rules: Vec<Rule> = rules.into_iter().filter(|r| !r.is_empty()).collect();
        if rules.is_empty() {
            return;
        }
        self.out.push(ContainerOverride {
            query,
            component: self.component.to_string(),
            rules,
        });
    }
}

/// Variants or sizes, alphabetical.
fn parts(node: Option<&Node>, base_class: &str, containers: &mut ContainerSink<'_>) -> Vec<ComponentPart> {
    let Some(Node::Group(group)) = node else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for (name, node) in &group.children {
        let Node::Group(part) = node else {
            continue;
        };
        let class = part
            .meta("$class")
            .and_then(Value::as_str)
            .map(|c| c.trim_start_matches('.').to_string())
            .unwrap_or_else(|| format!("{}-{}", base_class, name));
        let selector = format!(".{}", class);

        let mut rules = rules_for(&selector, part, containers);
        if let Some(Node::Group(state_group)) = part.get(STATES) {
            for (state_key, node) in &state_group.children {
                if let Node::Group(state) = node {
                    rules.extend(rules_for(&compose_selector(&selector, state_key), state, containers));
                }
            }
        }

        match container_query(part) {
            Some(query) => {
                containers.push(query, rules);
                out.push(ComponentPart {
                    name: name.clone(),
                    class,
                    rules: Vec::new(),
                });
            }
            None => out.push(ComponentPart {
                name: name.clone(),
                class,
                rules,
            }),
        }
    }
    out
}

/// The rule for `group`'s own declarations followed by promoted
/// pseudo-selector rules, recursively.
fn rules_for(selector: &str, group: &Group, containers: &mut ContainerSink<'_>) -> Vec<Rule> {
    let mut declarations = BTreeMap::new();
    let mut promoted = Vec::new();

    for (key, node) in &group.children {
        if matches!(key.as_str(), VARIANTS | SIZES | STATES) || container_key(key).is_some() {
            continue;
        }
        match node {
            Node::Literal(value) => {
                declarations.insert(kebab_case(key), value.clone());
            }
            Node::Token(token) => {
                declarations.insert(kebab_case(key), token.value.clone());
            }
            Node::Group(child) if is_pseudo_key(key) => {
                let nested = compose_selector(selector, key);
                let rules = rules_for(&nested, child, containers);
                match container_query(child) {
                    Some(query) => containers.push(query, rules),
                    None => promoted.extend(rules),
                }
            }
            Node::Group(child) if child.is_component() => {}
            Node::Group(_) => {
                tracing::debug!(selector, key = %key, "ignoring nested group in component");
            }
        }
    }

    let mut rules = vec![Rule {
        selector: selector.to_string(),
        declarations,
    }];
    rules.extend(promoted);
    rules
}

fn is_pseudo_key(key: &str) -> bool {
    key.starts_with('&') || key.starts_with(':')
}

/// `@container (min-width: 400px)` -> `(min-width: 400px)`.
fn container_key(key: &str) -> Option<&str> {
    key.strip_prefix(CONTAINER_PREFIX)
        .map(str::trim)
        .filter(|query| !query.is_empty())
}

fn container_query(group: &Group) -> Option<String> {
    group
        .meta("$container")
        .and_then(Value::as_str)
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
}

/// `&` is replaced by the owner, `:` is appended, anything else nests as a
/// descendant.
pub fn compose_selector(owner: &str, key: &str) -> String {
    if key.contains('&') {
        key.replace('&', owner)
    } else if key.starts_with(':') {
        format!("{}{}", owner, key)
    } else {
        format!("{} {}", owner, key)
    }
}

/// `fontSize` -> `font-size`. Already-kebab names pass through.
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::List(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract(json: serde_json::Value) -> (Vec<ComponentDefinition>, Vec<ContainerOverride>) {
        extract_components(&Dictionary::from_json(&json, None).unwrap())
    }

    fn selectors(component: &ComponentDefinition) -> Vec<&str> {
        component.rules().map(|r| r.selector.as_str()).collect()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn test_compose_selector() {
        assert_eq!(compose_selector(".btn", "&:hover"), ".btn:hover");
        assert_eq!(compose_selector(".btn", ":focus-visible"), ".btn:focus-visible");
        assert_eq!(compose_selector(".btn", ".icon"), ".btn .icon");
        assert_eq!(compose_selector(".btn", "&.is-active"), ".btn.is-active");
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("fontSize"), "font-size");
        assert_eq!(kebab_case("borderTopLeftRadius"), "border-top-left-radius");
        assert_eq!(kebab_case("padding-inline"), "padding-inline");
    }

    // =========================================================================
    // Extraction
    // =========================================================================

    #[test]
    fn test_base_rule_and_promoted_pseudo_selectors() {
        let (components, _) = extract(json!({
            "button": {
                "$class": "btn",
                "$description": "Clickable",
                "padding": ["1rem", "2rem"],
                "fontSize": "1rem",
                "&:hover": {"background": "{color.hover}", ":focus": {"outline": "none"}}
            }
        }));
        assert_eq!(components.len(), 1);
        let button = &components[0];
        assert_eq!(button.class, "btn");
        assert_eq!(button.description.as_deref(), Some("Clickable"));
        assert_eq!(selectors(button), vec![".btn", ".btn:hover", ".btn:hover:focus"]);

        let base = &button.base[0];
        assert_eq!(base.declarations.keys().collect::<Vec<_>>(), vec!["font-size", "padding"]);
        assert!(!base.declarations.contains_key("&:hover"));
    }

    #[test]
    fn test_variants_sizes_and_states() {
        let (components, _) = extract(json!({
            "button": {
                "$class": "btn",
                "variants": {
                    "secondary": {"color": "gray"},
                    "primary": {"color": "blue", "states": {":hover": {"color": "navy"}}}
                },
                "sizes": {"sm": {"$class": "btn-small", "padding": "0.5rem"}},
                "states": {"&:disabled": {"opacity": 0.5}, ".icon": {"margin": 0}}
            }
        }));
        let button = &components[0];
        assert_eq!(
            selectors(button),
            vec![
                ".btn",
                ".btn-primary",
                ".btn-primary:hover",
                ".btn-secondary",
                ".btn-small",
                ".btn:disabled",
                ".btn .icon",
            ]
        );
        assert_eq!(button.classes(), vec!["btn", "btn-primary", "btn-secondary", "btn-small"]);
    }

    #[test]
    fn test_component_marker_defaults_class_to_key() {
        let (components, _) = extract(json!({
            "ui": {"card": {"$component": true, "$contains": ["button"], "$requires": "focus-ring"}}
        }));
        assert_eq!(components[0].class, "card");
        assert_eq!(components[0].path, "ui.card");
        assert_eq!(components[0].name(), "card");
        assert_eq!(components[0].contains, vec!["button"]);
        assert_eq!(components[0].requires, vec!["focus-ring"]);
    }

    #[test]
    fn test_container_overrides() {
        let (components, containers) = extract(json!({
            "card": {
                "$class": "card",
                "padding": "1rem",
                "@container (min-width: 400px)": {"padding": "2rem"},
                "variants": {"wide": {"$container": "(min-width: 800px)", "gap": "2rem"}}
            }
        }));
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[0].query, "(min-width: 800px)");
        assert_eq!(containers[0].rules[0].selector, ".card-wide");
        assert_eq!(containers[1].query, "(min-width: 400px)");
        assert_eq!(containers[1].rules[0].selector, ".card");
        assert_eq!(selectors(&components[0]), vec![".card"]);
    }

    #[test]
    fn test_groups_without_marker_are_not_components() {
        let (components, _) = extract(json!({"color": {"red": {"$value": "#f00"}}}));
        assert!(components.is_empty());
    }
}
