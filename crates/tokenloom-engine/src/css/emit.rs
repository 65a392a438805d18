//! CSS emission.
//!
//! [`emit_css`] renders a [`GenerationContext`] into one stylesheet. Blocks
//! appear in a fixed order:
//!
//! 1. `@layer reset, tokens, themes, components;`
//! 2. `@property` registrations
//! 3. `@keyframes`
//! 4. `@layer reset`
//! 5. `@layer tokens` with every base token under `:root`
//! 6. `@layer themes`, the default theme first
//! 7. `@layer components`
//! 8. `@media (min-width: …)` responsive overrides, smallest breakpoint first
//! 9. `@container` blocks grouped by query
//!
//! Media and container blocks sit outside the layers. Blocks are separated by
//! a blank line and the output ends with a newline.

use std::collections::BTreeMap;

use crate::alias::custom_property_name;
use crate::css::serialize::{property_value, token_value};
use crate::extract::{
    Breakpoint, ComponentDefinition, ContainerOverride, KeyframeDefinition, PropertyToken,
    ResponsiveToken, Rule,
};
use crate::resolve::{ResolvedToken, ResolvedTokens};
use crate::theme::CompiledTheme;
use crate::value::Value;

/// Layer order declaration, always the first statement.
pub const LAYER_ORDER: &str = "@layer reset, tokens, themes, components;";

const RESET_RULES: &str = "\
*, *::before, *::after {
  box-sizing: border-box;
}

body {
  margin: 0;
}";

/// Everything the emitter needs, already resolved and extracted.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    pub base: ResolvedTokens,
    pub themes: Vec<CompiledTheme>,
    pub default_theme: Option<String>,
    pub components: Vec<ComponentDefinition>,
    pub properties: Vec<PropertyToken>,
    pub keyframes: Vec<KeyframeDefinition>,
    pub breakpoints: Vec<Breakpoint>,
    pub responsive: Vec<ResponsiveToken>,
    pub containers: Vec<ContainerOverride>,
}

/// Renders the stylesheet.
pub fn emit_css(ctx: &GenerationContext) -> String {
    let mut blocks = vec![LAYER_ORDER.to_string()];

    blocks.extend(ctx.properties.iter().map(property_block));
    blocks.extend(ctx.keyframes.iter().map(keyframes_block));
    blocks.push(wrap_layer_block("reset", RESET_RULES));

    let tokens = declarations_for(&ctx.base);
    if !tokens.is_empty() {
        blocks.push(wrap_layer_block("tokens", &rule_block(":root", &tokens)));
    }

    let themes = themes_css(ctx);
    if !themes.is_empty() {
        blocks.push(wrap_layer_block("themes", &themes));
    }

    let components = components_css(&ctx.components);
    if !components.is_empty() {
        blocks.push(wrap_layer_block("components", &components));
    }

    blocks.extend(media_blocks(&ctx.breakpoints, &ctx.responsive));
    blocks.extend(container_blocks(&ctx.containers));

    let mut css = blocks.join("\n\n");
    css.push('\n');
    css
}

/// Indents `css` by two spaces inside `@layer name { … }`.
fn wrap_layer_block(layer: &str, css: &str) -> String {
    wrap_block(&format!("@layer {}", layer), css)
}

fn wrap_block(prelude: &str, css: &str) -> String {
    let indented = css
        .trim()
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("  {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("{} {{\n{}\n}}", prelude, indented)
}

fn rule_block(selector: &str, declarations: &[String]) -> String {
    wrap_block(selector, &declarations.join("\n"))
}

fn property_block(property: &PropertyToken) -> String {
    let lines = [
        format!("syntax: \"{}\";", property.syntax),
        format!("inherits: {};", property.inherits),
        format!("initial-value: {};", property.initial_value),
    ];
    rule_block(&format!("@property {}", property.name), &lines)
}

fn keyframes_block(definition: &KeyframeDefinition) -> String {
    let frames: Vec<String> = definition
        .frames
        .iter()
        .map(|frame| rule_block(&frame.selector, &component_declarations(&frame.declarations)))
        .collect();
    wrap_block(&format!("@keyframes {}", definition.name), &frames.join("\n"))
}

/// Custom property declarations for a resolved map, ordered by property
/// name. Object values have no CSS form and are left out.
fn declarations_for(tokens: &ResolvedTokens) -> Vec<String> {
    let mut declarations: Vec<(String, &String, &ResolvedToken)> = tokens
        .iter()
        .filter(|(_, token)| !matches!(token.value, Value::Map(_)))
        .map(|(path, token)| (custom_property_name(path), path, token))
        .collect();
    declarations.sort_by(|a, b| a.0.cmp(&b.0));
    declarations
        .into_iter()
        .map(|(name, path, token)| format!("{}: {};", name, token.css_value(path)))
        .collect()
}

/// Theme blocks: the default theme first, then the rest by name. Themes
/// that change nothing are skipped.
fn themes_css(ctx: &GenerationContext) -> String {
    let default = ctx.default_theme.as_deref();
    let mut themes: Vec<&CompiledTheme> = ctx.themes.iter().collect();
    themes.sort_by(|a, b| {
        let a_default = Some(a.name()) == default;
        let b_default = Some(b.name()) == default;
        b_default.cmp(&a_default).then_with(|| a.name().cmp(b.name()))
    });

    themes
        .into_iter()
        .filter_map(|theme| {
            let lines = declarations_for(&theme.diff);
            if lines.is_empty() {
                tracing::debug!(theme = theme.name(), "theme has no overrides");
                return None;
            }
            Some(rule_block(&theme_selector(theme.name(), default), &lines))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `[data-theme="name"]`, prefixed with `:root` for the default theme.
pub fn theme_selector(name: &str, default: Option<&str>) -> String {
    let attribute = format!("[data-theme=\"{}\"]", name);
    if default == Some(name) {
        format!(":root, {}", attribute)
    } else {
        attribute
    }
}

fn components_css(components: &[ComponentDefinition]) -> String {
    let mut sorted: Vec<&ComponentDefinition> = components.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));
    rules_css(sorted.into_iter().flat_map(|component| component.rules()))
}

fn rules_css<'a>(rules: impl Iterator<Item = &'a Rule>) -> String {
    rules
        .filter(|rule| !rule.is_empty())
        .map(|rule| rule_block(&rule.selector, &component_declarations(&rule.declarations)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn component_declarations(declarations: &BTreeMap<String, Value>) -> Vec<String> {
    declarations
        .iter()
        .map(|(property, value)| format!("{}: {};", property, property_value(property, value)))
        .collect()
}

fn media_blocks(breakpoints: &[Breakpoint], responsive: &[ResponsiveToken]) -> Vec<String> {
    let mut tokens: Vec<&ResponsiveToken> = responsive.iter().collect();
    tokens.sort_by_cached_key(|token| token.custom_property());

    breakpoints
        .iter()
        .filter_map(|bp| {
            let lines: Vec<String> = tokens
                .iter()
                .filter_map(|token| {
                    let value = token.overrides.get(&bp.name)?;
                    Some(format!(
                        "{}: {};",
                        token.custom_property(),
                        token_value(value, token.token_type.as_deref(), &token.path)
                    ))
                })
                .collect();
            if lines.is_empty() {
                return None;
            }
            Some(wrap_block(
                &format!("@media (min-width: {})", bp.value),
                &rule_block(":root", &lines),
            ))
        })
        .collect()
}

fn container_blocks(containers: &[ContainerOverride]) -> Vec<String> {
    let mut by_query: BTreeMap<&str, Vec<&ContainerOverride>> = BTreeMap::new();
    for container in containers {
        by_query.entry(container.query.as_str()).or_default().push(container);
    }

    by_query
        .into_iter()
        .filter_map(|(query, mut overrides)| {
            overrides.sort_by(|a, b| a.component.cmp(&b.component));
            let css = rules_css(overrides.iter().flat_map(|o| o.rules.iter()));
            if css.is_empty() {
                return None;
            }
            Some(wrap_block(&format!("@container {}", query), &css))
        })
        .collect()
}
