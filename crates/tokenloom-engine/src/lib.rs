//! # Tokenloom Engine - Design Token Resolution
//!
//! `tokenloom-engine` turns a directory of W3C design token files into
//! deterministic build artifacts: a CSS stylesheet organised in cascade
//! layers, or a JSON catalog for downstream tools.
//!
//! ## Pipeline
//!
//! ```text
//! files ──> Dictionary ──> scale expansion ──> validation
//!                                                  │
//!        CSS / catalog <── extract <── diff <── resolve <── theme inheritance
//! ```
//!
//! - [`Loader`]: walks source roots, decodes JSON and deep-merges files
//! - [`validate()`]: structural, type, metadata, reference, cycle and layer checks
//! - [`resolve()`]: substitutes `{dotted.path}` aliases in topological order
//! - [`theme`]: `$extends` inheritance and default-theme selection
//! - [`diff()`]: what a theme changes relative to base
//! - [`extract`]: components, `@property` registrations, keyframes, breakpoints
//! - [`emit_css`]: the stylesheet
//!
//! [`Project`] runs the whole thing.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use tokenloom_engine::{Config, Dictionary, Project};
//!
//! let base = Dictionary::from_json(
//!     &serde_json::json!({
//!         "color": {
//!             "blue": { "$value": "#3b82f6" },
//!             "brand": { "$value": "{color.blue}" }
//!         }
//!     }),
//!     None,
//! )
//! .unwrap();
//!
//! let project = Project::from_parts(base, BTreeMap::new(), &Config::default());
//! let compiled = project.compile(&mut Vec::new()).unwrap();
//!
//! assert!(compiled.to_css().contains("--color-brand: #3b82f6;"));
//! ```
//!
//! ## Diagnostics
//!
//! IO and parse failures are [`TokenError`]s and stop loading. Everything
//! else is a [`Diagnostic`]; validation collects all of them so a single run
//! reports every problem. Warnings never stop a build.

pub mod alias;
pub mod catalog;
pub mod config;
pub mod css;
pub mod diagnostic;
pub mod dictionary;
pub mod diff;
mod error;
pub mod extract;
pub mod graph;
pub mod loader;
pub mod project;
pub mod resolve;
pub mod scale;
pub mod search;
pub mod theme;
pub mod validate;
pub mod value;

// Errors
pub use error::{ConfigError, ResolveError, ScaleError, ThemeError, TokenError};

// Diagnostics
pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink, Severity, TracingSink};

// Model
pub use dictionary::{Dictionary, Group, Node, Token};
pub use value::Value;

// Pipeline
pub use config::{Config, CONFIG_FILE};
pub use diff::{apply_diff, diff};
pub use graph::AliasGraph;
pub use loader::Loader;
pub use project::{CompiledProject, Project};
pub use resolve::{resolve, ResolvedToken, ResolvedTokens};
pub use theme::{CompiledTheme, ThemeInfo};
pub use validate::{validate, ValidationOptions, ValidationReport};

// Output
pub use catalog::{Catalog, CatalogOptions};
pub use css::{emit_css, GenerationContext};
pub use search::{Query, SearchFilters, SearchHit};
