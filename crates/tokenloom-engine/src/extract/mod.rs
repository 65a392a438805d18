//! Artifact extraction from dictionaries and resolved maps.
//!
//! Each extractor produces plain data consumed by the CSS emitter and the
//! catalog:
//!
//! - [`component`]: component classes, variants, sizes, states, container overrides
//! - [`property`]: `@property` registrations
//! - [`responsive`]: breakpoints and per-breakpoint token overrides
//! - [`keyframes`]: `@keyframes` definitions

pub mod component;
pub mod keyframes;
pub mod property;
pub mod responsive;

pub use component::{extract_components, ComponentDefinition, ComponentPart, ContainerOverride, Rule};
pub use keyframes::{extract_keyframes, Keyframe, KeyframeDefinition};
pub use property::{extract_properties, PropertyToken};
pub use responsive::{extract_responsive, Breakpoint, ResponsiveToken};
