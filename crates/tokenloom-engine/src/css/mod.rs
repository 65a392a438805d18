//! CSS literals, value serialisation and stylesheet emission.

pub mod emit;
pub mod literal;
pub mod serialize;

pub use emit::{emit_css, GenerationContext, LAYER_ORDER};
pub use serialize::{list_separator, property_value, token_value};
