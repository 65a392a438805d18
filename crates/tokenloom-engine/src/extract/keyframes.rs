//! `@keyframes` definitions.
//!
//! Declared with `$keyframes` on the dictionary root or on a top-level group:
//!
//! ```json
//! "$keyframes": {
//!   "fade-in": { "from": { "opacity": 0 }, "to": { "opacity": 1 } }
//! }
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::dictionary::{Dictionary, Node};
use crate::extract::component::kebab_case;
use crate::value::Value;

const KEYFRAMES_KEY: &str = "$keyframes";

#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    /// `from`, `to` or a percentage such as `50%`.
    pub selector: String,
    pub declarations: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeDefinition {
    pub name: String,
    /// `from`, then percentages ascending, then `to`.
    pub frames: Vec<Keyframe>,
}

/// Every keyframe definition, sorted by name. A name defined twice keeps the
/// last definition in traversal order.
pub fn extract_keyframes(dict: &Dictionary) -> Vec<KeyframeDefinition> {
    let mut by_name: BTreeMap<String, KeyframeDefinition> = BTreeMap::new();

    let mut sources: Vec<&Value> = dict.meta(KEYFRAMES_KEY).into_iter().collect();
    for node in dict.root().children.values() {
        if let Node::Group(group) = node {
            sources.extend(group.meta(KEYFRAMES_KEY));
        }
    }

    for source in sources {
        let Some(definitions) = source.as_map() else {
            tracing::debug!("ignoring $keyframes that is not an object");
            continue;
        };
        for (name, frames) in definitions {
            let Some(frames) = frames.as_map() else {
                continue;
            };
            let mut frames: Vec<Keyframe> = frames
                .iter()
                .filter_map(|(selector, props)| {
                    let props = props.as_map()?;
                    Some(Keyframe {
                        selector: selector.trim().to_string(),
                        declarations: props
                            .iter()
                            .map(|(k, v)| (kebab_case(k), v.clone()))
                            .collect(),
                    })
                })
                .collect();
            frames.sort_by(|a, b| compare_frames(&a.selector, &b.selector));
            by_name.insert(
                name.clone(),
                KeyframeDefinition {
                    name: name.clone(),
                    frames,
                },
            );
        }
    }

    by_name.into_values().collect()
}

/// Position of a frame selector on the 0-100 timeline.
fn frame_position(selector: &str) -> Option<f64> {
    match selector {
        "from" => Some(0.0),
        "to" => Some(100.0),
        other => other.trim_end_matches('%').trim().parse().ok(),
    }
}

fn compare_frames(a: &str, b: &str) -> Ordering {
    let rank = |s: &str| match s {
        "from" => 0,
        "to" => 2,
        _ => 1,
    };
    rank(a).cmp(&rank(b)).then_with(|| match (frame_position(a), frame_position(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.cmp(b),
    })
}
