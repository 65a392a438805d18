//! The token dictionary.
//!
//! A [`Dictionary`] is a tree of [`Node`]s plus a side table recording which
//! file installed every leaf path.
//!
//! # Token recognition
//!
//! A JSON object containing `$value` is a [`Token`]; any other object is a
//! [`Group`]. Non-object values become [`Node::Literal`], which are only
//! meaningful inside component definitions (they are raw CSS properties).
//! The distinction is made once, while decoding, so every later stage
//! dispatches on the node tag rather than probing for keys.
//!
//! # Paths
//!
//! Keys starting with `$` are metadata. They are stored on the owning token
//! or group and never contribute to paths; every other key is a path segment:
//!
//! ```text
//! { "color": { "$type": "color", "blue": { "$value": "#3b82f6" } } }
//!                                  ^ token path "color.blue"
//! ```
//!
//! # Merging
//!
//! [`Dictionary::merge`] deep-merges another dictionary into this one. Two
//! groups merge recursively; in every other combination the incoming node
//! replaces the existing one and a [`DiagnosticKind::Merge`] warning is
//! emitted. Group metadata is overwritten silently.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::value::Value;

/// Prefix marking metadata keys.
pub const METADATA_PREFIX: char = '$';

/// Returns true for `$`-prefixed keys.
pub fn is_metadata_key(key: &str) -> bool {
    key.starts_with(METADATA_PREFIX)
}

/// Appends `key` to a dotted path.
pub fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// A leaf carrying `$value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub value: Value,
    /// `$`-prefixed keys other than `$value`, stored with their prefix.
    pub meta: BTreeMap<String, Value>,
    /// Non-metadata keys found next to `$value`. They are ignored, but kept so
    /// the validator can point at them.
    pub extra: BTreeMap<String, Value>,
}

impl Token {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            meta: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }

    fn from_map(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut token = Token::new(Value::Null);
        for (key, value) in map {
            if key == "$value" {
                token.value = Value::from_json(value);
            } else if is_metadata_key(key) {
                token.meta.insert(key.clone(), Value::from_json(value));
            } else {
                token.extra.insert(key.clone(), Value::from_json(value));
            }
        }
        token
    }

    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    /// The token's own `$type`, without inheritance.
    pub fn declared_type(&self) -> Option<&str> {
        self.meta("$type").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.meta("$description").and_then(Value::as_str)
    }
}

/// An interior node. Its key participates in descendant paths.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub meta: BTreeMap<String, Value>,
    pub children: BTreeMap<String, Node>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut group = Group::new();
        for (key, value) in map {
            if is_metadata_key(key) {
                group.meta.insert(key.clone(), Value::from_json(value));
            } else {
                group.children.insert(key.clone(), Node::from_json(value));
            }
        }
        group
    }

    pub fn with_child(mut self, key: &str, node: impl Into<Node>) -> Self {
        self.children.insert(key.to_string(), node.into());
        self
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }

    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.children.get(key)
    }

    /// The group's own `$type`, inherited by descendant tokens.
    pub fn declared_type(&self) -> Option<&str> {
        self.meta("$type").and_then(Value::as_str)
    }

    /// True when tagged with `$class` or `$component: true`.
    pub fn is_component(&self) -> bool {
        self.meta("$class").and_then(Value::as_str).is_some()
            || self.meta("$component").and_then(Value::as_bool) == Some(true)
    }

    pub fn is_empty(&self) -> bool {
        self.meta.is_empty() && self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Token(Token),
    Group(Group),
    Literal(Value),
}

impl Node {
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Object(map) if map.contains_key("$value") => {
                Node::Token(Token::from_map(map))
            }
            serde_json::Value::Object(map) => Node::Group(Group::from_map(map)),
            other => Node::Literal(Value::from_json(other)),
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Node::Token(token) => Some(token),
            _ => None,
        }
    }
}

impl From<Token> for Node {
    fn from(token: Token) -> Self {
        Node::Token(token)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

/// A token visited by [`Dictionary::tokens`].
#[derive(Debug, Clone, PartialEq)]
pub struct TokenEntry<'a> {
    pub path: String,
    pub token: &'a Token,
    /// `$type` of the token, or of its nearest enclosing group.
    pub inferred_type: Option<&'a str>,
}

impl TokenEntry<'_> {
    /// First path segment.
    pub fn category(&self) -> &str {
        self.path.split('.').next().unwrap_or("")
    }
}

/// A tree of groups and tokens with its source-file side table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dictionary {
    root: Group,
    sources: BTreeMap<String, PathBuf>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a root group, attributing every leaf to `source`.
    pub fn from_group(root: Group, source: Option<&Path>) -> Self {
        let mut sources = BTreeMap::new();
        if let Some(source) = source {
            let mut leaves = Vec::new();
            collect_leaf_paths_in_group(&root, "", &mut leaves);
            for leaf in leaves {
                sources.insert(leaf, source.to_path_buf());
            }
        }
        Self { root, sources }
    }

    /// Decodes a JSON document. Returns `None` when the root is not an object.
    pub fn from_json(json: &serde_json::Value, source: Option<&Path>) -> Option<Self> {
        let map = json.as_object()?;
        Some(Self::from_group(Group::from_map(map), source))
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Group {
        &mut self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Root-level metadata such as `$extends` or `$keyframes`.
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.root.meta(key)
    }

    pub fn sources(&self) -> &BTreeMap<String, PathBuf> {
        &self.sources
    }

    pub fn source_of(&self, path: &str) -> Option<&Path> {
        self.sources.get(path).map(PathBuf::as_path)
    }

    pub fn record_source(&mut self, path: impl Into<String>, file: impl Into<PathBuf>) {
        self.sources.insert(path.into(), file.into());
    }

    /// Looks up a node by dotted path.
    pub fn get(&self, path: &str) -> Option<&Node> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.root.get(first)?;
        for segment in segments {
            node = node.as_group()?.get(segment)?;
        }
        Some(node)
    }

    pub fn token(&self, path: &str) -> Option<&Token> {
        self.get(path).and_then(Node::as_token)
    }

    pub fn contains_token(&self, path: &str) -> bool {
        self.token(path).is_some()
    }

    /// Every token, depth-first with keys in alphabetical order.
    pub fn tokens(&self) -> Vec<TokenEntry<'_>> {
        let mut out = Vec::new();
        collect_tokens(&self.root, "", self.root.declared_type(), &mut out);
        out
    }

    pub fn token_paths(&self) -> BTreeSet<String> {
        self.tokens().into_iter().map(|entry| entry.path).collect()
    }

    /// Deep-merges `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: &Dictionary, sink: &mut dyn DiagnosticSink) {
        let mut ctx = MergeContext {
            target_sources: &mut self.sources,
            incoming_sources: &other.sources,
            sink,
        };
        merge_group(&mut self.root, &other.root, "", &mut ctx);
    }

    /// Returns a copy of `self` with `other` merged on top.
    pub fn merged_with(&self, other: &Dictionary, sink: &mut dyn DiagnosticSink) -> Dictionary {
        let mut merged = self.clone();
        merged.merge(other, sink);
        merged
    }
}

struct MergeContext<'a> {
    target_sources: &'a mut BTreeMap<String, PathBuf>,
    incoming_sources: &'a BTreeMap<String, PathBuf>,
    sink: &'a mut dyn DiagnosticSink,
}

impl MergeContext<'_> {
    fn replace_sources(&mut self, path: &str, node: &Node) {
        let prefix = format!("{}.", path);
        self.target_sources
            .retain(|key, _| key != path && !key.starts_with(&prefix));
        let mut leaves = Vec::new();
        collect_leaf_paths(node, path, &mut leaves);
        for leaf in leaves {
            if let Some(file) = self.incoming_sources.get(&leaf) {
                self.target_sources.insert(leaf, file.clone());
            }
        }
    }
}

fn merge_group(target: &mut Group, incoming: &Group, prefix: &str, ctx: &mut MergeContext<'_>) {
    for (key, value) in &incoming.meta {
        target.meta.insert(key.clone(), value.clone());
    }

    for (key, node) in &incoming.children {
        let path = join_path(prefix, key);
        if !target.children.contains_key(key) {
            target.children.insert(key.clone(), node.clone());
            ctx.replace_sources(&path, node);
            continue;
        }
        match (target.children.get_mut(key), node) {
            (Some(Node::Group(existing)), Node::Group(group)) => {
                merge_group(existing, group, &path, ctx);
            }
            (Some(existing), _) => {
                if existing != node {
                    let previous = ctx.target_sources.get(&path).cloned();
                    let mut diag = Diagnostic::warning(
                        DiagnosticKind::Merge,
                        format!("'{}' is overwritten by a later file", path),
                    )
                    .at(&path)
                    .in_file(ctx.incoming_sources.get(&path).map(PathBuf::as_path));
                    if let Some(previous) = previous {
                        diag = diag.with_related(&path, Some(previous.as_path()));
                    }
                    ctx.sink.emit(diag);
                }
                *existing = node.clone();
                ctx.replace_sources(&path, node);
            }
            (None, _) => {}
        }
    }
}

fn collect_tokens<'a>(
    group: &'a Group,
    prefix: &str,
    inherited_type: Option<&'a str>,
    out: &mut Vec<TokenEntry<'a>>,
) {
    for (key, node) in &group.children {
        let path = join_path(prefix, key);
        match node {
            Node::Token(token) => out.push(TokenEntry {
                path,
                token,
                inferred_type: token.declared_type().or(inherited_type),
            }),
            Node::Group(child) => {
                let child_type = child.declared_type().or(inherited_type);
                collect_tokens(child, &path, child_type, out);
            }
            Node::Literal(_) => {}
        }
    }
}

fn collect_leaf_paths(node: &Node, path: &str, out: &mut Vec<String>) {
    match node {
        Node::Group(group) => collect_leaf_paths_in_group(group, path, out),
        _ => out.push(path.to_string()),
    }
}

fn collect_leaf_paths_in_group(group: &Group, prefix: &str, out: &mut Vec<String>) {
    for (key, node) in &group.children {
        collect_leaf_paths(node, &join_path(prefix, key), out);
    }
}
