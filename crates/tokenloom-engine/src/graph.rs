//! The alias dependency graph.
//!
//! Nodes are interned token paths; an edge `a -> b` means the value of `a`
//! references `{b}`. The graph is built once per dictionary and shared by the
//! validator (reference integrity and cycle checks) and the resolver
//! (evaluation order).
//!
//! Cycles are found with Tarjan's strongly-connected-components algorithm so
//! that every independent cycle is reported, not only the first one a
//! topological sort trips over. Each reported cycle is a concrete path that
//! starts and ends on the same node, e.g. `[a, b, a]`.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::alias;
use crate::dictionary::Dictionary;
use crate::error::ResolveError;
use crate::value::Value;

/// Directed graph of alias references between token paths.
#[derive(Debug, Clone, Default)]
pub struct AliasGraph {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    /// Outgoing edges: the tokens each node references.
    deps: Vec<BTreeSet<usize>>,
}

impl AliasGraph {
    /// Builds the graph for every token in `dict`.
    ///
    /// Malformed aliases and references to missing tokens are returned
    /// alongside the graph; the offending edges are left out.
    pub fn from_dictionary(dict: &Dictionary) -> (Self, Vec<ResolveError>) {
        let entries: Vec<(String, &Value)> = dict
            .tokens()
            .into_iter()
            .map(|entry| (entry.path, &entry.token.value))
            .collect();
        Self::build(&entries)
    }

    /// Builds the graph from `(path, value)` pairs. Node order follows input order.
    pub fn build(entries: &[(String, &Value)]) -> (Self, Vec<ResolveError>) {
        let mut graph = AliasGraph::default();
        for (path, _) in entries {
            graph.intern(path);
        }

        let mut issues = Vec::new();
        for (path, value) in entries {
            let from = graph.index[path.as_str()];
            let targets = match value_references(value) {
                Ok(targets) => targets,
                Err((text, reason)) => {
                    issues.push(ResolveError::MalformedAlias {
                        path: path.clone(),
                        value: text,
                        reason,
                    });
                    continue;
                }
            };
            for target in targets {
                match graph.index.get(target) {
                    Some(&to) => {
                        graph.deps[from].insert(to);
                    }
                    None => issues.push(ResolveError::UndefinedReference {
                        path: path.clone(),
                        target: target.to_string(),
                    }),
                }
            }
        }

        tracing::debug!(
            nodes = graph.nodes.len(),
            edges = graph.deps.iter().map(BTreeSet::len).sum::<usize>(),
            "built alias graph"
        );
        (graph, issues)
    }

    fn intern(&mut self, path: &str) -> usize {
        if let Some(&id) = self.index.get(path) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(path.to_string());
        self.index.insert(path.to_string(), id);
        self.deps.push(BTreeSet::new());
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Paths directly referenced by `path`, in node order.
    pub fn dependencies(&self, path: &str) -> Vec<&str> {
        match self.index.get(path) {
            Some(&id) => self.deps[id]
                .iter()
                .map(|&dep| self.nodes[dep].as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Every alias cycle, each as a closed path (`[a, b, a]`).
    ///
    /// Cycles are ordered by their first path; each starts at the smallest
    /// path in its component.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = self
            .strongly_connected_components()
            .into_iter()
            .filter(|component| {
                component.len() > 1 || self.deps[component[0]].contains(&component[0])
            })
            .map(|component| self.trace_cycle(&component))
            .collect();
        cycles.sort();
        cycles
    }

    /// Orders paths so every token comes after the tokens it references.
    ///
    /// Ties are broken by node order, so the result is deterministic. Fails
    /// with one [`ResolveError::Cycle`] per cycle.
    pub fn topological_order(&self) -> Result<Vec<&str>, Vec<ResolveError>> {
        let count = self.nodes.len();
        let mut pending: Vec<usize> = self.deps.iter().map(BTreeSet::len).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (from, deps) in self.deps.iter().enumerate() {
            for &to in deps {
                dependents[to].push(from);
            }
        }

        let mut ready: BTreeSet<usize> = (0..count).filter(|&id| pending[id] == 0).collect();
        let mut order = Vec::with_capacity(count);
        while let Some(id) = ready.pop_first() {
            order.push(self.nodes[id].as_str());
            for &dependent in &dependents[id] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() == count {
            Ok(order)
        } else {
            Err(self
                .cycles()
                .into_iter()
                .map(|cycle| ResolveError::Cycle { cycle })
                .collect())
        }
    }

    /// Tarjan's algorithm. Each component is sorted by path.
    fn strongly_connected_components(&self) -> Vec<Vec<usize>> {
        let mut state = Tarjan {
            graph: self,
            next_index: 0,
            indices: vec![None; self.nodes.len()],
            lowlinks: vec![0; self.nodes.len()],
            on_stack: vec![false; self.nodes.len()],
            stack: Vec::new(),
            components: Vec::new(),
        };
        for id in 0..self.nodes.len() {
            if state.indices[id].is_none() {
                state.visit(id);
            }
        }
        let mut components = state.components;
        for component in &mut components {
            component.sort_by(|a, b| self.nodes[*a].cmp(&self.nodes[*b]));
        }
        components
    }

    /// Shortest closed walk from the smallest member back to itself.
    fn trace_cycle(&self, component: &[usize]) -> Vec<String> {
        let start = component[0];
        let members: BTreeSet<usize> = component.iter().copied().collect();

        let mut previous: HashMap<usize, usize> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        let mut closing = None;
        'search: while let Some(node) = queue.pop_front() {
            for &next in &self.deps[node] {
                if next == start {
                    closing = Some(node);
                    break 'search;
                }
                if members.contains(&next) && !previous.contains_key(&next) {
                    previous.insert(next, node);
                    queue.push_back(next);
                }
            }
        }

        let mut walk = vec![start];
        let mut cursor = closing.unwrap_or(start);
        while cursor != start {
            walk.push(cursor);
            cursor = previous.get(&cursor).copied().unwrap_or(start);
        }
        walk.push(start);
        let end = walk.len() - 1;
        walk[1..end].reverse();
        walk.into_iter().map(|id| self.nodes[id].clone()).collect()
    }
}

struct Tarjan<'g> {
    graph: &'g AliasGraph,
    next_index: usize,
    indices: Vec<Option<usize>>,
    lowlinks: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    components: Vec<Vec<usize>>,
}

impl Tarjan<'_> {
    fn visit(&mut self, node: usize) {
        self.indices[node] = Some(self.next_index);
        self.lowlinks[node] = self.next_index;
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack[node] = true;

        let graph = self.graph;
        for &next in &graph.deps[node] {
            match self.indices[next] {
                None => {
                    self.visit(next);
                    self.lowlinks[node] = self.lowlinks[node].min(self.lowlinks[next]);
                }
                Some(index) if self.on_stack[next] => {
                    self.lowlinks[node] = self.lowlinks[node].min(index);
                }
                Some(_) => {}
            }
        }

        if Some(self.lowlinks[node]) == self.indices[node] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack[member] = false;
                component.push(member);
                if member == node {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}

/// Alias targets inside a value. Strings are scanned directly, lists
/// element-wise; maps are never scanned.
///
/// On malformed syntax returns the offending text and the reason.
pub fn value_references(value: &Value) -> Result<Vec<&str>, (String, String)> {
    match value {
        Value::String(text) => alias::parse_aliases(text)
            .map(|refs| refs.into_iter().map(|r| r.path).collect())
            .map_err(|reason| (text.clone(), reason)),
        Value::List(items) => {
            let mut out = Vec::new();
            for item in items {
                out.extend(value_references(item)?);
            }
            Ok(out)
        }
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(entries: &[(&str, Value)]) -> (AliasGraph, Vec<ResolveError>) {
        let owned: Vec<(String, &Value)> = entries
            .iter()
            .map(|(path, value)| (path.to_string(), value))
            .collect();
        AliasGraph::build(&owned)
    }

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn test_edges_follow_references() {
        let (g, issues) = graph(&[
            ("a", Value::from("{b} {c}")),
            ("b", Value::from("1px")),
            ("c", Value::List(vec!["{b}".into()])),
        ]);
        assert!(issues.is_empty());
        assert_eq!(g.dependencies("a"), vec!["b", "c"]);
        assert_eq!(g.dependencies("c"), vec!["b"]);
        assert!(g.dependencies("b").is_empty());
    }

    #[test]
    fn test_undefined_and_malformed_are_reported() {
        let (_, issues) = graph(&[
            ("a", Value::from("{missing}")),
            ("b", Value::from("{oops")),
        ]);
        assert_eq!(issues.len(), 2);
        assert!(matches!(
            &issues[0],
            ResolveError::UndefinedReference { path, target } if path == "a" && target == "missing"
        ));
        assert!(matches!(&issues[1], ResolveError::MalformedAlias { path, .. } if path == "b"));
    }

    #[test]
    fn test_maps_are_not_scanned() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("x".to_string(), Value::from("{missing}"));
        let (_, issues) = graph(&[("a", Value::Map(map))]);
        assert!(issues.is_empty());
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    #[test]
    fn test_topological_order_puts_dependencies_first() {
        let (g, _) = graph(&[
            ("brand", Value::from("{primary}")),
            ("blue", Value::from("#00f")),
            ("primary", Value::from("{blue}")),
        ]);
        let order = g.topological_order().unwrap();
        assert_eq!(order, vec!["blue", "primary", "brand"]);
    }

    #[test]
    fn test_independent_nodes_keep_input_order() {
        let (g, _) = graph(&[("x", Value::from(1i64)), ("y", Value::from(2i64))]);
        assert_eq!(g.topological_order().unwrap(), vec!["x", "y"]);
    }

    // =========================================================================
    // Cycles
    // =========================================================================

    #[test]
    fn test_two_node_cycle() {
        let (g, _) = graph(&[("a", Value::from("{b}")), ("b", Value::from("{a}"))]);
        assert_eq!(g.cycles(), vec![vec!["a", "b", "a"]]);
        let errors = g.topological_order().unwrap_err();
        assert_eq!(errors[0].to_string(), "alias cycle: a -> b -> a");
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let (g, _) = graph(&[("a", Value::from("calc({a} * 2)"))]);
        assert_eq!(g.cycles(), vec![vec!["a", "a"]]);
    }

    #[test]
    fn test_three_node_cycle_names_every_member() {
        let (g, _) = graph(&[
            ("c", Value::from("{a}")),
            ("a", Value::from("{b}")),
            ("b", Value::from("{c}")),
            ("d", Value::from("{a}")),
        ]);
        assert_eq!(g.cycles(), vec![vec!["a", "b", "c", "a"]]);
    }

    #[test]
    fn test_independent_cycles_are_all_reported() {
        let (g, _) = graph(&[
            ("a", Value::from("{b}")),
            ("b", Value::from("{a}")),
            ("x", Value::from("{x}")),
        ]);
        let cycles = g.cycles();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[1], vec!["x", "x"]);
    }
}
