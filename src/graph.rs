//! Directed dependency graph over module names and header paths
//!
//! Thin wrapper around a petgraph `DiGraph` with string-interned nodes.
//! Nodes are either module names ("Core") or project-relative header paths
//! ("Source/Game/Public/Foo.h"); edges point from dependent to dependency.

use petgraph::algo::tarjan_scc;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    indices: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.indices.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.indices.insert(name.to_string(), idx);
        idx
    }

    /// Add a dependency edge, deduplicating repeats
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let a = self.intern(from);
        let b = self.intern(to);
        self.graph.update_edge(a, b, ());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// Direct dependencies of a node (empty when the node is unknown)
    pub fn successors(&self, name: &str) -> Vec<&str> {
        match self.indices.get(name) {
            Some(&idx) => self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .map(|n| self.graph[n].as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Non-trivial cycles, one per strongly connected component.
    ///
    /// Each cycle is ordered by walking edges inside its component, so the
    /// members read as an actual dependency chain. Self-references are
    /// ignored, matching the crawler's reporting rules.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| self.order_cycle(&scc))
            .collect()
    }

    fn order_cycle(&self, scc: &[NodeIndex]) -> Vec<String> {
        let members: HashSet<NodeIndex> = scc.iter().copied().collect();
        let mut ordered = Vec::with_capacity(scc.len());
        let mut visited = HashSet::new();
        let mut current = scc[0];

        loop {
            ordered.push(self.graph[current].clone());
            visited.insert(current);

            let next = self
                .graph
                .neighbors_directed(current, Direction::Outgoing)
                .find(|n| members.contains(n) && !visited.contains(n));

            match next {
                Some(n) => current = n,
                None => break,
            }
        }

        // Members unreachable along the walked path still belong to the cycle
        for &idx in scc {
            if !visited.contains(&idx) {
                ordered.push(self.graph[idx].clone());
            }
        }

        ordered
    }

    /// Render the graph as Graphviz DOT
    pub fn to_dot(&self) -> String {
        // Dot's Display needs displayable edge weights
        let labeled = self.graph.map(|_, node| node.clone(), |_, _| "");
        format!("{}", Dot::with_config(&labeled, &[Config::EdgeNoLabel]))
    }
}
