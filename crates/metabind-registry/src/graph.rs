//! Directed graph with a deterministic topological sort.
//!
//! Both the overload planner and the class sorter build a "must precede"
//! graph and need the same ordering on every run, so node and edge order
//! always follow insertion order.
//!
//! ## Algorithm
//!
//! Kahn's algorithm with a stack:
//! 1. Seed the stack with every zero-indegree node, in insertion order
//! 2. Pop the most recently pushed node and append it to the order
//! 3. Decrement each successor's indegree (in edge insertion order) and push
//!    those that reach zero
//! 4. Nodes never reached are returned as the cyclic remainder
//!
//! ```
//! use metabind_registry::Graph;
//!
//! let mut graph = Graph::new();
//! graph.add_node(0);
//! graph.add_node(1);
//! assert_eq!(graph.topological_sort().order, vec![1, 0]);
//! ```

use std::fmt::{self, Write as _};
use std::hash::Hash;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

/// Result of [`Graph::topological_sort`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopoSortResult<N> {
    /// Processed nodes in dependency order.
    pub order: Vec<N>,
    /// Nodes left over because they sit on or behind a cycle, in insertion order.
    pub cyclic: Vec<N>,
}

impl<N> TopoSortResult<N> {
    pub fn is_valid(&self) -> bool {
        self.cyclic.is_empty()
    }
}

/// A directed graph keyed by node value.
#[derive(Debug, Clone)]
pub struct Graph<N> {
    graph: DiGraph<N, ()>,
    index: FxHashMap<N, NodeIndex>,
}

impl<N> Default for Graph<N> {
    fn default() -> Self {
        Self {
            graph: DiGraph::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<N: Clone + Eq + Hash> Graph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from nodes alone.
    pub fn from_nodes(nodes: impl IntoIterator<Item = N>) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node);
        }
        graph
    }

    /// Add a node. Returns `false` if it already existed.
    pub fn add_node(&mut self, node: N) -> bool {
        if self.index.contains_key(&node) {
            return false;
        }
        let idx = self.graph.add_node(node.clone());
        self.index.insert(node, idx);
        true
    }

    pub fn has_node(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    /// Add `from -> to` (`from` precedes `to`).
    ///
    /// Returns `false` if either node is missing or the edge already exists.
    pub fn add_edge(&mut self, from: &N, to: &N) -> bool {
        let (Some(&a), Some(&b)) = (self.index.get(from), self.index.get(to)) else {
            return false;
        };
        if self.graph.contains_edge(a, b) {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    /// Remove `from -> to`. Returns `false` if there was no such edge.
    pub fn remove_edge(&mut self, from: &N, to: &N) -> bool {
        let (Some(&a), Some(&b)) = (self.index.get(from), self.index.get(to)) else {
            return false;
        };
        match self.graph.find_edge(a, b) {
            Some(edge) => {
                self.graph.remove_edge(edge);
                true
            }
            None => false,
        }
    }

    pub fn contains_edge(&self, from: &N, to: &N) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.graph.node_weights()
    }

    /// Successors of `node` in edge insertion order.
    pub fn successors(&self, node: &N) -> Vec<&N> {
        match self.index.get(node) {
            Some(&idx) => self
                .successor_indices(idx)
                .into_iter()
                .map(|s| &self.graph[s])
                .collect(),
            None => Vec::new(),
        }
    }

    /// All edges, grouped by source in node order.
    pub fn edges(&self) -> Vec<(&N, &N)> {
        self.graph
            .node_indices()
            .flat_map(|a| {
                self.successor_indices(a)
                    .into_iter()
                    .map(move |b| (a, b))
            })
            .map(|(a, b)| (&self.graph[a], &self.graph[b]))
            .collect()
    }

    /// Sort the nodes so that every edge points forward.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn topological_sort(&self) -> TopoSortResult<N> {
        let count = self.graph.node_count();
        let mut indegree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|n| self.graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();

        let mut stack: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|n| indegree[n.index()] == 0)
            .collect();
        let mut visited = vec![false; count];
        let mut order = Vec::with_capacity(count);

        while let Some(node) = stack.pop() {
            visited[node.index()] = true;
            order.push(self.graph[node].clone());
            for succ in self.successor_indices(node) {
                let degree = &mut indegree[succ.index()];
                *degree -= 1;
                if *degree == 0 {
                    stack.push(succ);
                }
            }
        }

        let cyclic = self
            .graph
            .node_indices()
            .filter(|n| !visited[n.index()])
            .map(|n| self.graph[n].clone())
            .collect();

        TopoSortResult { order, cyclic }
    }

    // petgraph walks adjacency newest-first; reverse for insertion order.
    fn successor_indices(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut succ: Vec<NodeIndex> = self.graph.neighbors_directed(node, Direction::Outgoing).collect();
        succ.reverse();
        succ
    }
}

impl<N: Clone + Eq + Hash + fmt::Display> Graph<N> {
    /// Render the graph in Graphviz DOT syntax.
    pub fn to_dot(&self, name: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digraph \"{}\" {{", escape(name));
        for node in self.nodes() {
            let _ = writeln!(out, "    \"{}\";", escape(&node.to_string()));
        }
        for (a, b) in self.edges() {
            let _ = writeln!(
                out,
                "    \"{}\" -> \"{}\";",
                escape(&a.to_string()),
                escape(&b.to_string())
            );
        }
        out.push_str("}\n");
        out
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
