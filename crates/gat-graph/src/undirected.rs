use std::ops::{Deref, DerefMut};

use crate::config::GraphConfig;
use crate::graph_core::{GraphCore, Orientation};
use crate::graph_utils::{compute_connected_components, ConnectedComponents};

/// Undirected multigraph with optional vertex/edge payloads.
///
/// Edges are usable from either endpoint by traversal and path search.
/// Storage, mutation, listeners and traversal come from [`GraphCore`].
///
/// ```
/// use gat_graph::{TraverseResult, UndirectedGraph};
///
/// let mut graph: UndirectedGraph<&str, &str> = UndirectedGraph::new();
/// let a = graph.add_vertex();
/// let b = graph.add_vertex();
/// graph.add_edge(a, b, Some("line")).unwrap();
///
/// let mut reached = vec![];
/// graph
///     .traverse(b, |_, _, v| {
///         reached.push(v);
///         TraverseResult::Continue
///     })
///     .unwrap();
/// assert_eq!(reached, vec![a]);
/// ```
pub struct UndirectedGraph<V, E> {
    core: GraphCore<V, E>,
}

impl<V, E> UndirectedGraph<V, E> {
    pub fn new() -> Self {
        Self::with_config(&GraphConfig::default())
    }

    pub fn with_config(config: &GraphConfig) -> Self {
        Self {
            core: GraphCore::new(Orientation::Undirected, config),
        }
    }

    /// Component label per vertex slot, largest component first.
    pub fn connected_components(&self) -> ConnectedComponents {
        compute_connected_components(&self.vertex_adjacency())
    }
}

impl<V, E> Default for UndirectedGraph<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Deref for UndirectedGraph<V, E> {
    type Target = GraphCore<V, E>;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

impl<V, E> DerefMut for UndirectedGraph<V, E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.core
    }
}
