use std::ops::{Deref, DerefMut};

use crate::config::GraphConfig;
use crate::graph_core::{GraphCore, Orientation};

/// Directed multigraph; edges (arrows) run from `edge_vertex1` (tail) to
/// `edge_vertex2` (head) and are only followed in that direction.
pub struct DirectedGraph<V, E> {
    core: GraphCore<V, E>,
}

impl<V, E> DirectedGraph<V, E> {
    pub fn new() -> Self {
        Self::with_config(&GraphConfig::default())
    }

    pub fn with_config(config: &GraphConfig) -> Self {
        Self {
            core: GraphCore::new(Orientation::Directed, config),
        }
    }

    /// Whether any directed cycle exists.
    ///
    /// Depth-first search from every unvisited vertex (the graph may be
    /// disconnected); an arrow back to a vertex still on the search stack
    /// closes a cycle. Self-loops count as cycles.
    pub fn is_cyclic(&self) -> bool {
        let adjacency = self.adjacency_list();
        let capacity = self.vertex_capacity();
        let mut visited = vec![false; capacity];
        let mut on_stack = vec![false; capacity];

        for root in self.vertices() {
            if visited[root] {
                continue;
            }
            visited[root] = true;
            on_stack[root] = true;
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            while let Some(frame) = stack.last_mut() {
                let (v, position) = *frame;
                let outgoing = adjacency[v].as_deref().unwrap_or(&[]);
                match outgoing.get(position) {
                    Some(&e) => {
                        frame.1 += 1;
                        let Some(head) = self.follow(e, v) else {
                            continue;
                        };
                        if on_stack[head] {
                            return true;
                        }
                        if !visited[head] {
                            visited[head] = true;
                            on_stack[head] = true;
                            stack.push((head, 0));
                        }
                    }
                    None => {
                        on_stack[v] = false;
                        stack.pop();
                    }
                }
            }
        }
        false
    }
}

impl<V, E> Default for DirectedGraph<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Deref for DirectedGraph<V, E> {
    type Target = GraphCore<V, E>;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

impl<V, E> DerefMut for DirectedGraph<V, E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.core
    }
}
