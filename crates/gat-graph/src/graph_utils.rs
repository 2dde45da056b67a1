use std::fmt::Write;

use crate::graph_core::{GraphCore, Orientation};
use crate::UndirectedGraph;

/// Connected component labelling (see [`compute_connected_components`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedComponents {
    /// Component label per vertex slot; `None` for free slots.
    pub component_numbers: Vec<Option<usize>>,
    /// Vertex count per component, largest first.
    pub component_sizes: Vec<usize>,
}

impl ConnectedComponents {
    pub fn component_count(&self) -> usize {
        self.component_sizes.len()
    }

    /// Vertices belonging to component `component`, in index order.
    pub fn members(&self, component: usize) -> Vec<usize> {
        self.component_numbers
            .iter()
            .enumerate()
            .filter(|(_, label)| **label == Some(component))
            .map(|(v, _)| v)
            .collect()
    }
}

/// Labels connected components of an adjacency structure (neighbour
/// vertices per vertex slot, `None` for free slots) by depth-first flood
/// fill, then renumbers labels so that component 0 is the largest. Ties keep
/// discovery order, so repeated calls on the same structure agree.
pub fn compute_connected_components(adjacency: &[Option<Vec<usize>>]) -> ConnectedComponents {
    let mut component_numbers: Vec<Option<usize>> = vec![None; adjacency.len()];
    let mut discovered_sizes: Vec<usize> = Vec::new();
    let mut stack = Vec::new();

    for root in 0..adjacency.len() {
        if adjacency[root].is_none() || component_numbers[root].is_some() {
            continue;
        }
        let label = discovered_sizes.len();
        let mut size = 0;
        component_numbers[root] = Some(label);
        stack.push(root);
        while let Some(v) = stack.pop() {
            size += 1;
            for &neighbor in adjacency[v].as_deref().unwrap_or(&[]) {
                if neighbor < adjacency.len()
                    && adjacency[neighbor].is_some()
                    && component_numbers[neighbor].is_none()
                {
                    component_numbers[neighbor] = Some(label);
                    stack.push(neighbor);
                }
            }
        }
        discovered_sizes.push(size);
    }

    // largest first; sort_by is stable so equal sizes keep discovery order
    let mut order: Vec<usize> = (0..discovered_sizes.len()).collect();
    order.sort_by(|a, b| discovered_sizes[*b].cmp(&discovered_sizes[*a]));
    let mut renumber = vec![0; discovered_sizes.len()];
    for (new_label, &old_label) in order.iter().enumerate() {
        renumber[old_label] = new_label;
    }

    ConnectedComponents {
        component_numbers: component_numbers
            .into_iter()
            .map(|label| label.map(|old| renumber[old]))
            .collect(),
        component_sizes: order.iter().map(|&old| discovered_sizes[old]).collect(),
    }
}

/// Removes isolated vertices without payload from an undirected graph.
/// Returns the removed indices.
pub fn remove_isolated_vertices<V, E>(graph: &mut UndirectedGraph<V, E>) -> Vec<usize> {
    graph.remove_isolated_vertices()
}

/// Summary statistics (density, degree, connected components).
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub connected_components: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub density: f64,
}

/// Degree distribution and density of an undirected graph.
pub fn graph_stats<V, E>(graph: &UndirectedGraph<V, E>) -> GraphStats {
    let node_count = graph.vertex_count();
    let edge_count = graph.edge_count();
    let adjacency = graph.adjacency_list();
    let degrees: Vec<usize> = adjacency.iter().flatten().map(Vec::len).collect();
    let min_degree = degrees.iter().copied().min().unwrap_or(0);
    let max_degree = degrees.iter().copied().max().unwrap_or(0);
    let avg_degree = if node_count == 0 {
        0.0
    } else {
        degrees.iter().sum::<usize>() as f64 / node_count as f64
    };
    let density = if node_count < 2 {
        0.0
    } else {
        2.0 * edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    };
    GraphStats {
        node_count,
        edge_count,
        connected_components: graph.connected_components().component_count(),
        min_degree,
        avg_degree,
        max_degree,
        density,
    }
}

/// Render the topology as Graphviz DOT.
pub fn export_dot<V, E, F>(graph: &GraphCore<V, E>, label: F) -> String
where
    F: Fn(usize, Option<&V>) -> String,
{
    let (keyword, link) = match graph.orientation() {
        Orientation::Undirected => ("graph", "--"),
        Orientation::Directed => ("digraph", "->"),
    };
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{keyword} gat_network {{");
    for (v, object) in graph.vertex_objects() {
        let text = sanitize_label(&label(v, object));
        let _ = writeln!(buffer, "  n{v} [label=\"{text}\"];");
    }
    for e in graph.edges() {
        if let (Ok(source), Ok(target)) = (graph.edge_vertex1(e), graph.edge_vertex2(e)) {
            let _ = writeln!(buffer, "  n{source} {link} n{target};");
        }
    }
    buffer.push('}');
    buffer
}

fn sanitize_label(label: &str) -> String {
    label.replace('"', "\\\"")
}
