//! # gat-graph: Network Topology Graphs
//!
//! Index-based graph storage used to represent power network topology
//! (bus/breaker connectivity, switch trees) independently of any equipment
//! model. Vertex and edge payloads are opaque to this crate.
//!
//! ## Design
//!
//! - Vertices and edges are addressed by `usize` indices handed out by an
//!   arena. Removed indices are recycled first, so indices are stable but not
//!   necessarily contiguous.
//! - The adjacency list is a derived cache: every structural mutation drops
//!   it and the next reader rebuilds it under a lock.
//! - Traversal, path search and cycle detection run on explicit stacks, so
//!   long radial feeders do not exhaust the thread stack.
//!
//! ## Quick Start
//!
//! ```rust
//! use gat_graph::*;
//!
//! let mut graph: UndirectedGraph<&str, &str> = UndirectedGraph::new();
//! let b1 = graph.add_vertex();
//! let b2 = graph.add_vertex();
//! let b3 = graph.add_vertex();
//! graph.set_vertex_object(b3, Some("load bus")).unwrap();
//! graph.add_edge(b1, b2, Some("line 1-2")).unwrap();
//! graph.add_edge(b2, b3, Some("breaker 2-3")).unwrap();
//!
//! let paths = graph
//!     .find_all_paths(b1, |bus| bus.is_some(), |_| false)
//!     .unwrap();
//! assert_eq!(paths, vec![vec![0, 1]]);
//!
//! let components = graph.connected_components();
//! assert_eq!(components.component_sizes, vec![3]);
//! ```
//!
//! ## Modules
//!
//! - [`graph_core`] - vertex/edge arena, adjacency cache, listeners
//! - [`traverse`] - depth/breadth-first traversal and all-paths search
//! - [`graph_utils`] - connected components, isolated vertex pruning, stats, DOT export

mod arena;
pub mod config;
pub mod directed;
pub mod error;
pub mod graph_core;
pub mod graph_utils;
pub mod listener;
pub mod traverse;
pub mod undirected;

pub use config::GraphConfig;
pub use directed::DirectedGraph;
pub use error::{ErrorKind, GraphError, GraphResult};
pub use graph_core::{AdjacencyList, GraphCore, Orientation};
pub use graph_utils::{
    compute_connected_components, export_dot, graph_stats, remove_isolated_vertices,
    ConnectedComponents, GraphStats,
};
pub use listener::{GraphListener, ListenerId};
pub use traverse::{TraversalType, TraverseResult};
pub use undirected::UndirectedGraph;
