//! Error types for graph storage and traversal.
//!
//! Every failure here is a broken caller contract (an index that does not
//! exist, a vertex removed while still wired to an edge, ...). Nothing is
//! retried internally; the error is surfaced at the call site and the graph
//! is left exactly as it was before the call.
//!
//! # Example
//!
//! ```
//! use gat_graph::{ErrorKind, GraphError, UndirectedGraph};
//!
//! let mut graph: UndirectedGraph<(), ()> = UndirectedGraph::new();
//! let err = graph.remove_vertex(3).unwrap_err();
//! assert!(matches!(err, GraphError::VertexNotFound(3)));
//! assert_eq!(err.kind(), ErrorKind::NotFound);
//! ```

use thiserror::Error;

/// Coarse classification of [`GraphError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Index out of range or pointing at a freed slot.
    NotFound,
    /// Structural removal blocked by remaining edges.
    Conflict,
    /// Argument outside accepted limits (vertex index, buffer length).
    InvalidArgument,
    /// Configuration could not be read or parsed.
    Config,
}

/// Errors raised by graph operations.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Vertex {0} not found")]
    VertexNotFound(usize),

    #[error("Edge {0} not found")]
    EdgeNotFound(usize),

    #[error("An edge is connected to vertex {0}")]
    VertexInUse(usize),

    #[error("Cannot remove all vertices because there are still {0} edges in the graph")]
    EdgesRemaining(usize),

    #[error("Vertex index too high: {vertex}. Limit is {limit}")]
    VertexLimitExceeded { vertex: usize, limit: usize },

    #[error("Encountered array is too small ({len} < {required})")]
    EncounteredTooSmall { len: usize, required: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::VertexNotFound(_) | GraphError::EdgeNotFound(_) => ErrorKind::NotFound,
            GraphError::VertexInUse(_) | GraphError::EdgesRemaining(_) => ErrorKind::Conflict,
            GraphError::VertexLimitExceeded { .. } | GraphError::EncounteredTooSmall { .. } => {
                ErrorKind::InvalidArgument
            }
            GraphError::Config(_) | GraphError::Io(_) => ErrorKind::Config,
        }
    }
}

impl From<toml::de::Error> for GraphError {
    fn from(err: toml::de::Error) -> Self {
        GraphError::Config(err.to_string())
    }
}

/// Convenience alias for graph results.
pub type GraphResult<T> = Result<T, GraphError>;
