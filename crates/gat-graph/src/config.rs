//! Graph construction settings.
//!
//! Settings can be read from a TOML file; unspecified values use the defaults
//! below.
//!
//! ```toml
//! vertex_limit = 100000
//! vertex_capacity = 64
//! edge_capacity = 96
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// Capacity hints and limits applied when a graph is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Highest vertex index (exclusive) accepted by `add_vertex_if_not_present`;
    /// `None` for no limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex_limit: Option<usize>,

    /// Initial vertex slot capacity.
    pub vertex_capacity: usize,

    /// Initial edge slot capacity.
    pub edge_capacity: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            vertex_limit: None,
            vertex_capacity: 10,
            edge_capacity: 15,
        }
    }
}

impl GraphConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> GraphResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> GraphResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Vertex limit with `None` resolved to unlimited.
    pub fn effective_vertex_limit(&self) -> usize {
        self.vertex_limit.unwrap_or(usize::MAX)
    }

    pub fn validate(&self) -> GraphResult<()> {
        if self.vertex_limit == Some(0) {
            return Err(GraphError::Config(
                "vertex_limit should be positive".to_string(),
            ));
        }
        Ok(())
    }
}
