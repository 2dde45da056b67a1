//! Error types for matrix storage, products and LU solves.

use thiserror::Error;

/// Coarse classification of [`MatrixError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Row, column or element index outside the matrix.
    OutOfBounds,
    /// Sparse fill went back to an earlier column.
    OrderingViolation,
    /// Operation needs a different shape (square, matching dimensions).
    InvalidShape,
    /// Operation not available for this representation.
    UnsupportedOperation,
    /// Numerical or kernel-side failure (singular matrix, kernel error).
    Numerical,
    /// Decomposition used after it was closed.
    Released,
    /// Configuration, serialization or I/O failure.
    Io,
}

/// Errors raised by matrix operations.
#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("Out of bound [0, {max}] {what} index: {index}")]
    OutOfBounds {
        what: &'static str,
        index: usize,
        max: usize,
    },

    #[error("Columns have to be filled in the right order (column {column} after column {current})")]
    ColumnOrder { column: usize, current: usize },

    #[error("matrix is not square ({rows}x{columns})")]
    NotSquare { rows: usize, columns: usize },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Invalid size: {0}")]
    InvalidSize(String),

    #[error("matrix is singular")]
    Singular,

    #[error("Sparse kernel failure: {0}")]
    Kernel(#[from] anyhow::Error),

    #[error("LU decomposition has been released")]
    Released,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MatrixError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MatrixError::OutOfBounds { .. } => ErrorKind::OutOfBounds,
            MatrixError::ColumnOrder { .. } => ErrorKind::OrderingViolation,
            MatrixError::NotSquare { .. }
            | MatrixError::DimensionMismatch(_)
            | MatrixError::InvalidSize(_) => ErrorKind::InvalidShape,
            MatrixError::Unsupported(_) => ErrorKind::UnsupportedOperation,
            MatrixError::Singular | MatrixError::Kernel(_) => ErrorKind::Numerical,
            MatrixError::Released => ErrorKind::Released,
            MatrixError::Serialization(_) | MatrixError::Config(_) | MatrixError::Io(_) => {
                ErrorKind::Io
            }
        }
    }

    pub(crate) fn out_of_bounds(what: &'static str, index: usize, len: usize) -> Self {
        MatrixError::OutOfBounds {
            what,
            index,
            max: len.saturating_sub(1),
        }
    }
}

impl From<toml::de::Error> for MatrixError {
    fn from(err: toml::de::Error) -> Self {
        MatrixError::Config(err.to_string())
    }
}

pub type MatrixResult<T> = Result<T, MatrixError>;
