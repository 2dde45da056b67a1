//! Representation-independent matrix handle and factories.
//!
//! Algorithms written against [`Matrix`] work with either storage; the
//! caller picks the representation through a [`MatrixFactory`]. Operations
//! combining two matrices require both to use the same representation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dense::DenseMatrix;
use crate::error::{MatrixError, MatrixResult};
use crate::lu::LuDecomposition;
use crate::sparse::SparseMatrix;

/// Row and column counts with bounds checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub rows: usize,
    pub columns: usize,
}

impl Shape {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.columns
    }

    pub fn element_count(&self) -> Option<usize> {
        self.rows.checked_mul(self.columns)
    }

    /// `OutOfBounds` naming the offending index and the valid range.
    pub fn check_bounds(&self, i: usize, j: usize) -> MatrixResult<()> {
        if i >= self.rows {
            return Err(MatrixError::out_of_bounds("row", i, self.rows));
        }
        if j >= self.columns {
            return Err(MatrixError::out_of_bounds("column", j, self.columns));
        }
        Ok(())
    }
}

/// Storage layout of a [`Matrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Dense,
    Sparse,
}

/// Creates empty matrices of one representation.
pub trait MatrixFactory {
    fn representation(&self) -> Representation;

    /// `estimated_value_count` is a pre-allocation hint for sparse storage.
    fn create(
        &self,
        rows: usize,
        columns: usize,
        estimated_value_count: usize,
    ) -> MatrixResult<Matrix>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DenseMatrixFactory;

impl MatrixFactory for DenseMatrixFactory {
    fn representation(&self) -> Representation {
        Representation::Dense
    }

    fn create(&self, rows: usize, columns: usize, _estimated: usize) -> MatrixResult<Matrix> {
        Ok(Matrix::Dense(DenseMatrix::new(rows, columns)?))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SparseMatrixFactory;

impl MatrixFactory for SparseMatrixFactory {
    fn representation(&self) -> Representation {
        Representation::Sparse
    }

    fn create(&self, rows: usize, columns: usize, estimated: usize) -> MatrixResult<Matrix> {
        Ok(Matrix::Sparse(SparseMatrix::new(rows, columns, estimated)?))
    }
}

/// A dense or sparse matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Matrix {
    Dense(DenseMatrix),
    Sparse(SparseMatrix),
}

impl From<DenseMatrix> for Matrix {
    fn from(matrix: DenseMatrix) -> Self {
        Matrix::Dense(matrix)
    }
}

impl From<SparseMatrix> for Matrix {
    fn from(matrix: SparseMatrix) -> Self {
        Matrix::Sparse(matrix)
    }
}

impl Matrix {
    pub fn shape(&self) -> Shape {
        match self {
            Matrix::Dense(m) => m.shape(),
            Matrix::Sparse(m) => m.shape(),
        }
    }

    pub fn rows(&self) -> usize {
        self.shape().rows
    }

    pub fn columns(&self) -> usize {
        self.shape().columns
    }

    pub fn representation(&self) -> Representation {
        match self {
            Matrix::Dense(_) => Representation::Dense,
            Matrix::Sparse(_) => Representation::Sparse,
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, Matrix::Sparse(_))
    }

    /// Element read; sparse storage has no random access and reports
    /// `Unsupported`.
    pub fn get(&self, i: usize, j: usize) -> MatrixResult<f64> {
        match self {
            Matrix::Dense(m) => m.get(i, j),
            Matrix::Sparse(m) => {
                m.shape().check_bounds(i, j)?;
                Err(MatrixError::Unsupported(
                    "get is not supported by sparse matrices".to_string(),
                ))
            }
        }
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) -> MatrixResult<()> {
        match self {
            Matrix::Dense(m) => m.set(i, j, value),
            Matrix::Sparse(m) => m.set(i, j, value),
        }
    }

    pub fn add(&mut self, i: usize, j: usize, value: f64) -> MatrixResult<()> {
        match self {
            Matrix::Dense(m) => m.add(i, j, value),
            Matrix::Sparse(m) => m.add(i, j, value),
        }
    }

    /// `add`, returning a storage index usable with [`Matrix::set_at_index`]
    /// and [`Matrix::add_at_index`].
    pub fn add_and_get_index(&mut self, i: usize, j: usize, value: f64) -> MatrixResult<usize> {
        match self {
            Matrix::Dense(m) => m.add_and_get_index(i, j, value),
            Matrix::Sparse(m) => m.add_and_get_index(i, j, value),
        }
    }

    pub fn set_at_index(&mut self, index: usize, value: f64) -> MatrixResult<()> {
        match self {
            Matrix::Dense(m) => m.set_at_index(index, value),
            Matrix::Sparse(m) => m.set_at_index(index, value),
        }
    }

    pub fn add_at_index(&mut self, index: usize, value: f64) -> MatrixResult<()> {
        match self {
            Matrix::Dense(m) => m.add_at_index(index, value),
            Matrix::Sparse(m) => m.add_at_index(index, value),
        }
    }

    /// Zero all values, keeping shape (and sparse structure).
    pub fn reset(&mut self) {
        match self {
            Matrix::Dense(m) => m.reset(),
            Matrix::Sparse(m) => m.reset(),
        }
    }

    /// Stored value count: `rows * columns` for dense, entries for sparse.
    pub fn value_count(&self) -> usize {
        match self {
            Matrix::Dense(m) => m.value_count(),
            Matrix::Sparse(m) => m.value_count(),
        }
    }

    pub fn iterate_non_zero_value<F>(&self, handler: F)
    where
        F: FnMut(usize, usize, f64),
    {
        match self {
            Matrix::Dense(m) => m.iterate_non_zero_value(handler),
            Matrix::Sparse(m) => m.iterate_non_zero_value(handler),
        }
    }

    pub fn iterate_non_zero_value_of_column<F>(&self, j: usize, handler: F) -> MatrixResult<()>
    where
        F: FnMut(usize, usize, f64),
    {
        match self {
            Matrix::Dense(m) => m.iterate_non_zero_value_of_column(j, handler),
            Matrix::Sparse(m) => m.iterate_non_zero_value_of_column(j, handler),
        }
    }

    /// Copy into a new matrix built by `factory`, element by element.
    ///
    /// Entries are accumulated into the target, so sparse duplicates of one
    /// element are summed rather than the last one overwriting the others.
    pub fn copy(&self, factory: &dyn MatrixFactory) -> MatrixResult<Matrix> {
        let mut copy = factory.create(self.rows(), self.columns(), self.value_count())?;
        let mut result = Ok(());
        self.iterate_non_zero_value(|i, j, value| {
            if result.is_ok() {
                result = copy.add(i, j, value);
            }
        });
        result.map(|_| copy)
    }

    /// Convert to the representation of `factory`; a clone when it already
    /// matches.
    pub fn to(&self, factory: &dyn MatrixFactory) -> MatrixResult<Matrix> {
        if factory.representation() == self.representation() {
            Ok(self.clone())
        } else {
            self.copy(factory)
        }
    }

    pub fn to_dense(&self) -> MatrixResult<DenseMatrix> {
        match self {
            Matrix::Dense(m) => Ok(m.clone()),
            Matrix::Sparse(m) => m.to_dense(),
        }
    }

    pub fn to_sparse(&self) -> MatrixResult<SparseMatrix> {
        match self {
            Matrix::Dense(m) => m.to_sparse(),
            Matrix::Sparse(m) => Ok(m.clone()),
        }
    }

    /// `scalar * self * other`.
    pub fn times(&self, other: &Matrix, scalar: f64) -> MatrixResult<Matrix> {
        match (self, other) {
            (Matrix::Dense(a), Matrix::Dense(b)) => Ok(Matrix::Dense(a.times_scaled(b, scalar)?)),
            (Matrix::Sparse(a), Matrix::Sparse(b)) => {
                Ok(Matrix::Sparse(a.times_scaled(b, scalar)?))
            }
            _ => Err(mixed_representations("times")),
        }
    }

    /// `alpha * self + beta * other`.
    pub fn add_matrix(&self, other: &Matrix, alpha: f64, beta: f64) -> MatrixResult<Matrix> {
        match (self, other) {
            (Matrix::Dense(a), Matrix::Dense(b)) => {
                Ok(Matrix::Dense(a.add_matrix(b, alpha, beta)?))
            }
            (Matrix::Sparse(a), Matrix::Sparse(b)) => {
                Ok(Matrix::Sparse(a.add_matrix(b, alpha, beta)?))
            }
            _ => Err(mixed_representations("add")),
        }
    }

    pub fn transpose(&self) -> MatrixResult<Matrix> {
        match self {
            Matrix::Dense(m) => Ok(Matrix::Dense(m.transpose())),
            Matrix::Sparse(m) => Ok(Matrix::Sparse(m.transpose()?)),
        }
    }

    /// LU factorization; fails with `NotSquare` for rectangular matrices.
    pub fn decompose_lu(&self) -> MatrixResult<LuDecomposition> {
        match self {
            Matrix::Dense(m) => Ok(LuDecomposition::Dense(m.decompose_lu()?)),
            Matrix::Sparse(m) => Ok(LuDecomposition::Sparse(m.decompose_lu()?)),
        }
    }
}

fn mixed_representations(operation: &str) -> MatrixError {
    MatrixError::Unsupported(format!(
        "{operation} needs both matrices in the same representation"
    ))
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matrix::Dense(m) => fmt::Display::fmt(m, f),
            Matrix::Sparse(m) => fmt::Display::fmt(m, f),
        }
    }
}
