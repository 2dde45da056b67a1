//! LU decomposition facade.
//!
//! Dense matrices are factorized in-process with `faer`; sparse matrices
//! are factorized by a [`crate::kernel::SparseLuKernel`]. Solves overwrite
//! their right-hand side with the solution.

mod dense;
mod sparse;

pub use dense::DenseLuDecomposition;
pub use sparse::SparseLuDecomposition;

use crate::config::MatrixConfig;
use crate::dense::DenseMatrix;
use crate::error::{MatrixError, MatrixResult};
use crate::matrix::Matrix;

/// LU decomposition of a [`Matrix`], dense or sparse.
pub enum LuDecomposition {
    Dense(DenseLuDecomposition),
    Sparse(SparseLuDecomposition),
}

impl LuDecomposition {
    /// Factorize `matrix` with the tolerances and sparse kernel of `config`.
    pub fn with_config(matrix: &Matrix, config: &MatrixConfig) -> MatrixResult<Self> {
        config.validate()?;
        match matrix {
            Matrix::Dense(m) => Ok(LuDecomposition::Dense(DenseLuDecomposition::with_tolerance(
                m,
                config.singularity_tolerance,
            )?)),
            Matrix::Sparse(m) => Ok(LuDecomposition::Sparse(
                SparseLuDecomposition::with_rgrowth_threshold(
                    m,
                    config.kernel_kind()?.build_kernel(),
                    config.rgrowth_threshold,
                )?,
            )),
        }
    }

    pub fn size(&self) -> usize {
        match self {
            LuDecomposition::Dense(lu) => lu.size(),
            LuDecomposition::Sparse(lu) => lu.size(),
        }
    }

    /// Refactorize from `matrix`, which must use the same representation.
    pub fn update(&mut self, matrix: &Matrix) -> MatrixResult<()> {
        match (self, matrix) {
            (LuDecomposition::Dense(lu), Matrix::Dense(m)) => lu.update(m),
            (LuDecomposition::Sparse(lu), Matrix::Sparse(m)) => lu.update(m),
            _ => Err(MatrixError::Unsupported(
                "update needs a matrix in the decomposed representation".to_string(),
            )),
        }
    }

    /// Solve `A x = b`, overwriting `b` with `x`.
    pub fn solve(&self, b: &mut [f64]) -> MatrixResult<()> {
        match self {
            LuDecomposition::Dense(lu) => lu.solve(b),
            LuDecomposition::Sparse(lu) => lu.solve(b),
        }
    }

    /// Solve `A X = B` for every column of `b`.
    pub fn solve_matrix(&self, b: &mut DenseMatrix) -> MatrixResult<()> {
        match self {
            LuDecomposition::Dense(lu) => lu.solve_matrix(b),
            LuDecomposition::Sparse(lu) => lu.solve_matrix(b),
        }
    }

    /// Solve `Aᵀ x = b`.
    pub fn solve_transposed(&self, b: &mut [f64]) -> MatrixResult<()> {
        match self {
            LuDecomposition::Dense(lu) => lu.solve_transposed(b),
            LuDecomposition::Sparse(lu) => lu.solve_transposed(b),
        }
    }

    pub fn solve_transposed_matrix(&self, b: &mut DenseMatrix) -> MatrixResult<()> {
        match self {
            LuDecomposition::Dense(lu) => lu.solve_transposed_matrix(b),
            LuDecomposition::Sparse(lu) => lu.solve_transposed_matrix(b),
        }
    }

    pub fn close(&mut self) -> MatrixResult<()> {
        match self {
            LuDecomposition::Dense(lu) => lu.close(),
            LuDecomposition::Sparse(lu) => lu.close(),
        }
    }
}
