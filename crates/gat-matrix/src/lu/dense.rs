use faer::prelude::*;
use faer::solvers::PartialPivLu;
use faer::Mat;

use crate::config::DEFAULT_SINGULARITY_TOLERANCE;
use crate::dense::DenseMatrix;
use crate::error::{MatrixError, MatrixResult};

/// LU factorization with partial pivoting of a dense square matrix.
pub struct DenseLuDecomposition {
    size: usize,
    tolerance: f64,
    lu: Option<PartialPivLu<f64>>,
}

impl DenseLuDecomposition {
    pub fn new(matrix: &DenseMatrix) -> MatrixResult<Self> {
        Self::with_tolerance(matrix, DEFAULT_SINGULARITY_TOLERANCE)
    }

    /// Pivots smaller than `tolerance` times the largest matrix entry are
    /// treated as zero.
    pub fn with_tolerance(matrix: &DenseMatrix, tolerance: f64) -> MatrixResult<Self> {
        if !matrix.shape().is_square() {
            return Err(MatrixError::NotSquare {
                rows: matrix.rows(),
                columns: matrix.columns(),
            });
        }
        Ok(Self {
            size: matrix.rows(),
            tolerance,
            lu: Some(factor(matrix, tolerance)?),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_closed(&self) -> bool {
        self.lu.is_none()
    }

    fn lu(&self) -> MatrixResult<&PartialPivLu<f64>> {
        self.lu.as_ref().ok_or(MatrixError::Released)
    }

    /// Refactorize after the values of a matrix of the same size changed.
    pub fn update(&mut self, matrix: &DenseMatrix) -> MatrixResult<()> {
        self.lu()?;
        if matrix.rows() != self.size || matrix.columns() != self.size {
            return Err(MatrixError::DimensionMismatch(format!(
                "expected a {0}x{0} matrix, got {1}x{2}",
                self.size,
                matrix.rows(),
                matrix.columns()
            )));
        }
        self.lu = Some(factor(matrix, self.tolerance)?);
        Ok(())
    }

    pub fn solve(&self, b: &mut [f64]) -> MatrixResult<()> {
        self.solve_in_place(b, 1, false)
    }

    pub fn solve_transposed(&self, b: &mut [f64]) -> MatrixResult<()> {
        self.solve_in_place(b, 1, true)
    }

    pub fn solve_matrix(&self, b: &mut DenseMatrix) -> MatrixResult<()> {
        self.check_rows(b)?;
        let columns = b.columns();
        self.solve_in_place(b.values_mut(), columns, false)
    }

    pub fn solve_transposed_matrix(&self, b: &mut DenseMatrix) -> MatrixResult<()> {
        self.check_rows(b)?;
        let columns = b.columns();
        self.solve_in_place(b.values_mut(), columns, true)
    }

    /// Drop the factorization; later calls fail with `Released`.
    pub fn close(&mut self) -> MatrixResult<()> {
        self.lu = None;
        Ok(())
    }

    fn check_rows(&self, b: &DenseMatrix) -> MatrixResult<()> {
        if b.rows() != self.size {
            return Err(MatrixError::DimensionMismatch(format!(
                "right-hand side has {} rows, expected {}",
                b.rows(),
                self.size
            )));
        }
        Ok(())
    }

    fn solve_in_place(&self, b: &mut [f64], columns: usize, transposed: bool) -> MatrixResult<()> {
        let lu = self.lu()?;
        let n = self.size;
        if b.len() != n * columns {
            return Err(MatrixError::DimensionMismatch(format!(
                "right-hand side has {} values, expected {}",
                b.len(),
                n * columns
            )));
        }
        let rhs = Mat::from_fn(n, columns, |i, j| b[j * n + i]);
        let x = if transposed {
            lu.solve_transpose(&rhs)
        } else {
            lu.solve(&rhs)
        };
        for j in 0..columns {
            for i in 0..n {
                let value = x.read(i, j);
                if !value.is_finite() {
                    return Err(MatrixError::Singular);
                }
                b[j * n + i] = value;
            }
        }
        Ok(())
    }
}

fn factor(matrix: &DenseMatrix, tolerance: f64) -> MatrixResult<PartialPivLu<f64>> {
    let a = matrix.to_faer();
    let scale = matrix.values().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let lu = a.partial_piv_lu();
    let u = lu.compute_u();
    for k in 0..matrix.rows() {
        let pivot = u.read(k, k).abs();
        if !pivot.is_finite() || pivot <= tolerance * scale {
            return Err(MatrixError::Singular);
        }
    }
    Ok(lu)
}
