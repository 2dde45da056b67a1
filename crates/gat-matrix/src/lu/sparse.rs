use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::dense::DenseMatrix;
use crate::error::{MatrixError, MatrixResult};
use crate::kernel::{KernelHandle, SparseLuKernel};
use crate::sparse::SparseMatrix;

/// Sparse LU factorization held by a [`SparseLuKernel`].
///
/// The kernel-side factorization is released exactly once: by
/// [`close`](Self::close), or on drop if `close` was never called.
pub struct SparseLuDecomposition {
    kernel: Arc<dyn SparseLuKernel>,
    handle: Option<KernelHandle>,
    size: usize,
    value_count: usize,
    rgrowth_threshold: f64,
}

impl SparseLuDecomposition {
    pub fn new(matrix: &SparseMatrix, kernel: Arc<dyn SparseLuKernel>) -> MatrixResult<Self> {
        Self::with_rgrowth_threshold(matrix, kernel, matrix.rgrowth_threshold())
    }

    /// Factorize with an explicit threshold instead of the matrix's own.
    pub fn with_rgrowth_threshold(
        matrix: &SparseMatrix,
        kernel: Arc<dyn SparseLuKernel>,
        rgrowth_threshold: f64,
    ) -> MatrixResult<Self> {
        if !matrix.shape().is_square() {
            return Err(MatrixError::NotSquare {
                rows: matrix.rows(),
                columns: matrix.columns(),
            });
        }
        let handle = kernel.factorize(&matrix.csc(), rgrowth_threshold)?;
        debug!(
            kernel = kernel.name(),
            handle = handle.id(),
            size = matrix.rows(),
            nnz = matrix.value_count(),
            "sparse LU decomposition created"
        );
        Ok(Self {
            kernel,
            handle: Some(handle),
            size: matrix.rows(),
            value_count: matrix.value_count(),
            rgrowth_threshold,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_none()
    }

    fn handle(&self) -> MatrixResult<KernelHandle> {
        self.handle.ok_or(MatrixError::Released)
    }

    /// Refactorize after the values of the matrix changed. The matrix must
    /// keep its size and stored value count.
    pub fn update(&mut self, matrix: &SparseMatrix) -> MatrixResult<()> {
        let handle = self.handle()?;
        if matrix.rows() != self.size
            || matrix.columns() != self.size
            || matrix.value_count() != self.value_count
        {
            return Err(MatrixError::DimensionMismatch(format!(
                "expected a {0}x{0} matrix with {1} values, got {2}x{3} with {4}",
                self.size,
                self.value_count,
                matrix.rows(),
                matrix.columns(),
                matrix.value_count()
            )));
        }
        self.kernel
            .refactorize(handle, &matrix.csc(), self.rgrowth_threshold)?;
        Ok(())
    }

    pub fn solve(&self, b: &mut [f64]) -> MatrixResult<()> {
        self.solve_in_place(b, 1, false)
    }

    pub fn solve_transposed(&self, b: &mut [f64]) -> MatrixResult<()> {
        self.solve_in_place(b, 1, true)
    }

    pub fn solve_matrix(&self, b: &mut DenseMatrix) -> MatrixResult<()> {
        let columns = b.columns();
        self.check_rows(b)?;
        self.solve_in_place(b.values_mut(), columns, false)
    }

    pub fn solve_transposed_matrix(&self, b: &mut DenseMatrix) -> MatrixResult<()> {
        let columns = b.columns();
        self.check_rows(b)?;
        self.solve_in_place(b.values_mut(), columns, true)
    }

    /// Release the kernel factorization now, reporting a release failure.
    /// Closing twice is a no-op.
    pub fn close(&mut self) -> MatrixResult<()> {
        if let Some(handle) = self.handle.take() {
            self.kernel.release(handle)?;
            debug!(handle = handle.id(), "sparse LU decomposition closed");
        }
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
        let handle = self.handle()?;
        if b.len() != self.size * columns {
            return Err(MatrixError::DimensionMismatch(format!(
                "right-hand side has {} values, expected {}",
                b.len(),
                self.size * columns
            )));
        }
        self.kernel.solve(handle, b, columns, transposed)?;
        Ok(())
    }
}

impl Drop for SparseLuDecomposition {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = self.kernel.release(handle) {
                warn!(handle = handle.id(), error = %err, "failed to release sparse LU");
            }
        }
    }
}

impl fmt::Debug for SparseLuDecomposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseLuDecomposition")
            .field("kernel", &self.kernel.name())
            .field("handle", &self.handle)
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::kernel::FaerKernel;

    fn matrix_5x5() -> SparseMatrix {
        // 2  3  0  0  0
        // 3  0  4  0  6
        // 0 -1 -3  2  0
        // 0  0  1  0  0
        // 0  4  2  0  1
        let mut m = SparseMatrix::new(5, 5, 12).unwrap();
        m.set(0, 0, 2.0).unwrap();
        m.set(1, 0, 3.0).unwrap();
        m.set(0, 1, 3.0).unwrap();
        m.set(2, 1, -1.0).unwrap();
        m.set(4, 1, 4.0).unwrap();
        m.set(1, 2, 4.0).unwrap();
        m.set(2, 2, -3.0).unwrap();
        m.set(3, 2, 1.0).unwrap();
        m.set(4, 2, 2.0).unwrap();
        m.set(2, 3, 2.0).unwrap();
        m.set(1, 4, 6.0).unwrap();
        m.set(4, 4, 1.0).unwrap();
        m
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn solves_vector_and_matrix() {
        let kernel = Arc::new(FaerKernel::new());
        let lu = SparseLuDecomposition::new(&matrix_5x5(), kernel.clone()).unwrap();

        let mut x = vec![8.0, 45.0, -3.0, 3.0, 19.0];
        lu.solve(&mut x).unwrap();
        assert_close(&x, &[1.0, 2.0, 3.0, 4.0, 5.0]);

        let rhs = [8.0, 45.0, -3.0, 3.0, 19.0];
        let mut b = DenseMatrix::from_values(5, 2, [rhs, rhs].concat()).unwrap();
        lu.solve_matrix(&mut b).unwrap();
        assert_close(b.column(0).unwrap(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_close(b.column(1).unwrap(), &[1.0, 2.0, 3.0, 4.0, 5.0]);

        drop(lu);
        assert_eq!(kernel.live_factorizations(), 0);
    }

    #[test]
    fn update_after_value_change() {
        let kernel = Arc::new(FaerKernel::new());
        let mut m = SparseMatrix::new(2, 2, 2).unwrap();
        let first = m.add_and_get_index(0, 0, 1.0).unwrap();
        m.set(1, 1, 1.0).unwrap();
        let mut lu = SparseLuDecomposition::new(&m, kernel).unwrap();

        m.set_at_index(first, 4.0).unwrap();
        lu.update(&m).unwrap();
        let mut x = vec![8.0, 3.0];
        lu.solve(&mut x).unwrap();
        assert_close(&x, &[2.0, 3.0]);
    }

    #[test]
    fn update_rejects_structure_change() {
        let kernel = Arc::new(FaerKernel::new());
        let mut m = SparseMatrix::new(2, 2, 2).unwrap();
        m.set(0, 0, 1.0).unwrap();
        m.set(1, 1, 1.0).unwrap();
        let mut lu = SparseLuDecomposition::new(&m, kernel).unwrap();
        m.set(0, 1, 1.0).unwrap();
        assert_eq!(lu.update(&m).unwrap_err().kind(), ErrorKind::InvalidShape);
    }

    #[test]
    fn rectangular_matrix_never_reaches_the_kernel() {
        let kernel = Arc::new(FaerKernel::new());
        let m = SparseMatrix::new(2, 3, 0).unwrap();
        let err = SparseLuDecomposition::new(&m, kernel.clone()).unwrap_err();
        assert!(matches!(err, MatrixError::NotSquare { rows: 2, columns: 3 }));
        assert_eq!(kernel.live_factorizations(), 0);
    }

    #[test]
    fn close_then_use_is_released() {
        let kernel = Arc::new(FaerKernel::new());
        let mut lu = SparseLuDecomposition::new(&matrix_5x5(), kernel.clone()).unwrap();
        lu.close().unwrap();
        assert_eq!(kernel.live_factorizations(), 0);
        lu.close().unwrap();
        let mut x = vec![0.0; 5];
        assert_eq!(lu.solve(&mut x).unwrap_err().kind(), ErrorKind::Released);
    }
}
