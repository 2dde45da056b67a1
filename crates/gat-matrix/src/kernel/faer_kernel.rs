//! In-process kernel: `faer` LU on a densified copy, `sprs` for products.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use anyhow::{anyhow, bail, Result};
use faer::prelude::*;
use faer::solvers::PartialPivLu;
use faer::Mat;
use sprs::{CsMat, TriMat};
use tracing::debug;

use super::{KernelHandle, SparseLuKernel};
use crate::sparse::{CscView, SparseMatrix};

struct Factorization {
    size: usize,
    lu: PartialPivLu<f64>,
}

/// Sparse kernel backed by `faer` (LU) and `sprs` (products).
///
/// Factorizations are dense, which keeps the kernel dependency-free beyond
/// the workspace stack; suited to the network sizes handled in-process.
#[derive(Default)]
pub struct FaerKernel {
    next_id: AtomicU64,
    factorizations: Mutex<HashMap<u64, Factorization>>,
}

impl FaerKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of factorizations not yet released.
    pub fn live_factorizations(&self) -> usize {
        self.factorizations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn factor(matrix: &CscView<'_>, rgrowth_threshold: f64) -> Result<Factorization> {
        if matrix.rows != matrix.columns {
            bail!(
                "matrix is not square ({}x{})",
                matrix.rows,
                matrix.columns
            );
        }
        let n = matrix.rows;
        let mut dense = Mat::<f64>::zeros(n, n);
        for j in 0..n {
            for k in matrix.column_start[j]..matrix.column_start[j + 1] {
                let i = matrix.row_indices[k];
                dense.write(i, j, dense.read(i, j) + matrix.values[k]);
            }
        }

        let lu = dense.partial_piv_lu();
        let u = lu.compute_u();
        let mut rgrowth = f64::INFINITY;
        for j in 0..n {
            let pivot = u.read(j, j).abs();
            if pivot == 0.0 || !pivot.is_finite() {
                bail!("matrix is singular (zero pivot at column {j})");
            }
            let column_max = (0..n).map(|i| dense.read(i, j).abs()).fold(0.0, f64::max);
            let u_max = (0..=j).map(|i| u.read(i, j).abs()).fold(0.0, f64::max);
            if u_max > 0.0 {
                rgrowth = rgrowth.min(column_max / u_max);
            }
        }
        if rgrowth < rgrowth_threshold {
            bail!("reciprocal pivot growth {rgrowth:e} is below threshold {rgrowth_threshold:e}");
        }
        Ok(Factorization { size: n, lu })
    }
}

fn to_sprs(matrix: &CscView<'_>, scale: f64) -> CsMat<f64> {
    let mut triplets = TriMat::with_capacity((matrix.rows, matrix.columns), matrix.value_count());
    for j in 0..matrix.columns {
        for k in matrix.column_start[j]..matrix.column_start[j + 1] {
            triplets.add_triplet(matrix.row_indices[k], j, scale * matrix.values[k]);
        }
    }
    triplets.to_csc()
}

fn from_sprs(matrix: &CsMat<f64>) -> Result<SparseMatrix> {
    let converted;
    let csc = if matrix.is_csc() {
        matrix
    } else {
        converted = matrix.to_other_storage();
        &converted
    };
    let (rows, columns) = csc.shape();
    let mut result = SparseMatrix::new(rows, columns, csc.nnz())?;
    for (j, column) in csc.outer_iterator().enumerate() {
        for (i, &value) in column.iter() {
            result.set(i, j, value)?;
        }
    }
    Ok(result)
}

impl SparseLuKernel for FaerKernel {
    fn name(&self) -> &'static str {
        "faer"
    }

    fn factorize(&self, matrix: &CscView<'_>, rgrowth_threshold: f64) -> Result<KernelHandle> {
        let factorization = Self::factor(matrix, rgrowth_threshold)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.factorizations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, factorization);
        debug!(handle = id, size = matrix.rows, "sparse LU factorized");
        Ok(KernelHandle::new(id))
    }

    fn refactorize(
        &self,
        handle: KernelHandle,
        matrix: &CscView<'_>,
        rgrowth_threshold: f64,
    ) -> Result<()> {
        let factorization = Self::factor(matrix, rgrowth_threshold)?;
        let mut factorizations = self
            .factorizations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let slot = factorizations
            .get_mut(&handle.id())
            .ok_or_else(|| anyhow!("unknown LU handle {}", handle.id()))?;
        *slot = factorization;
        debug!(handle = handle.id(), "sparse LU refactorized");
        Ok(())
    }

    fn solve(
        &self,
        handle: KernelHandle,
        rhs: &mut [f64],
        rhs_columns: usize,
        transposed: bool,
    ) -> Result<()> {
        let factorizations = self
            .factorizations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let factorization = factorizations
            .get(&handle.id())
            .ok_or_else(|| anyhow!("unknown LU handle {}", handle.id()))?;
        let n = factorization.size;
        if rhs.len() != n * rhs_columns {
            bail!(
                "right-hand side has {} values, expected {}",
                rhs.len(),
                n * rhs_columns
            );
        }
        let b = Mat::from_fn(n, rhs_columns, |i, j| rhs[j * n + i]);
        let x = if transposed {
            factorization.lu.solve_transpose(&b)
        } else {
            factorization.lu.solve(&b)
        };
        for j in 0..rhs_columns {
            for i in 0..n {
                let value = x.read(i, j);
                if !value.is_finite() {
                    bail!("non-finite solution value at row {i}");
                }
                rhs[j * n + i] = value;
            }
        }
        Ok(())
    }

    fn release(&self, handle: KernelHandle) -> Result<()> {
        self.factorizations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle.id())
            .ok_or_else(|| anyhow!("unknown LU handle {}", handle.id()))?;
        debug!(handle = handle.id(), "sparse LU released");
        Ok(())
    }

    fn multiply(&self, a: &CscView<'_>, b: &CscView<'_>) -> Result<SparseMatrix> {
        if a.columns != b.rows {
            bail!("inner dimensions differ ({} != {})", a.columns, b.rows);
        }
        let product = &to_sprs(a, 1.0) * &to_sprs(b, 1.0);
        from_sprs(&product)
    }

    fn add(
        &self,
        a: &CscView<'_>,
        b: &CscView<'_>,
        alpha: f64,
        beta: f64,
    ) -> Result<SparseMatrix> {
        if a.rows != b.rows || a.columns != b.columns {
            bail!(
                "shapes differ ({}x{} and {}x{})",
                a.rows,
                a.columns,
                b.rows,
                b.columns
            );
        }
        let mut triplets = TriMat::with_capacity((a.rows, a.columns), a.value_count() + b.value_count());
        for (view, scale) in [(a, alpha), (b, beta)] {
            for j in 0..view.columns {
                for k in view.column_start[j]..view.column_start[j + 1] {
                    triplets.add_triplet(view.row_indices[k], j, scale * view.values[k]);
                }
            }
        }
        from_sprs(&triplets.to_csc())
    }

    fn transpose(&self, a: &CscView<'_>) -> Result<SparseMatrix> {
        let mut triplets = TriMat::with_capacity((a.columns, a.rows), a.value_count());
        for j in 0..a.columns {
            for k in a.column_start[j]..a.column_start[j + 1] {
                triplets.add_triplet(j, a.row_indices[k], a.values[k]);
            }
        }
        from_sprs(&triplets.to_csc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> SparseMatrix {
        // 4 1
        // 2 3
        SparseMatrix::from_parts(2, 2, vec![0, 2, 4], vec![0, 1, 0, 1], vec![4.0, 2.0, 1.0, 3.0])
            .unwrap()
    }

    #[test]
    fn factorize_solve_release() {
        let kernel = FaerKernel::new();
        let a = system();
        let handle = kernel.factorize(&a.csc(), 1e-10).unwrap();
        assert_eq!(kernel.live_factorizations(), 1);

        let mut rhs = vec![5.0, 5.0];
        kernel.solve(handle, &mut rhs, 1, false).unwrap();
        assert!((rhs[0] - 1.0).abs() < 1e-12);
        assert!((rhs[1] - 1.0).abs() < 1e-12);

        // A^T x = [6, 4] -> x = [1, 1]
        let mut rhs = vec![6.0, 4.0];
        kernel.solve(handle, &mut rhs, 1, true).unwrap();
        assert!((rhs[0] - 1.0).abs() < 1e-12);
        assert!((rhs[1] - 1.0).abs() < 1e-12);

        kernel.release(handle).unwrap();
        assert_eq!(kernel.live_factorizations(), 0);
        assert!(kernel.release(handle).is_err());
        assert!(kernel.solve(handle, &mut rhs, 1, false).is_err());
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let kernel = FaerKernel::new();
        let singular =
            SparseMatrix::from_parts(2, 2, vec![0, 2, 4], vec![0, 1, 0, 1], vec![1.0, 2.0, 2.0, 4.0])
                .unwrap();
        assert!(kernel.factorize(&singular.csc(), 1e-10).is_err());
        assert_eq!(kernel.live_factorizations(), 0);
    }

    #[test]
    fn duplicate_entries_are_summed() {
        let kernel = FaerKernel::new();
        // (0,0) stored as 1 + 3, (1,1) = 2
        let a = SparseMatrix::from_parts(2, 2, vec![0, 2, 3], vec![0, 0, 1], vec![1.0, 3.0, 2.0])
            .unwrap();
        let handle = kernel.factorize(&a.csc(), 1e-10).unwrap();
        let mut rhs = vec![8.0, 2.0];
        kernel.solve(handle, &mut rhs, 1, false).unwrap();
        assert!((rhs[0] - 2.0).abs() < 1e-12);
        assert!((rhs[1] - 1.0).abs() < 1e-12);
        kernel.release(handle).unwrap();
    }

    #[test]
    fn transpose_and_multiply() {
        let kernel = FaerKernel::new();
        let a = system();
        let t = kernel.transpose(&a.csc()).unwrap();
        assert_eq!(t.to_dense().unwrap().get(0, 1).unwrap(), 2.0);

        let product = kernel.multiply(&a.csc(), &t.csc()).unwrap();
        // A * A^T = [17 11; 11 13]
        let dense = product.to_dense().unwrap();
        assert_eq!(dense.values(), &[17.0, 11.0, 11.0, 13.0]);
    }

    #[test]
    fn multiply_rejects_inner_mismatch() {
        let kernel = FaerKernel::new();
        let a = SparseMatrix::new(2, 3, 0).unwrap();
        let b = SparseMatrix::new(2, 2, 0).unwrap();
        assert!(kernel.multiply(&a.csc(), &b.csc()).is_err());
    }
}
