//! Sparse kernel boundary.
//!
//! Sparse LU factorization and sparse products are delegated to a
//! [`SparseLuKernel`]. A factorization lives inside the kernel and is
//! addressed through an opaque [`KernelHandle`]; the owner of a handle must
//! release it exactly once (see [`crate::lu::SparseLuDecomposition`]).
//!
//! Kernels report failures as `anyhow::Error`, surfaced to callers as
//! [`crate::MatrixError::Kernel`].

mod faer_kernel;

use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Result;
use once_cell::sync::Lazy;

use crate::sparse::{CscView, SparseMatrix};

pub use self::faer_kernel::FaerKernel;

/// Opaque reference to a factorization held by a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KernelHandle(u64);

impl KernelHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// External sparse linear algebra.
pub trait SparseLuKernel: Send + Sync {
    /// Registry name of the kernel.
    fn name(&self) -> &'static str;

    /// Factorize a square CSC matrix. Factorizations whose reciprocal pivot
    /// growth falls below `rgrowth_threshold` are rejected.
    fn factorize(&self, matrix: &CscView<'_>, rgrowth_threshold: f64) -> Result<KernelHandle>;

    /// Replace the factorization behind `handle` with one of `matrix`.
    fn refactorize(
        &self,
        handle: KernelHandle,
        matrix: &CscView<'_>,
        rgrowth_threshold: f64,
    ) -> Result<()>;

    /// Solve in place for `rhs_columns` column-major right-hand sides.
    fn solve(
        &self,
        handle: KernelHandle,
        rhs: &mut [f64],
        rhs_columns: usize,
        transposed: bool,
    ) -> Result<()>;

    /// Free the factorization behind `handle`.
    fn release(&self, handle: KernelHandle) -> Result<()>;

    fn multiply(&self, a: &CscView<'_>, b: &CscView<'_>) -> Result<SparseMatrix>;

    /// `alpha * a + beta * b`.
    fn add(&self, a: &CscView<'_>, b: &CscView<'_>, alpha: f64, beta: f64)
        -> Result<SparseMatrix>;

    fn transpose(&self, a: &CscView<'_>) -> Result<SparseMatrix>;
}

static DEFAULT_KERNEL: Lazy<RwLock<Arc<dyn SparseLuKernel>>> =
    Lazy::new(|| RwLock::new(Arc::new(FaerKernel::default())));

/// Kernel used by [`SparseMatrix`] products and LU factorizations.
pub fn default_kernel() -> Arc<dyn SparseLuKernel> {
    DEFAULT_KERNEL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replace the process-wide kernel, returning the previous one.
/// Existing decompositions keep the kernel they were created with.
pub fn set_default_kernel(kernel: Arc<dyn SparseLuKernel>) -> Arc<dyn SparseLuKernel> {
    let mut slot = DEFAULT_KERNEL
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *slot, kernel)
}
