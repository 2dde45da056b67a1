//! # gat-matrix: Matrices for Network Calculations
//!
//! Dense and sparse matrices behind one [`Matrix`] type, with LU solves used
//! by load flow and sensitivity computations.
//!
//! - [`DenseMatrix`]: column-major storage, products and LU through `faer`.
//! - [`SparseMatrix`]: CSC storage filled column by column (admittance and
//!   Jacobian assembly order), products and LU through a
//!   [`SparseLuKernel`].
//! - [`LuDecomposition`]: factorize once, solve many right-hand sides in
//!   place; sparse factorizations are released exactly once.
//!
//! ## Quick Start
//!
//! ```rust
//! use gat_matrix::*;
//!
//! let factory = SparseMatrixFactory;
//! let mut a = factory.create(2, 2, 4).unwrap();
//! a.set(0, 0, 2.0).unwrap();
//! a.set(1, 0, 1.0).unwrap();
//! a.set(0, 1, 1.0).unwrap();
//! a.set(1, 1, 3.0).unwrap();
//!
//! let mut lu = a.decompose_lu().unwrap();
//! let mut x = vec![3.0, 5.0];
//! lu.solve(&mut x).unwrap();
//! assert!((x[0] - 0.8).abs() < 1e-9);
//! assert!((x[1] - 1.4).abs() < 1e-9);
//! lu.close().unwrap();
//! ```

pub mod config;
pub mod dense;
pub mod error;
pub mod kernel;
pub mod lu;
pub mod matrix;
pub mod sparse;

pub use config::{KernelKind, MatrixConfig, DEFAULT_RGROWTH_THRESHOLD};
pub use dense::DenseMatrix;
pub use error::{ErrorKind, MatrixError, MatrixResult};
pub use kernel::{default_kernel, set_default_kernel, FaerKernel, KernelHandle, SparseLuKernel};
pub use lu::{DenseLuDecomposition, LuDecomposition, SparseLuDecomposition};
pub use matrix::{
    DenseMatrixFactory, Matrix, MatrixFactory, Representation, Shape, SparseMatrixFactory,
};
pub use sparse::{CscView, SparseMatrix};
