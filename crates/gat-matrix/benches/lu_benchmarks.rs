//! Performance benchmarks for matrix assembly and LU solves
//!
//! This benchmark suite measures the performance of:
//! - Column-ordered sparse fill of an admittance-like matrix
//! - Sparse LU factorization and repeated solves
//! - Dense LU factorization for comparison
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p gat-matrix
//!
//! # Run specific benchmark
//! cargo bench -p gat-matrix -- sparse_lu
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gat_matrix::{DenseMatrix, SparseMatrix};

const SIZES: &[usize] = &[14, 118, 300, 1354];

/// Ring network with a chord every 7 buses, diagonally dominant.
fn admittance(n: usize) -> SparseMatrix {
    let mut m = SparseMatrix::new(n, n, 5 * n).unwrap();
    for j in 0..n {
        let mut neighbours = vec![(j + n - 1) % n, (j + 1) % n];
        if j % 7 == 0 {
            neighbours.push((j + n / 2) % n);
        }
        neighbours.push(j);
        neighbours.sort_unstable();
        neighbours.dedup();
        for i in neighbours {
            let value = if i == j { 10.0 } else { -1.0 };
            m.set(i, j, value).unwrap();
        }
    }
    m
}

fn bench_sparse_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_fill");
    for &n in SIZES {
        group.bench_with_input(BenchmarkId::new("admittance", n), &n, |b, &n| {
            b.iter(|| black_box(admittance(n)))
        });
    }
    group.finish();
}

fn bench_sparse_lu(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_lu");
    for &n in SIZES {
        let matrix = admittance(n);
        group.bench_with_input(BenchmarkId::new("factorize", n), &matrix, |b, matrix| {
            b.iter(|| black_box(matrix.decompose_lu().unwrap()))
        });

        let lu = matrix.decompose_lu().unwrap();
        let rhs: Vec<f64> = (0..n).map(|i| i as f64).collect();
        group.bench_with_input(BenchmarkId::new("solve", n), &rhs, |b, rhs| {
            b.iter(|| {
                let mut x = rhs.clone();
                lu.solve(&mut x).unwrap();
                black_box(x)
            })
        });
    }
    group.finish();
}

fn bench_dense_lu(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_lu");
    for &n in &SIZES[..3] {
        let matrix: DenseMatrix = admittance(n).to_dense().unwrap();
        group.bench_with_input(BenchmarkId::new("factorize", n), &matrix, |b, matrix| {
            b.iter(|| black_box(matrix.decompose_lu().unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sparse_fill, bench_sparse_lu, bench_dense_lu);
criterion_main!(benches);
