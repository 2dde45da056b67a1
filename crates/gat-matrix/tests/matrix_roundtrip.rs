use gat_matrix::{
    DenseMatrix, DenseMatrixFactory, ErrorKind, Matrix, MatrixError, MatrixFactory, SparseMatrix,
    SparseMatrixFactory,
};

#[test]
fn dense_two_by_two_solve() {
    let a = DenseMatrix::from_row_major(&[vec![2.0, 1.0], vec![1.0, 3.0]]).unwrap();
    let lu = a.decompose_lu().unwrap();
    let mut x = vec![3.0, 5.0];
    lu.solve(&mut x).unwrap();
    assert!((x[0] - 0.8).abs() < 1e-9);
    assert!((x[1] - 1.4).abs() < 1e-9);
}

#[test]
fn sparse_fill_converts_to_expected_dense() {
    let mut a = SparseMatrixFactory.create(3, 2, 3).unwrap();
    a.set(0, 0, 1.0).unwrap();
    a.set(2, 0, 2.0).unwrap();
    a.set(1, 1, 3.0).unwrap();

    let dense = a.to_dense().unwrap();
    assert_eq!(dense.values(), &[1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);

    match &a {
        Matrix::Sparse(sparse) => {
            assert_eq!(sparse.column_start(), vec![0, 2, 3]);
            assert_eq!(sparse.row_indices(), &[0, 2, 1]);
            assert_eq!(sparse.values(), &[1.0, 2.0, 3.0]);
        }
        Matrix::Dense(_) => panic!("sparse factory built a dense matrix"),
    }
}

#[test]
fn sparse_column_going_backwards_is_rejected() {
    let mut a = SparseMatrixFactory.create(3, 3, 3).unwrap();
    a.set(0, 2, 1.0).unwrap();
    let err = a.set(0, 1, 1.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OrderingViolation);
    let err = a.add(0, 0, 1.0).unwrap_err();
    assert!(matches!(err, MatrixError::ColumnOrder { column: 0, current: 2 }));
}

#[test]
fn rectangular_lu_is_invalid_shape_for_both_factories() {
    for factory in [
        &DenseMatrixFactory as &dyn MatrixFactory,
        &SparseMatrixFactory as &dyn MatrixFactory,
    ] {
        let m = factory.create(3, 2, 0).unwrap();
        let err = m.decompose_lu().err().unwrap();
        assert!(matches!(err, MatrixError::NotSquare { rows: 3, columns: 2 }));
    }
}

#[test]
fn sparse_json_file_round_trip() {
    let mut m = SparseMatrix::new(3, 4, 4).unwrap();
    m.set(1, 0, 1.5).unwrap();
    m.add(1, 0, 0.5).unwrap();
    m.set(2, 2, -4.0).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jacobian.json");
    m.write_json_file(&path).unwrap();
    let back = SparseMatrix::read_json_file(&path).unwrap();
    assert_eq!(back, m);
    assert_eq!(back.column_start(), vec![0, 1, 1, 2, 2]);
    assert_eq!(back.values(), &[2.0, -4.0]);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SparseMatrix::read_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, MatrixError::Io(_)));
}

#[test]
fn sparse_product_matches_dense_product() {
    // 1 0 2     1 1
    // 0 3 0  x  0 2
    //           4 0
    let mut a = SparseMatrix::new(2, 3, 3).unwrap();
    a.set(0, 0, 1.0).unwrap();
    a.set(1, 1, 3.0).unwrap();
    a.set(0, 2, 2.0).unwrap();
    let mut b = SparseMatrix::new(3, 2, 4).unwrap();
    b.set(0, 0, 1.0).unwrap();
    b.set(2, 0, 4.0).unwrap();
    b.set(0, 1, 1.0).unwrap();
    b.set(1, 1, 2.0).unwrap();

    let sparse = a.times(&b).unwrap().to_dense().unwrap();
    let dense = a
        .to_dense()
        .unwrap()
        .times(&b.to_dense().unwrap())
        .unwrap();
    assert_eq!(sparse, dense);
    assert_eq!(dense.values(), &[9.0, 0.0, 1.0, 6.0]);
}

#[test]
fn sparse_addition_with_empty_middle_column() {
    let mut a = SparseMatrix::new(3, 3, 3).unwrap();
    a.set(0, 0, 1.0).unwrap();
    a.set(2, 0, 2.0).unwrap();
    a.set(1, 2, 3.0).unwrap();
    let mut b = SparseMatrix::new(3, 3, 3).unwrap();
    b.set(0, 0, 4.0).unwrap();
    b.set(1, 0, 5.0).unwrap();
    b.set(0, 2, 6.0).unwrap();

    let c = a.add_matrix(&b, 1.0, 1.0).unwrap().to_dense().unwrap();
    assert_eq!(c.column(0).unwrap(), &[5.0, 5.0, 2.0]);
    assert_eq!(c.column(1).unwrap(), &[0.0, 0.0, 0.0]);
    assert_eq!(c.column(2).unwrap(), &[6.0, 3.0, 0.0]);
}
