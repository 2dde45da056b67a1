//! Dense matrix stored column by column.
//!
//! Element `(i, j)` lives at `j * rows + i` of [`DenseMatrix::values`]. Dense
//! products and LU factorizations go through `faer`.

use std::fmt;
use std::io::Write;

use faer::Mat;
use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, MatrixResult};
use crate::lu::DenseLuDecomposition;
use crate::matrix::Shape;
use crate::sparse::SparseMatrix;

/// Largest element count accepted for a dense matrix.
pub const MAX_ELEMENT_COUNT: usize = i32::MAX as usize / std::mem::size_of::<f64>();

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DenseMatrixData", into = "DenseMatrixData")]
pub struct DenseMatrix {
    shape: Shape,
    values: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct DenseMatrixData {
    rows: usize,
    columns: usize,
    values: Vec<f64>,
}

impl From<DenseMatrix> for DenseMatrixData {
    fn from(matrix: DenseMatrix) -> Self {
        Self {
            rows: matrix.shape.rows,
            columns: matrix.shape.columns,
            values: matrix.values,
        }
    }
}

impl TryFrom<DenseMatrixData> for DenseMatrix {
    type Error = MatrixError;

    fn try_from(data: DenseMatrixData) -> Result<Self, Self::Error> {
        DenseMatrix::from_values(data.rows, data.columns, data.values)
    }
}

fn element_count(rows: usize, columns: usize) -> MatrixResult<usize> {
    match rows.checked_mul(columns) {
        Some(count) if count <= MAX_ELEMENT_COUNT => Ok(count),
        _ => Err(MatrixError::InvalidSize(format!(
            "Too many elements for a dense matrix, maximum allowed is {MAX_ELEMENT_COUNT}"
        ))),
    }
}

impl DenseMatrix {
    /// Zero-filled matrix. Empty shapes (0 rows or columns) are allowed.
    pub fn new(rows: usize, columns: usize) -> MatrixResult<Self> {
        let count = element_count(rows, columns)?;
        Ok(Self {
            shape: Shape { rows, columns },
            values: vec![0.0; count],
        })
    }

    /// Matrix over column-major `values`.
    pub fn from_values(rows: usize, columns: usize, values: Vec<f64>) -> MatrixResult<Self> {
        let count = element_count(rows, columns)?;
        if values.len() != count {
            return Err(MatrixError::DimensionMismatch(format!(
                "Incorrect values array size {}, expected {}",
                values.len(),
                count
            )));
        }
        Ok(Self {
            shape: Shape { rows, columns },
            values,
        })
    }

    /// Matrix from a list of rows; all rows must have the same length.
    pub fn from_row_major(rows: &[Vec<f64>]) -> MatrixResult<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|row| row.len() != columns) {
            return Err(MatrixError::DimensionMismatch(format!(
                "ragged rows: expected {} columns, found {}",
                columns,
                row.len()
            )));
        }
        let mut matrix = Self::new(rows.len(), columns)?;
        for (i, row) in rows.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                matrix.values[j * rows.len() + i] = value;
            }
        }
        Ok(matrix)
    }

    pub(crate) fn from_faer(mat: &Mat<f64>) -> Self {
        let (rows, columns) = (mat.nrows(), mat.ncols());
        let mut values = Vec::with_capacity(rows * columns);
        for j in 0..columns {
            for i in 0..rows {
                values.push(mat.read(i, j));
            }
        }
        Self {
            shape: Shape { rows, columns },
            values,
        }
    }

    pub(crate) fn to_faer(&self) -> Mat<f64> {
        let rows = self.shape.rows;
        Mat::from_fn(rows, self.shape.columns, |i, j| self.values[j * rows + i])
    }

    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    pub fn columns(&self) -> usize {
        self.shape.columns
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Column-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    fn index(&self, i: usize, j: usize) -> usize {
        j * self.shape.rows + i
    }

    pub fn get(&self, i: usize, j: usize) -> MatrixResult<f64> {
        self.shape.check_bounds(i, j)?;
        Ok(self.values[self.index(i, j)])
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) -> MatrixResult<()> {
        self.shape.check_bounds(i, j)?;
        let index = self.index(i, j);
        self.values[index] = value;
        Ok(())
    }

    pub fn add(&mut self, i: usize, j: usize, value: f64) -> MatrixResult<()> {
        self.shape.check_bounds(i, j)?;
        let index = self.index(i, j);
        self.values[index] += value;
        Ok(())
    }

    pub fn add_and_get_index(&mut self, i: usize, j: usize, value: f64) -> MatrixResult<usize> {
        self.add(i, j, value)?;
        Ok(self.index(i, j))
    }

    fn check_element_index(&self, index: usize) -> MatrixResult<()> {
        if index >= self.values.len() {
            return Err(MatrixError::out_of_bounds("element", index, self.values.len()));
        }
        Ok(())
    }

    pub fn set_at_index(&mut self, index: usize, value: f64) -> MatrixResult<()> {
        self.check_element_index(index)?;
        self.values[index] = value;
        Ok(())
    }

    pub fn add_at_index(&mut self, index: usize, value: f64) -> MatrixResult<()> {
        self.check_element_index(index)?;
        self.values[index] += value;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.values.fill(0.0);
    }

    pub fn reset_row(&mut self, row: usize) -> MatrixResult<()> {
        if row >= self.rows() {
            return Err(MatrixError::out_of_bounds("row", row, self.rows()));
        }
        let rows = self.rows();
        self.values
            .iter_mut()
            .skip(row)
            .step_by(rows)
            .for_each(|v| *v = 0.0);
        Ok(())
    }

    pub fn reset_column(&mut self, column: usize) -> MatrixResult<()> {
        if column >= self.columns() {
            return Err(MatrixError::out_of_bounds("column", column, self.columns()));
        }
        let rows = self.rows();
        self.values[column * rows..(column + 1) * rows].fill(0.0);
        Ok(())
    }

    /// Zero every value whose magnitude is below `epsilon`.
    pub fn remove_small_values(&mut self, epsilon: f64) -> MatrixResult<()> {
        if epsilon.is_nan() || epsilon < 0.0 {
            return Err(MatrixError::InvalidSize(format!(
                "epsilon should be positive but received {epsilon}"
            )));
        }
        self.values
            .iter_mut()
            .filter(|v| v.abs() < epsilon)
            .for_each(|v| *v = 0.0);
        Ok(())
    }

    /// Overwrite values with those of a matrix of the same shape, reusing
    /// this matrix's storage.
    pub fn copy_values_from(&mut self, other: &DenseMatrix) -> MatrixResult<()> {
        if other.shape != self.shape {
            return Err(MatrixError::DimensionMismatch(format!(
                "Incompatible matrix dimensions when copying values. Received ({}, {}) but expected ({}, {})",
                other.rows(),
                other.columns(),
                self.rows(),
                self.columns()
            )));
        }
        self.values.copy_from_slice(&other.values);
        Ok(())
    }

    /// Values of column `j`.
    pub fn column(&self, j: usize) -> MatrixResult<&[f64]> {
        if j >= self.columns() {
            return Err(MatrixError::out_of_bounds("column", j, self.columns()));
        }
        let rows = self.rows();
        Ok(&self.values[j * rows..(j + 1) * rows])
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Calls `handler(i, j, value)` for every non-zero element, column by column.
    pub fn iterate_non_zero_value<F>(&self, mut handler: F)
    where
        F: FnMut(usize, usize, f64),
    {
        let rows = self.rows();
        for (index, &value) in self.values.iter().enumerate() {
            if value != 0.0 {
                handler(index % rows, index / rows, value);
            }
        }
    }

    pub fn iterate_non_zero_value_of_column<F>(&self, j: usize, mut handler: F) -> MatrixResult<()>
    where
        F: FnMut(usize, usize, f64),
    {
        for (i, &value) in self.column(j)?.iter().enumerate() {
            if value != 0.0 {
                handler(i, j, value);
            }
        }
        Ok(())
    }

    pub fn transpose(&self) -> DenseMatrix {
        let (rows, columns) = (self.rows(), self.columns());
        let mut values = vec![0.0; self.values.len()];
        for j in 0..columns {
            for i in 0..rows {
                values[i * columns + j] = self.values[j * rows + i];
            }
        }
        DenseMatrix {
            shape: Shape {
                rows: columns,
                columns: rows,
            },
            values,
        }
    }

    pub fn times(&self, other: &DenseMatrix) -> MatrixResult<DenseMatrix> {
        self.times_scaled(other, 1.0)
    }

    /// `scalar * self * other`.
    pub fn times_scaled(&self, other: &DenseMatrix, scalar: f64) -> MatrixResult<DenseMatrix> {
        if other.rows() != self.columns() {
            return Err(MatrixError::DimensionMismatch(format!(
                "Invalid matrices inner dimension ({} != {})",
                self.columns(),
                other.rows()
            )));
        }
        element_count(self.rows(), other.columns())?;
        let product = &self.to_faer() * &other.to_faer();
        let mut result = DenseMatrix::from_faer(&product);
        if scalar != 1.0 {
            result.values.iter_mut().for_each(|v| *v *= scalar);
        }
        Ok(result)
    }

    /// `alpha * self + beta * other`.
    pub fn add_matrix(&self, other: &DenseMatrix, alpha: f64, beta: f64) -> MatrixResult<DenseMatrix> {
        if other.shape != self.shape {
            return Err(MatrixError::DimensionMismatch(format!(
                "Incompatible matrices dimensions ({}x{} and {}x{})",
                self.rows(),
                self.columns(),
                other.rows(),
                other.columns()
            )));
        }
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| alpha * a + beta * b)
            .collect();
        Ok(DenseMatrix {
            shape: self.shape,
            values,
        })
    }

    pub fn to_sparse(&self) -> MatrixResult<SparseMatrix> {
        let non_zero = self.values.iter().filter(|v| **v != 0.0).count();
        let mut sparse = SparseMatrix::new(self.rows(), self.columns(), non_zero)?;
        for (index, &value) in self.values.iter().enumerate() {
            if value != 0.0 {
                sparse.set(index % self.rows(), index / self.rows(), value)?;
            }
        }
        Ok(sparse)
    }

    pub fn decompose_lu(&self) -> MatrixResult<DenseLuDecomposition> {
        DenseLuDecomposition::new(self)
    }

    /// Print as an aligned table, optionally with row and column headers.
    pub fn write_table<W: Write>(
        &self,
        out: &mut W,
        row_names: Option<&[String]>,
        column_names: Option<&[String]>,
    ) -> MatrixResult<()> {
        if row_names.is_some_and(|names| names.len() != self.rows())
            || column_names.is_some_and(|names| names.len() != self.columns())
        {
            return Err(MatrixError::DimensionMismatch(
                "header count does not match the matrix shape".to_string(),
            ));
        }
        let row_name_width = row_names
            .map(|names| names.iter().map(String::len).max().unwrap_or(0))
            .unwrap_or(0);
        let cells: Vec<String> = self.values.iter().map(|v| format!("{v:?}")).collect();
        let widths: Vec<usize> = (0..self.columns())
            .map(|j| {
                let values = (0..self.rows()).map(|i| cells[self.index(i, j)].len());
                let header = column_names.map_or(0, |names| names[j].len());
                values.max().unwrap_or(0).max(header)
            })
            .collect();

        if let Some(names) = column_names {
            if row_names.is_some() {
                write!(out, "{:width$}", "", width = row_name_width + 1)?;
            }
            for (name, width) in names.iter().zip(&widths) {
                write!(out, "{:>width$}", name, width = width + 1)?;
            }
            writeln!(out)?;
        }
        for i in 0..self.rows() {
            if let Some(names) = row_names {
                write!(out, "{:>width$}", names[i], width = row_name_width + 1)?;
            }
            for (j, width) in widths.iter().enumerate() {
                write!(out, "{:>width$}", cells[self.index(i, j)], width = width + 1)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

impl fmt::Display for DenseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = Vec::new();
        self.write_table(&mut buffer, None, None)
            .map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&buffer))
    }
}
