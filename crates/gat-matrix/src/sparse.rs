//! Compressed sparse column (CSC) matrix with append-only fill.
//!
//! Values are appended column by column: a column may only be written while
//! it is the current fill column or a later one. Inside a column, rows may be
//! written in any order and the same row may be written more than once; the
//! stored entries then all contribute when the matrix is used (their sum is
//! the element value). Random read access is not offered; use
//! [`SparseMatrix::iterate_non_zero_value`] or convert with
//! [`SparseMatrix::to_dense`].
//!
//! ```
//! use gat_matrix::SparseMatrix;
//!
//! let mut a = SparseMatrix::new(3, 2, 3).unwrap();
//! a.set(0, 0, 1.0).unwrap();
//! a.set(2, 0, 2.0).unwrap();
//! a.set(1, 1, 3.0).unwrap();
//! assert_eq!(a.column_start(), vec![0, 2, 3]);
//! assert_eq!(a.row_indices(), &[0, 2, 1]);
//! assert_eq!(a.values(), &[1.0, 2.0, 3.0]);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_RGROWTH_THRESHOLD;
use crate::dense::DenseMatrix;
use crate::error::{MatrixError, MatrixResult};
use crate::kernel::default_kernel;
use crate::lu::SparseLuDecomposition;
use crate::matrix::Shape;

/// Borrowed CSC arrays of a [`SparseMatrix`], the form handed to sparse kernels.
///
/// `column_start` always has `columns + 1` entries; columns after the last
/// filled one are closed as empty. Row indices inside a column are in fill
/// order and may repeat.
#[derive(Debug, Clone)]
pub struct CscView<'a> {
    pub rows: usize,
    pub columns: usize,
    pub column_start: Cow<'a, [usize]>,
    pub row_indices: &'a [usize],
    pub values: &'a [f64],
}

impl CscView<'_> {
    pub fn value_count(&self) -> usize {
        self.values.len()
    }
}

/// Sparse matrix in CSC layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SparseMatrixData", into = "SparseMatrixData")]
pub struct SparseMatrix {
    shape: Shape,
    /// Start offset of each started column; `len() - 1` is the fill column.
    /// Always holds a trailing `nnz` so it can be borrowed as CSC pointers.
    column_start: Vec<usize>,
    row_indices: Vec<usize>,
    values: Vec<f64>,
    rgrowth_threshold: f64,
}

impl SparseMatrix {
    /// Empty matrix; `estimated_value_count` only pre-allocates.
    pub fn new(rows: usize, columns: usize, estimated_value_count: usize) -> MatrixResult<Self> {
        check_size(rows, columns)?;
        let mut column_start = Vec::with_capacity(columns + 1);
        column_start.push(0);
        Ok(Self {
            shape: Shape { rows, columns },
            column_start,
            row_indices: Vec::with_capacity(estimated_value_count),
            values: Vec::with_capacity(estimated_value_count),
            rgrowth_threshold: DEFAULT_RGROWTH_THRESHOLD,
        })
    }

    /// Matrix from raw CSC arrays (`column_start` has `columns + 1` entries).
    ///
    /// The result is fully filled: further `set`/`add` calls may only target
    /// the last column.
    pub fn from_parts(
        rows: usize,
        columns: usize,
        column_start: Vec<usize>,
        row_indices: Vec<usize>,
        values: Vec<f64>,
    ) -> MatrixResult<Self> {
        check_size(rows, columns)?;
        if column_start.len() != columns + 1 {
            return Err(MatrixError::DimensionMismatch(format!(
                "column start array length has to be column count + 1 ({} != {})",
                column_start.len(),
                columns + 1
            )));
        }
        if row_indices.len() != values.len() {
            return Err(MatrixError::DimensionMismatch(format!(
                "row indices and values arrays must have the same length ({} != {})",
                row_indices.len(),
                values.len()
            )));
        }
        if column_start[0] != 0
            || column_start[columns] != values.len()
            || column_start.windows(2).any(|w| w[0] > w[1])
        {
            return Err(MatrixError::InvalidSize(
                "column start array must be non-decreasing from 0 to the value count".to_string(),
            ));
        }
        if let Some(&row) = row_indices.iter().find(|&&row| row >= rows) {
            return Err(MatrixError::out_of_bounds("row", row, rows));
        }
        Ok(Self {
            shape: Shape { rows, columns },
            column_start,
            row_indices,
            values,
            rgrowth_threshold: DEFAULT_RGROWTH_THRESHOLD,
        })
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

    pub fn rgrowth_threshold(&self) -> f64 {
        self.rgrowth_threshold
    }

    pub fn set_rgrowth_threshold(&mut self, threshold: f64) {
        self.rgrowth_threshold = threshold;
    }

    /// Column currently open for fill, if any value was written.
    pub fn current_column(&self) -> Option<usize> {
        (self.column_start.len() - 1).checked_sub(1)
    }

    fn started_columns(&self) -> usize {
        self.column_start.len() - 1
    }

    /// Make `column` the fill column, closing skipped columns as empty.
    fn open_column(&mut self, column: usize) -> MatrixResult<()> {
        let started = self.started_columns();
        if column + 1 < started {
            return Err(MatrixError::ColumnOrder {
                column,
                current: started - 1,
            });
        }
        let nnz = self.values.len();
        while self.started_columns() <= column {
            self.column_start.push(nnz);
        }
        Ok(())
    }

    fn push(&mut self, i: usize, value: f64) {
        self.row_indices.push(i);
        self.values.push(value);
        if let Some(end) = self.column_start.last_mut() {
            *end = self.values.len();
        }
    }

    /// Append `value` at `(i, j)`.
    pub fn set(&mut self, i: usize, j: usize, value: f64) -> MatrixResult<()> {
        self.shape.check_bounds(i, j)?;
        self.open_column(j)?;
        self.push(i, value);
        Ok(())
    }

    /// Add `value` at `(i, j)`.
    ///
    /// Accumulates into the previous entry only when that entry is at the
    /// same row of the same column; otherwise a new entry is appended. To get
    /// a single stored value per element, callers add the contributions of
    /// one element consecutively.
    pub fn add(&mut self, i: usize, j: usize, value: f64) -> MatrixResult<()> {
        self.shape.check_bounds(i, j)?;
        self.open_column(j)?;
        let column_begin = self.column_start[j];
        let accumulates =
            self.values.len() > column_begin && self.row_indices.last() == Some(&i);
        if accumulates {
            if let Some(last) = self.values.last_mut() {
                *last += value;
            }
        } else {
            self.push(i, value);
        }
        Ok(())
    }

    /// [`add`](Self::add), returning the storage index of the updated entry.
    pub fn add_and_get_index(&mut self, i: usize, j: usize, value: f64) -> MatrixResult<usize> {
        self.add(i, j, value)?;
        Ok(self.values.len() - 1)
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

    /// Zero every stored value, keeping the structure.
    pub fn reset(&mut self) {
        self.values.fill(0.0);
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Storage range of column `j`.
    fn column_range(&self, j: usize) -> std::ops::Range<usize> {
        if j < self.started_columns() {
            self.column_start[j]..self.column_start[j + 1]
        } else {
            0..0
        }
    }

    /// Calls `handler(i, j, value)` for every stored entry, column by column.
    pub fn iterate_non_zero_value<F>(&self, mut handler: F)
    where
        F: FnMut(usize, usize, f64),
    {
        for j in 0..self.started_columns() {
            for k in self.column_range(j) {
                handler(self.row_indices[k], j, self.values[k]);
            }
        }
    }

    pub fn iterate_non_zero_value_of_column<F>(&self, j: usize, mut handler: F) -> MatrixResult<()>
    where
        F: FnMut(usize, usize, f64),
    {
        if j >= self.columns() {
            return Err(MatrixError::out_of_bounds("column", j, self.columns()));
        }
        for k in self.column_range(j) {
            handler(self.row_indices[k], j, self.values[k]);
        }
        Ok(())
    }

    /// CSC column pointers (`columns + 1` entries).
    pub fn column_start(&self) -> Vec<usize> {
        let nnz = self.values.len();
        let mut starts = self.column_start.clone();
        starts.resize(self.columns() + 1, nnz);
        starts
    }

    pub fn column_value_count(&self) -> Vec<usize> {
        (0..self.columns()).map(|j| self.column_range(j).len()).collect()
    }

    pub fn row_indices(&self) -> &[usize] {
        &self.row_indices
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// CSC arrays for a kernel call. Pointers are only copied when trailing
    /// columns have not been reached by the fill yet.
    pub fn csc(&self) -> CscView<'_> {
        let column_start = if self.column_start.len() == self.columns() + 1 {
            Cow::Borrowed(self.column_start.as_slice())
        } else {
            Cow::Owned(self.column_start())
        };
        CscView {
            rows: self.shape.rows,
            columns: self.shape.columns,
            column_start,
            row_indices: &self.row_indices,
            values: &self.values,
        }
    }

    pub fn to_dense(&self) -> MatrixResult<DenseMatrix> {
        let mut dense = DenseMatrix::new(self.rows(), self.columns())?;
        let mut result = Ok(());
        self.iterate_non_zero_value(|i, j, value| {
            if result.is_ok() {
                result = dense.add(i, j, value);
            }
        });
        result.map(|_| dense)
    }

    /// `self * other`, computed by the default sparse kernel.
    pub fn times(&self, other: &SparseMatrix) -> MatrixResult<SparseMatrix> {
        if self.columns() != other.rows() {
            return Err(MatrixError::DimensionMismatch(format!(
                "Invalid matrices inner dimension ({} != {})",
                self.columns(),
                other.rows()
            )));
        }
        let threshold = self.rgrowth_threshold;
        let mut product = default_kernel().multiply(&self.csc(), &other.csc())?;
        product.rgrowth_threshold = threshold;
        Ok(product)
    }

    /// `scalar * self * other`.
    pub fn times_scaled(
        &self,
        other: &SparseMatrix,
        scalar: f64,
    ) -> MatrixResult<SparseMatrix> {
        let mut product = self.times(other)?;
        product.values.iter_mut().for_each(|v| *v *= scalar);
        Ok(product)
    }

    /// `alpha * self + beta * other`, computed by the default sparse kernel.
    pub fn add_matrix(
        &self,
        other: &SparseMatrix,
        alpha: f64,
        beta: f64,
    ) -> MatrixResult<SparseMatrix> {
        if self.shape != other.shape {
            return Err(MatrixError::DimensionMismatch(format!(
                "Incompatible matrices dimensions ({}x{} and {}x{})",
                self.rows(),
                self.columns(),
                other.rows(),
                other.columns()
            )));
        }
        let threshold = self.rgrowth_threshold;
        let mut sum = default_kernel().add(&self.csc(), &other.csc(), alpha, beta)?;
        sum.rgrowth_threshold = threshold;
        Ok(sum)
    }

    pub fn transpose(&self) -> MatrixResult<SparseMatrix> {
        let threshold = self.rgrowth_threshold;
        let mut transposed = default_kernel().transpose(&self.csc())?;
        transposed.rgrowth_threshold = threshold;
        Ok(transposed)
    }

    /// Factorize with the default sparse kernel.
    pub fn decompose_lu(&self) -> MatrixResult<SparseLuDecomposition> {
        SparseLuDecomposition::new(self, default_kernel())
    }

    /// Serialize as JSON.
    pub fn write_json<W: Write>(&self, writer: W) -> MatrixResult<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Deserialize from JSON; the CSC structure is validated.
    pub fn read_json<R: Read>(reader: R) -> MatrixResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn write_json_file(&self, path: impl AsRef<Path>) -> MatrixResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_json_file(path: impl AsRef<Path>) -> MatrixResult<Self> {
        Self::read_json(BufReader::new(File::open(path)?))
    }
}

fn check_size(rows: usize, columns: usize) -> MatrixResult<()> {
    if rows < 1 {
        return Err(MatrixError::InvalidSize(
            "row count has to be strictly positive".to_string(),
        ));
    }
    if columns < 1 {
        return Err(MatrixError::InvalidSize(
            "column count has to be strictly positive".to_string(),
        ));
    }
    Ok(())
}

/// Two sparse matrices are equal when their CSC arrays are, regardless of
/// how far the fill cursor advanced.
impl PartialEq for SparseMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
            && self.column_start() == other.column_start()
            && self.row_indices == other.row_indices
            && self.values == other.values
    }
}

impl fmt::Display for SparseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rowCount={}", self.rows())?;
        writeln!(f, "columnCount={}", self.columns())?;
        writeln!(f, "columnStart={:?}", self.column_start())?;
        writeln!(f, "columnValueCount={:?}", self.column_value_count())?;
        writeln!(f, "rowIndices={:?}", self.row_indices)?;
        writeln!(f, "values={:?}", self.values)
    }
}

/// On-disk form of a [`SparseMatrix`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SparseMatrixData {
    rows: usize,
    columns: usize,
    column_start: Vec<usize>,
    row_indices: Vec<usize>,
    values: Vec<f64>,
    #[serde(default = "default_rgrowth_threshold")]
    rgrowth_threshold: f64,
}

fn default_rgrowth_threshold() -> f64 {
    DEFAULT_RGROWTH_THRESHOLD
}

impl From<SparseMatrix> for SparseMatrixData {
    fn from(matrix: SparseMatrix) -> Self {
        let column_start = matrix.column_start();
        Self {
            rows: matrix.shape.rows,
            columns: matrix.shape.columns,
            column_start,
            row_indices: matrix.row_indices,
            values: matrix.values,
            rgrowth_threshold: matrix.rgrowth_threshold,
        }
    }
}

impl TryFrom<SparseMatrixData> for SparseMatrix {
    type Error = MatrixError;

    fn try_from(data: SparseMatrixData) -> Result<Self, Self::Error> {
        let mut matrix = SparseMatrix::from_parts(
            data.rows,
            data.columns,
            data.column_start,
            data.row_indices,
            data.values,
        )?;
        matrix.rgrowth_threshold = data.rgrowth_threshold;
        Ok(matrix)
    }
}
