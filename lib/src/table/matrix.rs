//! Dense numeric hand-off format for the model trainer.

use crate::preprocessing::error::{PreprocessingError, Result};

/// Row-major `f64` matrix with named columns.
///
/// Missing cells are `NaN`.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl FeatureMatrix {
    /// Create a matrix from a row-major buffer.
    pub fn new(columns: Vec<String>, data: Vec<f64>, rows: usize, cols: usize) -> Result<Self> {
        if columns.len() != cols || data.len() != rows * cols {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("({}, {}) with {} names", rows, cols, cols),
                got: format!("{} values and {} names", data.len(), columns.len()),
            });
        }
        Ok(Self {
            columns,
            data,
            rows,
            cols,
        })
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Column names.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// One row as a slice.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Single cell.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// The row-major buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Whether any cell is `NaN`.
    pub fn has_missing(&self) -> bool {
        self.data.iter().any(|x| x.is_nan())
    }

    /// Convert into an `ndarray::Array2`.
    #[cfg(feature = "ndarray")]
    pub fn into_array2(self) -> Result<ndarray::Array2<f64>> {
        ndarray::Array2::from_shape_vec((self.rows, self.cols), self.data).map_err(|e| {
            PreprocessingError::InvalidShape {
                expected: format!("({}, {})", self.rows, self.cols),
                got: e.to_string(),
            }
        })
    }
}
