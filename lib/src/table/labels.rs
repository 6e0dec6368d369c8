//! Class labels aligned with the training table.

use crate::preprocessing::error::{PreprocessingError, Result};
use std::collections::BTreeSet;

/// One class label per training row, e.g. `functional`, `non functional`,
/// `functional needs repair`.
///
/// Classes are kept in sorted order; [`Labels::class_indices`] maps each row
/// to its position in [`Labels::classes`].
#[derive(Clone, Debug, PartialEq)]
pub struct Labels {
    values: Vec<String>,
    classes: Vec<String>,
    indices: Vec<usize>,
}

impl Labels {
    /// Wrap row labels.
    ///
    /// # Errors
    /// `EmptyData` if no labels are given.
    pub fn new<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Result<Self> {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(PreprocessingError::EmptyData(
                "Labels need at least one row".to_string(),
            ));
        }
        let classes: Vec<String> = values
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let indices = values
            .iter()
            .map(|v| classes.binary_search(v).unwrap_or_default())
            .collect();
        Ok(Self {
            values,
            classes,
            indices,
        })
    }

    /// Number of labelled rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; empty label sets are rejected by [`Labels::new`].
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Distinct classes, sorted.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of distinct classes.
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Raw labels in row order.
    pub fn as_slice(&self) -> &[String] {
        &self.values
    }

    /// Class index of every row.
    pub fn class_indices(&self) -> &[usize] {
        &self.indices
    }

    /// Share of rows per class, aligned with [`Labels::classes`].
    pub fn class_rates(&self) -> Vec<f64> {
        let mut counts = vec![0usize; self.classes.len()];
        for &k in &self.indices {
            counts[k] += 1;
        }
        let n = self.values.len() as f64;
        counts.into_iter().map(|c| c as f64 / n).collect()
    }

    /// Fail unless there is exactly one label per row of a table with `rows` rows.
    pub fn check_rows(&self, rows: usize) -> Result<()> {
        if self.values.len() != rows {
            return Err(PreprocessingError::LabelMismatch {
                expected: rows,
                got: self.values.len(),
            });
        }
        Ok(())
    }
}
