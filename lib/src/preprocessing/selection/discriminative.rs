//! Discriminative indicator filter.
//!
//! For each candidate indicator column, the class mix of the training rows
//! where it is set is compared with the class mix of the whole training
//! table:
//!
//! ```text
//! deviation(col) = max over classes k of | P(k | col = 1) - P(k) |
//! ```
//!
//! Columns whose deviation exceeds the margin are kept. Columns never set in
//! the training table are removed. Columns that are not candidates are never
//! touched.

use crate::preprocessing::error::Result;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::{ColumnKind, Labels, Table};
use serde::Serialize;
use tracing::debug;

/// Removes indicator columns that do not shift the class distribution.
#[derive(Clone, Debug)]
pub struct DiscriminativeFilter {
    labels: Labels,
    candidates: Option<Vec<String>>,
    margin: f64,
}

impl DiscriminativeFilter {
    /// Filter boolean indicator columns against the training `labels`.
    pub fn new(labels: Labels) -> Self {
        Self {
            labels,
            candidates: None,
            margin: 0.051,
        }
    }

    /// Restrict the filter to explicit candidate columns.
    pub fn with_candidates<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.candidates = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the minimum class-rate deviation (as a fraction) to keep a column.
    ///
    /// # Panics
    /// Panics if `margin` is negative or not finite.
    pub fn with_margin(mut self, margin: f64) -> Self {
        assert!(margin.is_finite() && margin >= 0.0, "Margin must be a non-negative number");
        self.margin = margin;
        self
    }

    fn deviation(&self, training: &Table, column: &str, overall: &[f64]) -> Result<Option<f64>> {
        let mut counts = vec![0usize; overall.len()];
        let mut set_rows = 0usize;
        for (value, &class) in training.values(column)?.iter().zip(self.labels.class_indices()) {
            if value.as_f64() == Some(1.0) {
                counts[class] += 1;
                set_rows += 1;
            }
        }
        if set_rows == 0 {
            return Ok(None);
        }
        let deviation = counts
            .iter()
            .zip(overall)
            .map(|(&c, &rate)| (c as f64 / set_rows as f64 - rate).abs())
            .fold(0.0, f64::max);
        Ok(Some(deviation))
    }
}

/// Deviation of one candidate column.
#[derive(Clone, Debug, Serialize)]
pub struct ColumnDeviation {
    /// Candidate column.
    pub column: String,
    /// Largest class-rate deviation; `None` if the column is never set.
    pub deviation: Option<f64>,
    /// Whether the column survives the filter.
    pub kept: bool,
}

/// Serializable parameters of a fitted [`DiscriminativeFilter`].
#[derive(Clone, Debug, Serialize)]
pub struct FilterParams {
    /// Margin the deviations were compared with.
    pub margin: f64,
    /// Overall training class rates, aligned with `classes`.
    pub class_rates: Vec<f64>,
    /// Sorted class labels.
    pub classes: Vec<String>,
    /// Per-candidate result, in column order.
    pub deviations: Vec<ColumnDeviation>,
}

/// Fitted filter holding the columns to remove.
#[derive(Clone, Debug)]
pub struct FittedDiscriminativeFilter {
    params: FilterParams,
}

impl FittedDiscriminativeFilter {
    /// Columns removed from both tables.
    pub fn removed(&self) -> Vec<&str> {
        self.params
            .deviations
            .iter()
            .filter(|d| !d.kept)
            .map(|d| d.column.as_str())
            .collect()
    }

    /// Candidate columns that survive.
    pub fn kept(&self) -> Vec<&str> {
        self.params
            .deviations
            .iter()
            .filter(|d| d.kept)
            .map(|d| d.column.as_str())
            .collect()
    }
}

impl Transformer for DiscriminativeFilter {
    type Fitted = FittedDiscriminativeFilter;

    fn fit(&self, training: &Table) -> Result<Self::Fitted> {
        self.labels.check_rows(training.n_rows())?;
        let candidates = match &self.candidates {
            Some(columns) => {
                training.require(columns)?;
                columns.clone()
            }
            None => training.columns_of_kind(ColumnKind::Boolean),
        };

        let overall = self.labels.class_rates();
        let mut deviations = Vec::with_capacity(candidates.len());
        for column in candidates {
            let deviation = self.deviation(training, &column, &overall)?;
            let kept = deviation.is_some_and(|d| d > self.margin);
            deviations.push(ColumnDeviation {
                column,
                deviation,
                kept,
            });
        }

        let removed = deviations.iter().filter(|d| !d.kept).count();
        debug!(
            candidates = deviations.len(),
            removed,
            margin = self.margin,
            "fitted discriminative filter"
        );

        Ok(FittedDiscriminativeFilter {
            params: FilterParams {
                margin: self.margin,
                class_rates: overall,
                classes: self.labels.classes().to_vec(),
                deviations,
            },
        })
    }
}

impl FittedTransformer for FittedDiscriminativeFilter {
    type Params = FilterParams;

    fn transform(&self, mut table: Table) -> Result<Table> {
        table.drop_columns(&self.removed())?;
        Ok(table)
    }

    fn extract_params(&self) -> Self::Params {
        self.params.clone()
    }
}
