//! Tiered amount bucketing.
//!
//! Splits a monetary column into quantile tiers learned from the training
//! table's non-zero values and one-hot encodes the tier:
//!
//! ```text
//! cut points c0..c4 = quantiles 0, .25, .5, .75, 1 of non-zero training values
//!
//! q1: [c0, c1]   q2: (c1, c2]   q3: (c2, c3]   q4: (c3, c4]
//! null: zero, missing, or outside [c0, c4]
//! ```
//!
//! Quantiles use linear interpolation between order statistics. The source
//! column is replaced by `<column>_q1..<column>_qN` and `<column>_null`.

use crate::preprocessing::error::{PreprocessingError, Result};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::{Column, Table};
use serde::Serialize;
use tracing::debug;

/// Quantile bucketer (unfitted).
#[derive(Clone, Debug)]
pub struct AmountBucketer {
    column: String,
    n_buckets: usize,
}

impl AmountBucketer {
    /// Quartile buckets for `column`.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            n_buckets: 4,
        }
    }

    /// Set the number of buckets.
    ///
    /// # Panics
    /// Panics if `n_buckets` is zero.
    pub fn with_buckets(mut self, n_buckets: usize) -> Self {
        assert!(n_buckets > 0, "Bucket count must be positive");
        self.n_buckets = n_buckets;
        self
    }
}

/// Learned cut points of a fitted [`AmountBucketer`].
#[derive(Clone, Debug, Serialize)]
pub struct BucketParams {
    /// Bucketed column.
    pub column: String,
    /// `n_buckets + 1` non-decreasing boundaries.
    pub cut_points: Vec<f64>,
}

/// Fitted quantile bucketer.
#[derive(Clone, Debug)]
pub struct FittedAmountBucketer {
    params: BucketParams,
}

impl FittedAmountBucketer {
    /// Learned boundaries.
    pub fn cut_points(&self) -> &[f64] {
        &self.params.cut_points
    }

    /// Bucket index (0-based) of `value`, or `None` if it gets no bucket.
    pub fn bucket_of(&self, value: Option<f64>) -> Option<usize> {
        let cuts = &self.params.cut_points;
        let v = value.filter(|v| *v != 0.0)?;
        let (first, last) = (cuts[0], cuts[cuts.len() - 1]);
        if v < first || v > last {
            return None;
        }
        cuts[1..].iter().position(|&upper| v <= upper)
    }

    /// Names of the emitted columns: buckets in order, then the null flag.
    pub fn output_columns(&self) -> Vec<String> {
        let column = &self.params.column;
        (1..self.params.cut_points.len())
            .map(|i| format!("{}_q{}", column, i))
            .chain(std::iter::once(format!("{}_null", column)))
            .collect()
    }
}

/// Quantile of sorted data with linear interpolation.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let idx = q * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let frac = idx - lower as f64;
    sorted[lower] * (1.0 - frac) + sorted[upper] * frac
}

impl Transformer for AmountBucketer {
    type Fitted = FittedAmountBucketer;

    fn fit(&self, training: &Table) -> Result<Self::Fitted> {
        let mut values: Vec<f64> = training
            .column(&self.column)?
            .numbers()
            .into_iter()
            .flatten()
            .filter(|v| *v != 0.0)
            .collect();
        if values.is_empty() {
            return Err(PreprocessingError::EmptyData(format!(
                "No non-zero values in '{}' to bucket",
                self.column
            )));
        }
        values.sort_by(f64::total_cmp);

        let cut_points: Vec<f64> = (0..=self.n_buckets)
            .map(|i| quantile(&values, i as f64 / self.n_buckets as f64))
            .collect();
        debug!(column = %self.column, cut_points = ?cut_points, "fitted bucket cut points");

        Ok(FittedAmountBucketer {
            params: BucketParams {
                column: self.column.clone(),
                cut_points,
            },
        })
    }
}

impl FittedTransformer for FittedAmountBucketer {
    type Params = BucketParams;

    fn transform(&self, mut table: Table) -> Result<Table> {
        let source = table.drop_column(&self.params.column)?;
        let buckets: Vec<Option<usize>> = source
            .numbers()
            .into_iter()
            .map(|v| self.bucket_of(v))
            .collect();

        let mut names = self.output_columns();
        let null_name = names.pop().unwrap_or_default();
        for (i, name) in names.into_iter().enumerate() {
            table.push_column(Column::indicator(name, buckets.iter().map(|b| *b == Some(i))))?;
        }
        table.push_column(Column::indicator(null_name, buckets.iter().map(Option::is_none)))?;
        Ok(table)
    }

    fn extract_params(&self) -> Self::Params {
        self.params.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::traits::PairStep;
    use crate::table::{ColumnKind, Schema, TablePair, Value};

    fn amounts(values: &[f64]) -> Table {
        let schema = Schema::new().with_column("amount_tsh", ColumnKind::Numeric);
        Table::from_rows(&schema, values.iter().map(|v| vec![Value::from(*v)]).collect()).unwrap()
    }

    fn flags(table: &Table, name: &str) -> Vec<bool> {
        table
            .values(name)
            .unwrap()
            .iter()
            .map(|v| *v == Value::Bool(true))
            .collect()
    }

    #[test]
    fn test_quartiles_from_non_zero_values() {
        let training = amounts(&[0.0, 10.0, 20.0, 30.0, 40.0]);
        let fitted = AmountBucketer::new("amount_tsh").fit(&training).unwrap();
        assert_eq!(fitted.cut_points(), &[10.0, 17.5, 25.0, 32.5, 40.0]);

        let out = fitted.transform(training).unwrap();
        assert_eq!(
            out.column_names(),
            vec![
                "amount_tsh_q1",
                "amount_tsh_q2",
                "amount_tsh_q3",
                "amount_tsh_q4",
                "amount_tsh_null"
            ]
        );
        assert_eq!(flags(&out, "amount_tsh_q1"), vec![false, true, false, false, false]);
        assert_eq!(flags(&out, "amount_tsh_q2"), vec![false, false, true, false, false]);
        assert_eq!(flags(&out, "amount_tsh_q3"), vec![false, false, false, true, false]);
        assert_eq!(flags(&out, "amount_tsh_q4"), vec![false, false, false, false, true]);
        assert_eq!(flags(&out, "amount_tsh_null"), vec![true, false, false, false, false]);
    }

    #[test]
    fn test_evaluation_outside_training_range_is_flagged() {
        let training = amounts(&[0.0, 10.0, 20.0, 30.0, 40.0]);
        let evaluation = amounts(&[5.0, 40.0, 1000.0, 0.0]);
        let out = AmountBucketer::new("amount_tsh")
            .apply(TablePair::new(training, evaluation))
            .unwrap();
        assert_eq!(
            flags(&out.evaluation, "amount_tsh_null"),
            vec![true, false, true, true]
        );
        assert_eq!(
            flags(&out.evaluation, "amount_tsh_q4"),
            vec![false, true, false, false]
        );
    }

    #[test]
    fn test_every_row_has_exactly_one_flag() {
        let training = amounts(&[0.0, 3.0, 3.0, 3.0, 8.0, 20.0, 500.0]);
        let out = AmountBucketer::new("amount_tsh").fit_transform(training).unwrap();
        for row in 0..out.n_rows() {
            let set = out
                .columns()
                .iter()
                .filter(|c| c.values()[row] == Value::Bool(true))
                .count();
            assert_eq!(set, 1, "row {}", row);
        }
    }

    #[test]
    fn test_missing_value_is_flagged() {
        let schema = Schema::new().with_column("amount_tsh", ColumnKind::Numeric);
        let training = Table::from_rows(
            &schema,
            vec![vec![Value::from(10.0)], vec![Value::Missing], vec![Value::from(20.0)]],
        )
        .unwrap();
        let out = AmountBucketer::new("amount_tsh").fit_transform(training).unwrap();
        assert_eq!(flags(&out, "amount_tsh_null"), vec![false, true, false]);
    }

    #[test]
    fn test_all_zero_training_is_empty() {
        let result = AmountBucketer::new("amount_tsh").fit(&amounts(&[0.0, 0.0]));
        assert!(matches!(result, Err(PreprocessingError::EmptyData(_))));
    }
}
