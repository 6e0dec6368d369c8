//! One-hot encoding for categorical columns.
//!
//! Every column declared [`ColumnKind::Categorical`] is replaced by one
//! boolean indicator column per retained level, named `<column>_<level>`.
//! Missing values are encoded as the level `NULL`.
//!
//! Only levels that occur in **both** tables are retained (the level set):
//! an indicator that one table can never produce carries no information for
//! a model trained on one and evaluated on the other. Rows whose level falls
//! outside the level set get all-zero indicators for that column.
//!
//! The level set is the one place where the evaluation table shapes the
//! output, so [`CategoricalEncoder`] implements
//! [`PairStep`](crate::preprocessing::PairStep) directly instead of going
//! through [`Transformer`](crate::preprocessing::Transformer).
//!
//! # Example
//! ```ignore
//! // training basin: [Pangani, Rufiji, NULL], evaluation basin: [Rufiji, Pangani]
//! // level set: [Pangani, Rufiji]
//! //
//! //             basin_Pangani  basin_Rufiji
//! // Pangani           1             0
//! // Rufiji            0             1
//! // <missing>         0             0
//! ```

use crate::preprocessing::encoding::CodeStringifier;
use crate::preprocessing::error::Result;
use crate::preprocessing::traits::{short_type_name, FittedTransformer, PairStep};
use crate::table::{Column, ColumnKind, Table, TablePair, Value};
use indexmap::IndexSet;
use serde::Serialize;
use tracing::debug;

/// One-hot encoder for categorical columns.
#[derive(Clone, Debug)]
pub struct CategoricalEncoder {
    codes: CodeStringifier,
    null_label: String,
    separator: String,
}

impl Default for CategoricalEncoder {
    fn default() -> Self {
        Self {
            codes: CodeStringifier::default(),
            null_label: "NULL".to_string(),
            separator: "_".to_string(),
        }
    }
}

impl CategoricalEncoder {
    /// Create an encoder with the default code columns and `NULL` label.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the integer-coded columns re-coerced to labels before encoding.
    pub fn with_code_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.codes = CodeStringifier::new(columns);
        self
    }

    /// Set the level used for missing values.
    pub fn with_null_label(mut self, label: impl Into<String>) -> Self {
        self.null_label = label.into();
        self
    }

    /// Set the separator between column name and level in indicator names.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Compute the level sets of every categorical column.
    pub fn fit(&self, training: &Table, evaluation: &Table) -> Result<FittedCategoricalEncoder> {
        let training = self.codes.stringify(training.clone())?;
        let evaluation = self.codes.stringify(evaluation.clone())?;
        self.fit_stringified(&training, &evaluation)
    }

    fn fit_stringified(&self, training: &Table, evaluation: &Table) -> Result<FittedCategoricalEncoder> {
        let columns = training.columns_of_kind(ColumnKind::Categorical);
        evaluation.require(&columns)?;

        let mut level_sets = Vec::with_capacity(columns.len());
        for column in columns {
            let train_levels = distinct_levels(training.values(&column)?, &self.null_label);
            let eval_levels = distinct_levels(evaluation.values(&column)?, &self.null_label);
            let (levels, dropped): (Vec<String>, Vec<String>) = train_levels
                .into_iter()
                .partition(|level| eval_levels.contains(level));
            let evaluation_only = eval_levels.iter().filter(|l| !levels.contains(l)).count();
            if !dropped.is_empty() || evaluation_only > 0 {
                debug!(
                    column = %column,
                    retained = levels.len(),
                    training_only = dropped.len(),
                    evaluation_only,
                    "levels outside the level set encode as all-zero rows"
                );
            }
            level_sets.push(LevelSet {
                column,
                levels,
                training_only: dropped.len(),
                evaluation_only,
            });
        }

        Ok(FittedCategoricalEncoder {
            codes: self.codes.clone(),
            params: CategoricalEncoderParams {
                null_label: self.null_label.clone(),
                separator: self.separator.clone(),
                level_sets,
            },
        })
    }
}

fn level_of(value: &Value, null_label: &str) -> String {
    value.label().unwrap_or_else(|| null_label.to_string())
}

fn distinct_levels(values: &[Value], null_label: &str) -> IndexSet<String> {
    values.iter().map(|v| level_of(v, null_label)).collect()
}

impl PairStep for CategoricalEncoder {
    fn apply(&self, pair: TablePair) -> Result<TablePair> {
        let (training, evaluation) = pair.into_parts();
        let training = self.codes.stringify(training)?;
        let evaluation = self.codes.stringify(evaluation)?;
        let fitted = self.fit_stringified(&training, &evaluation)?;
        Ok(TablePair::new(
            fitted.encode(training)?,
            fitted.encode(evaluation)?,
        ))
    }

    fn step_name(&self) -> &'static str {
        short_type_name::<Self>()
    }
}

/// Retained levels of one categorical column.
#[derive(Clone, Debug, Serialize)]
pub struct LevelSet {
    /// Encoded column.
    pub column: String,
    /// Levels seen in both tables, in training first-appearance order.
    pub levels: Vec<String>,
    /// Number of training levels absent from the evaluation table.
    pub training_only: usize,
    /// Number of evaluation levels absent from the training table.
    pub evaluation_only: usize,
}

/// Serializable parameters of a fitted [`CategoricalEncoder`].
#[derive(Clone, Debug, Serialize)]
pub struct CategoricalEncoderParams {
    /// Level used for missing values.
    pub null_label: String,
    /// Separator between column name and level.
    pub separator: String,
    /// Level set per encoded column, in column order.
    pub level_sets: Vec<LevelSet>,
}

/// Fitted categorical encoder.
#[derive(Clone, Debug)]
pub struct FittedCategoricalEncoder {
    codes: CodeStringifier,
    params: CategoricalEncoderParams,
}

impl FittedCategoricalEncoder {
    /// Level set of `column`, if it was encoded.
    pub fn level_set(&self, column: &str) -> Option<&LevelSet> {
        self.params.level_sets.iter().find(|s| s.column == column)
    }

    /// Indicator column names produced for `column`.
    pub fn indicator_names(&self, column: &str) -> Vec<String> {
        self.level_set(column)
            .map(|set| {
                set.levels
                    .iter()
                    .map(|level| self.indicator_name(&set.column, level))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn indicator_name(&self, column: &str, level: &str) -> String {
        format!("{}{}{}", column, self.params.separator, level)
    }

    fn encode(&self, mut table: Table) -> Result<Table> {
        for set in &self.params.level_sets {
            let source = table.drop_column(&set.column)?;
            let labels: Vec<String> = source
                .values()
                .iter()
                .map(|v| level_of(v, &self.params.null_label))
                .collect();
            for level in &set.levels {
                table.push_column(Column::indicator(
                    self.indicator_name(&set.column, level),
                    labels.iter().map(|l| l == level),
                ))?;
            }
        }
        Ok(table)
    }
}

impl FittedTransformer for FittedCategoricalEncoder {
    type Params = CategoricalEncoderParams;

    fn transform(&self, table: Table) -> Result<Table> {
        self.encode(self.codes.stringify(table)?)
    }

    fn extract_params(&self) -> Self::Params {
        self.params.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::error::PreprocessingError;
    use crate::table::Schema;

    fn schema() -> Schema {
        Schema::new()
            .with_column("population", ColumnKind::Numeric)
            .with_column("basin", ColumnKind::Categorical)
            .with_column("region_code", ColumnKind::Numeric)
            .with_column("district_code", ColumnKind::Numeric)
    }

    fn row(pop: f64, basin: Option<&str>, region: f64, district: f64) -> Vec<Value> {
        vec![pop.into(), basin.into(), region.into(), district.into()]
    }

    fn pair() -> TablePair {
        let training = Table::from_rows(
            &schema(),
            vec![
                row(10.0, Some("Pangani"), 11.0, 1.0),
                row(20.0, Some("Rufiji"), 12.0, 1.0),
                row(30.0, None, 11.0, 2.0),
                row(40.0, Some("Ruvuma"), 13.0, 3.0),
            ],
        )
        .unwrap();
        let evaluation = Table::from_rows(
            &schema(),
            vec![
                row(50.0, Some("Rufiji"), 11.0, 1.0),
                row(60.0, None, 12.0, 2.0),
                row(70.0, Some("Pangani"), 99.0, 1.0),
                row(80.0, Some("Wami"), 11.0, 1.0),
            ],
        )
        .unwrap();
        TablePair::new(training, evaluation)
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
    fn test_level_set_is_intersection_in_training_order() {
        let (training, evaluation) = pair().into_parts();
        let fitted = CategoricalEncoder::new().fit(&training, &evaluation).unwrap();
        let basin = fitted.level_set("basin").unwrap();
        assert_eq!(basin.levels, vec!["Pangani", "Rufiji", "NULL"]);
        assert_eq!(basin.training_only, 1);
        assert_eq!(basin.evaluation_only, 1);
        assert_eq!(fitted.level_set("region_code").unwrap().levels, vec!["11", "12"]);
        assert_eq!(fitted.indicator_names("district_code"), vec!["district_code_1", "district_code_2"]);
    }

    #[test]
    fn test_encodes_both_tables_with_same_columns() {
        let out = CategoricalEncoder::new().apply(pair()).unwrap();
        let expected = vec![
            "population",
            "basin_Pangani",
            "basin_Rufiji",
            "basin_NULL",
            "region_code_11",
            "region_code_12",
            "district_code_1",
            "district_code_2",
        ];
        assert_eq!(out.training.column_names(), expected);
        assert_eq!(out.evaluation.column_names(), expected);
        assert!(out.training.check_parity(&out.evaluation).is_ok());
        assert_eq!(flags(&out.training, "basin_NULL"), vec![false, false, true, false]);
        assert_eq!(flags(&out.evaluation, "basin_Pangani"), vec![false, false, true, false]);
    }

    #[test]
    fn test_indicator_rows_sum_to_zero_or_one() {
        let out = CategoricalEncoder::new().apply(pair()).unwrap();
        for table in [&out.training, &out.evaluation] {
            for prefix in ["basin_", "region_code_", "district_code_"] {
                for row in 0..table.n_rows() {
                    let set = table
                        .columns()
                        .iter()
                        .filter(|c| c.name().starts_with(prefix))
                        .filter(|c| c.values()[row] == Value::Bool(true))
                        .count();
                    assert!(set <= 1, "{} row {} has {} levels set", prefix, row, set);
                }
            }
        }
        // Ruvuma (training only) and Wami (evaluation only) rows are all zero.
        assert!(!flags(&out.training, "basin_Pangani")[3] && !flags(&out.training, "basin_Rufiji")[3]);
        assert!(!flags(&out.evaluation, "basin_Pangani")[3] && !flags(&out.evaluation, "basin_Rufiji")[3]);
    }

    #[test]
    fn test_missing_categorical_in_evaluation() {
        let (training, mut evaluation) = pair().into_parts();
        evaluation.drop_column("basin").unwrap();
        let result = CategoricalEncoder::new().apply(TablePair::new(training, evaluation));
        assert!(matches!(result, Err(PreprocessingError::MissingColumn { .. })));
    }

    #[test]
    fn test_fitted_transform_matches_apply() {
        let (training, evaluation) = pair().into_parts();
        let fitted = CategoricalEncoder::new().fit(&training, &evaluation).unwrap();
        let direct = fitted.transform(evaluation.clone()).unwrap();
        let applied = CategoricalEncoder::new()
            .apply(TablePair::new(training, evaluation))
            .unwrap();
        assert_eq!(direct, applied.evaluation);
    }
}
