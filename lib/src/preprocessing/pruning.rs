//! Column pruning.
//!
//! Drops a fixed list of columns that carry no usable signal: identifiers,
//! near-constant columns, very high cardinality labels and mostly-null
//! columns. No statistics are learned; fitting only checks that every listed
//! column exists so the step fails before touching either table.

use crate::preprocessing::error::Result;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::Table;
use serde::Serialize;

/// Removes a fixed set of columns from both tables.
#[derive(Clone, Debug, Serialize)]
pub struct ColumnPruner {
    columns: Vec<String>,
}

impl ColumnPruner {
    /// Prune the given columns.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Columns removed by this step.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Transformer for ColumnPruner {
    type Fitted = ColumnPruner;

    fn fit(&self, training: &Table) -> Result<Self::Fitted> {
        training.require(&self.columns)?;
        Ok(self.clone())
    }
}

impl FittedTransformer for ColumnPruner {
    type Params = Vec<String>;

    fn transform(&self, mut table: Table) -> Result<Table> {
        table.drop_columns(&self.columns)?;
        Ok(table)
    }

    fn extract_params(&self) -> Self::Params {
        self.columns.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::error::PreprocessingError;
    use crate::preprocessing::traits::PairStep;
    use crate::table::{ColumnKind, Schema, TablePair, Value};

    fn table() -> Table {
        let schema = Schema::new()
            .with_column("id", ColumnKind::Numeric)
            .with_column("wpt_name", ColumnKind::Categorical)
            .with_column("population", ColumnKind::Numeric);
        Table::from_rows(
            &schema,
            vec![vec![Value::from(1.0), Value::from("none"), Value::from(50.0)]],
        )
        .unwrap()
    }

    #[test]
    fn test_prunes_both_tables() {
        let pruner = ColumnPruner::new(["id", "wpt_name"]);
        let out = pruner.apply(TablePair::new(table(), table())).unwrap();
        assert_eq!(out.training.column_names(), vec!["population"]);
        assert_eq!(out.evaluation.column_names(), vec!["population"]);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let pruner = ColumnPruner::new(["id", "scheme_name"]);
        let result = pruner.apply(TablePair::new(table(), table()));
        assert!(matches!(
            result,
            Err(PreprocessingError::MissingColumn { column }) if column == "scheme_name"
        ));
    }

    #[test]
    fn test_missing_in_evaluation_is_fatal() {
        let pruner = ColumnPruner::new(["id"]);
        let mut evaluation = table();
        evaluation.drop_column("id").unwrap();
        assert!(pruner.apply(TablePair::new(table(), evaluation)).is_err());
    }
}
