//! Boolean normalization.
//!
//! Fills missing flags with `false` and stores them as numeric `0`/`1`.
//! Numeric `0`/`1` input is passed through, so applying the step twice gives
//! the same result as applying it once.

use crate::preprocessing::error::{PreprocessingError, Result};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::{Column, Table, Value};

/// Normalizes boolean flag columns to numeric `0`/`1`.
#[derive(Clone, Debug)]
pub struct BooleanNormalizer {
    columns: Vec<String>,
}

impl Default for BooleanNormalizer {
    fn default() -> Self {
        Self::new(["public_meeting", "permit"])
    }
}

impl BooleanNormalizer {
    /// Normalize the given columns.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

fn to_flag(column: &str, value: &Value) -> Result<f64> {
    match value {
        v if v.is_missing() => Ok(0.0),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Number(x) if *x == 0.0 || *x == 1.0 => Ok(*x),
        other => Err(PreprocessingError::InvalidValue {
            column: column.to_string(),
            value: format!("{} ({})", other, other.type_name()),
        }),
    }
}

impl Transformer for BooleanNormalizer {
    type Fitted = BooleanNormalizer;

    fn fit(&self, training: &Table) -> Result<Self::Fitted> {
        training.require(&self.columns)?;
        Ok(self.clone())
    }
}

impl FittedTransformer for BooleanNormalizer {
    type Params = Vec<String>;

    fn transform(&self, mut table: Table) -> Result<Table> {
        for name in &self.columns {
            let flags = table
                .values(name)?
                .iter()
                .map(|v| to_flag(name, v).map(Some))
                .collect::<Result<Vec<_>>>()?;
            table.replace_column(name, Column::numeric(name.clone(), flags))?;
        }
        Ok(table)
    }

    fn extract_params(&self) -> Self::Params {
        self.columns.clone()
    }
}
