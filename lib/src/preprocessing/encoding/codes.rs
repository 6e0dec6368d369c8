//! Code stringification.
//!
//! Region and district codes are integers that name places, not quantities.
//! This step turns them into category labels (`11.0` -> `"11"`) and marks the
//! columns categorical so the one-hot encoder picks them up.

use crate::preprocessing::error::Result;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::{format_number, Column, ColumnKind, Table, Value};

/// Converts integer-coded columns to categorical labels.
#[derive(Clone, Debug)]
pub struct CodeStringifier {
    columns: Vec<String>,
}

impl Default for CodeStringifier {
    fn default() -> Self {
        Self::new(["region_code", "district_code"])
    }
}

impl CodeStringifier {
    /// Stringify the given columns.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Columns converted by this step.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Stringify every configured column of `table`.
    pub(crate) fn stringify(&self, mut table: Table) -> Result<Table> {
        for name in &self.columns {
            let labels = table
                .values(name)?
                .iter()
                .map(|v| match v {
                    Value::Number(x) if !x.is_nan() => Value::Text(format_number(*x)),
                    Value::Text(_) => v.clone(),
                    other => other.label().map_or(Value::Missing, Value::Text),
                })
                .collect();
            table.replace_column(name, Column::new(name.as_str(), ColumnKind::Categorical, labels)?)?;
        }
        Ok(table)
    }
}

impl Transformer for CodeStringifier {
    type Fitted = CodeStringifier;

    fn fit(&self, training: &Table) -> Result<Self::Fitted> {
        training.require(&self.columns)?;
        Ok(self.clone())
    }
}

impl FittedTransformer for CodeStringifier {
    type Params = Vec<String>;

    fn transform(&self, table: Table) -> Result<Table> {
        self.stringify(table)
    }

    fn extract_params(&self) -> Self::Params {
        self.columns.clone()
    }
}
