//! Date decomposition.
//!
//! Parses a date column and splits it into numeric features:
//!
//! ```text
//! date_recorded = 2011-03-14
//!   -> year_recorded  = 2011
//!   -> month_recorded = 3
//!   -> date_recorded  = 734210   (proleptic Gregorian ordinal, 0001-01-01 = 1)
//! ```
//!
//! After this step no column holds date values.

use crate::preprocessing::error::{PreprocessingError, Result};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::{Column, Table, Value};
use chrono::{Datelike, NaiveDate};

/// Splits a date column into ordinal, year and month columns.
#[derive(Clone, Debug)]
pub struct DateDecomposer {
    column: String,
    year_column: String,
    month_column: String,
    formats: Vec<String>,
}

impl Default for DateDecomposer {
    fn default() -> Self {
        Self::new("date_recorded", "year_recorded", "month_recorded")
    }
}

impl DateDecomposer {
    /// Decompose `column` into `year_column` and `month_column`.
    pub fn new(
        column: impl Into<String>,
        year_column: impl Into<String>,
        month_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            year_column: year_column.into(),
            month_column: month_column.into(),
            formats: vec!["%Y-%m-%d".to_string(), "%Y/%m/%d".to_string()],
        }
    }

    /// Set the accepted text formats, tried in order.
    pub fn with_formats<S: Into<String>>(mut self, formats: impl IntoIterator<Item = S>) -> Self {
        self.formats = formats.into_iter().map(Into::into).collect();
        self
    }

    fn parse(&self, value: &Value) -> Result<Option<NaiveDate>> {
        match value {
            v if v.is_missing() => Ok(None),
            Value::Date(d) => Ok(Some(*d)),
            Value::Text(s) => {
                let trimmed = s.trim();
                self.formats
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
                    .map(Some)
                    .ok_or_else(|| PreprocessingError::InvalidValue {
                        column: self.column.clone(),
                        value: s.clone(),
                    })
            }
            other => Err(PreprocessingError::TypeMismatch {
                column: self.column.clone(),
                expected: "date".to_string(),
                got: other.type_name().to_string(),
            }),
        }
    }
}

impl Transformer for DateDecomposer {
    type Fitted = DateDecomposer;

    fn fit(&self, training: &Table) -> Result<Self::Fitted> {
        training.require(&[&self.column])?;
        Ok(self.clone())
    }
}

impl FittedTransformer for DateDecomposer {
    type Params = Vec<String>;

    fn transform(&self, mut table: Table) -> Result<Table> {
        let dates = table
            .values(&self.column)?
            .iter()
            .map(|v| self.parse(v))
            .collect::<Result<Vec<_>>>()?;

        let ordinals = dates.iter().map(|d| d.map(|d| f64::from(d.num_days_from_ce())));
        table.replace_column(&self.column, Column::numeric(self.column.clone(), ordinals))?;
        table.push_column(Column::numeric(
            self.year_column.clone(),
            dates.iter().map(|d| d.map(|d| f64::from(d.year()))),
        ))?;
        table.push_column(Column::numeric(
            self.month_column.clone(),
            dates.iter().map(|d| d.map(|d| f64::from(d.month()))),
        ))?;
        Ok(table)
    }

    fn extract_params(&self) -> Self::Params {
        self.formats.clone()
    }
}
