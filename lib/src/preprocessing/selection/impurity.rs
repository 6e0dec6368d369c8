//! Gini impurity of indicator columns.

use crate::preprocessing::error::{PreprocessingError, Result};
use crate::table::Table;
use indexmap::IndexMap;

/// Binary Gini impurity for a positive rate `p`.
///
/// ```
/// use waterpoint_features::preprocessing::selection::gini;
///
/// assert_eq!(gini(0.5), 0.5);
/// assert_eq!(gini(0.0), 0.0);
/// ```
pub fn gini(p: f64) -> f64 {
    1.0 - (p * p + (1.0 - p) * (1.0 - p))
}

/// Impurity of each named column of the training table.
///
/// `p` is the column mean over its non-missing values. The result keeps the
/// order of `columns`. Neither table is modified.
///
/// # Errors
/// `MissingColumn` if a column is absent, `TypeMismatch` for text or date
/// values, `EmptyData` if a column has no non-missing values.
pub fn impurity_scores<S: AsRef<str>>(training: &Table, columns: &[S]) -> Result<IndexMap<String, f64>> {
    training.require(columns)?;
    let mut scores = IndexMap::with_capacity(columns.len());
    for name in columns {
        let name = name.as_ref();
        let mut sum = 0.0;
        let mut count = 0usize;
        for value in training.values(name)? {
            if value.is_missing() {
                continue;
            }
            let x = value.as_f64().ok_or_else(|| PreprocessingError::TypeMismatch {
                column: name.to_string(),
                expected: "number or bool".to_string(),
                got: value.type_name().to_string(),
            })?;
            sum += x;
            count += 1;
        }
        if count == 0 {
            return Err(PreprocessingError::EmptyData(format!(
                "Column '{}' has no values to score",
                name
            )));
        }
        scores.insert(name.to_string(), gini(sum / count as f64));
    }
    Ok(scores)
}
