//! Hierarchical group-mean imputer.
//!
//! Fills missing values of one numeric column from a chain of progressively
//! broader groupings learned on the training table:
//!
//! ```text
//! value missing? -> mean of its group in tier 1 (e.g. funder)
//!                -> mean of its group in tier 2 (e.g. installer)
//!                -> ...
//!                -> overall training mean
//! ```
//!
//! Each tier only fills values that are still missing after the previous
//! tier, and its means are learned on the training column as filled by the
//! tiers before it. Sentinel values (by default none; `0` and `1` for construction
//! years and coordinates) are treated as missing before any tier runs.
//!
//! # Example
//! ```ignore
//! use waterpoint_features::preprocessing::{GroupMeanImputer, Transformer, FittedTransformer};
//!
//! let imputer = GroupMeanImputer::construction_year();
//! let fitted = imputer.fit(&training)?;
//! let evaluation = fitted.transform(evaluation)?;
//! ```

use crate::preprocessing::error::{PreprocessingError, Result};
use crate::preprocessing::imputation::FallbackPolicy;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::{Column, ColumnKind, Table, Value};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

/// Group-mean imputer (unfitted).
#[derive(Clone, Debug)]
pub struct GroupMeanImputer {
    column: String,
    group_by: Vec<String>,
    sentinels: Vec<f64>,
    fallback: FallbackPolicy,
}

impl GroupMeanImputer {
    /// Impute `column` with only the overall training mean.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            group_by: Vec::new(),
            sentinels: Vec::new(),
            fallback: FallbackPolicy::default(),
        }
    }

    /// Construction-year imputer: `0`/`1` are missing, fill by funder, then
    /// installer, then the overall mean.
    pub fn construction_year() -> Self {
        Self::new("construction_year")
            .with_group_by(["funder", "installer"])
            .with_sentinels([0.0, 1.0])
    }

    /// Set the grouping tiers, most specific first.
    pub fn with_group_by<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the values treated as missing.
    pub fn with_sentinels(mut self, sentinels: impl IntoIterator<Item = f64>) -> Self {
        self.sentinels = sentinels.into_iter().collect();
        self
    }

    /// Set what happens when every tier is exhausted.
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }
}

/// Means of one grouping tier.
#[derive(Clone, Debug, Serialize)]
pub struct GroupTier {
    /// Column the groups are keyed on.
    pub group_by: String,
    /// Training mean per group label. Groups with no known values are absent.
    pub means: IndexMap<String, f64>,
}

impl GroupTier {
    /// Fill still-missing values with the mean of their group.
    fn fill(&self, values: &mut [Option<f64>], keys: &[Value]) {
        for (value, key) in values.iter_mut().zip(keys) {
            if value.is_none() {
                *value = key.label().and_then(|k| self.means.get(&k).copied());
            }
        }
    }
}

/// Learned statistics of a fitted [`GroupMeanImputer`].
#[derive(Clone, Debug, Serialize)]
pub struct GroupMeanParams {
    /// Imputed column.
    pub column: String,
    /// Values treated as missing.
    pub sentinels: Vec<f64>,
    /// Grouping tiers in fill order.
    pub tiers: Vec<GroupTier>,
    /// Overall training mean; `None` if the training column has no values.
    pub overall_mean: Option<f64>,
}

/// Fitted group-mean imputer.
#[derive(Clone, Debug)]
pub struct FittedGroupMeanImputer {
    params: GroupMeanParams,
    fallback: FallbackPolicy,
}

impl FittedGroupMeanImputer {
    /// Mean learned for `group` in the tier keyed on `group_by`.
    pub fn group_mean(&self, group_by: &str, group: &str) -> Option<f64> {
        self.params
            .tiers
            .iter()
            .find(|t| t.group_by == group_by)
            .and_then(|t| t.means.get(group).copied())
    }

    /// Overall training mean.
    pub fn overall_mean(&self) -> Option<f64> {
        self.params.overall_mean
    }
}

/// Numeric view of a column with sentinels mapped to `None`.
fn known_values(column: &Column, sentinels: &[f64]) -> Result<Vec<Option<f64>>> {
    if column.kind() != ColumnKind::Numeric {
        return Err(PreprocessingError::TypeMismatch {
            column: column.name().to_string(),
            expected: ColumnKind::Numeric.to_string(),
            got: column.kind().to_string(),
        });
    }
    Ok(column
        .values()
        .iter()
        .map(|v| match v {
            Value::Number(x) if !x.is_nan() && !sentinels.contains(x) => Some(*x),
            _ => None,
        })
        .collect())
}

impl Transformer for GroupMeanImputer {
    type Fitted = FittedGroupMeanImputer;

    fn fit(&self, training: &Table) -> Result<Self::Fitted> {
        let mut values = known_values(training.column(&self.column)?, &self.sentinels)?;

        // Each tier is learned on the training column as filled by the tiers
        // before it, and the overall mean on the column after every tier.
        let mut tiers = Vec::with_capacity(self.group_by.len());
        for group_by in &self.group_by {
            let keys = training.values(group_by)?;
            let mut sums: IndexMap<String, (f64, usize)> = IndexMap::new();
            for (key, value) in keys.iter().zip(&values) {
                if let (Some(key), Some(value)) = (key.label(), value) {
                    let entry = sums.entry(key).or_insert((0.0, 0));
                    entry.0 += value;
                    entry.1 += 1;
                }
            }
            let tier = GroupTier {
                group_by: group_by.clone(),
                means: sums
                    .into_iter()
                    .map(|(key, (sum, count))| (key, sum / count as f64))
                    .collect(),
            };
            tier.fill(&mut values, keys);
            tiers.push(tier);
        }

        let (sum, count) = values
            .iter()
            .flatten()
            .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        let overall_mean = (count > 0).then(|| sum / count as f64);

        debug!(
            column = %self.column,
            tiers = tiers.len(),
            overall_mean = ?overall_mean,
            "fitted group means"
        );

        Ok(FittedGroupMeanImputer {
            params: GroupMeanParams {
                column: self.column.clone(),
                sentinels: self.sentinels.clone(),
                tiers,
                overall_mean,
            },
            fallback: self.fallback,
        })
    }
}

impl FittedTransformer for FittedGroupMeanImputer {
    type Params = GroupMeanParams;

    fn transform(&self, mut table: Table) -> Result<Table> {
        let params = &self.params;
        let mut values = known_values(table.column(&params.column)?, &params.sentinels)?;

        for tier in &params.tiers {
            tier.fill(&mut values, table.values(&tier.group_by)?);
        }

        if let Some(mean) = params.overall_mean {
            values
                .iter_mut()
                .filter(|v| v.is_none())
                .for_each(|v| *v = Some(mean));
        }

        let remaining = values.iter().filter(|v| v.is_none()).count();
        if remaining > 0 {
            match self.fallback {
                FallbackPolicy::LeaveMissing => {
                    warn!(column = %params.column, remaining, "imputation tiers exhausted, values left missing");
                }
                FallbackPolicy::Fail => {
                    return Err(PreprocessingError::MissingValues(format!(
                        "{} values in '{}' could not be imputed",
                        remaining, params.column
                    )));
                }
            }
        }

        table.replace_column(&params.column, Column::numeric(params.column.clone(), values))?;
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
    use crate::table::{Schema, TablePair};

    fn schema() -> Schema {
        Schema::new()
            .with_column("funder", ColumnKind::Categorical)
            .with_column("installer", ColumnKind::Categorical)
            .with_column("construction_year", ColumnKind::Numeric)
    }

    fn row(funder: Option<&str>, installer: Option<&str>, year: f64) -> Vec<Value> {
        vec![funder.into(), installer.into(), year.into()]
    }

    fn years(table: &Table) -> Vec<Option<f64>> {
        table.column("construction_year").unwrap().numbers()
    }

    #[test]
    fn test_funder_group_mean_scenario() {
        let training = Table::from_rows(
            &schema(),
            vec![
                row(Some("F1"), Some("I1"), 1990.0),
                row(Some("F1"), Some("I1"), 0.0),
                row(Some("F1"), Some("I2"), 2000.0),
                row(Some("F2"), Some("I2"), 2010.0),
            ],
        )
        .unwrap();

        let fitted = GroupMeanImputer::construction_year().fit(&training).unwrap();
        assert_eq!(fitted.group_mean("funder", "F1"), Some(1995.0));

        let out = fitted.transform(training).unwrap();
        // Funder mean (1995), not the overall mean (2000).
        assert_eq!(years(&out)[1], Some(1995.0));
    }

    #[test]
    fn test_falls_through_to_installer_then_overall() {
        let training = Table::from_rows(
            &schema(),
            vec![
                row(Some("F1"), Some("I1"), 1.0),
                row(Some("F2"), Some("I1"), 1980.0),
                row(None, Some("I9"), 0.0),
                row(Some("F3"), Some("I3"), 2000.0),
            ],
        )
        .unwrap();

        let out = GroupMeanImputer::construction_year()
            .fit_transform(training)
            .unwrap();
        let ys = years(&out);
        // F1 has no known year, installer I1 does.
        assert_eq!(ys[0], Some(1980.0));
        // No funder, unknown installer -> overall mean of the filled column,
        // which includes the installer fill of row 0.
        assert_eq!(ys[2], Some((1980.0 + 1980.0 + 2000.0) / 3.0));
    }

    #[test]
    fn test_later_tiers_learn_from_earlier_fills() {
        let training = Table::from_rows(
            &schema(),
            vec![
                row(Some("F1"), Some("I2"), 2000.0),
                row(Some("F1"), Some("I1"), 0.0),
                row(Some("F3"), Some("I1"), 1980.0),
                row(Some("F4"), Some("I1"), 0.0),
            ],
        )
        .unwrap();

        let fitted = GroupMeanImputer::construction_year().fit(&training).unwrap();
        // Row 1 takes F1's 2000 before the installer tier is learned.
        assert_eq!(fitted.group_mean("installer", "I1"), Some(1990.0));
        assert_eq!(fitted.overall_mean(), Some((2000.0 + 2000.0 + 1980.0 + 1990.0) / 4.0));

        let out = fitted.transform(training).unwrap();
        assert_eq!(
            years(&out),
            vec![Some(2000.0), Some(2000.0), Some(1980.0), Some(1990.0)]
        );
    }

    #[test]
    fn test_statistics_come_from_training_only() {
        let training = Table::from_rows(
            &schema(),
            vec![
                row(Some("F1"), Some("I1"), 1990.0),
                row(Some("F2"), Some("I2"), 2000.0),
            ],
        )
        .unwrap();
        let evaluation = Table::from_rows(
            &schema(),
            vec![
                row(Some("F1"), Some("I1"), 0.0),
                row(Some("F9"), Some("I9"), 0.0),
                row(Some("F9"), Some("I9"), 3000.0),
            ],
        )
        .unwrap();

        let out = GroupMeanImputer::construction_year()
            .apply(TablePair::new(training, evaluation))
            .unwrap();
        let ys = years(&out.evaluation);
        assert_eq!(ys[0], Some(1990.0));
        // F9 exists only in evaluation: its 3000 must not leak into a group mean.
        assert_eq!(ys[1], Some(1995.0));
        assert_eq!(ys[2], Some(3000.0));
    }

    #[test]
    fn test_exhausted_tiers_leave_missing_by_default() {
        let training = Table::from_rows(
            &schema(),
            vec![row(Some("F1"), Some("I1"), 0.0), row(Some("F2"), None, 1.0)],
        )
        .unwrap();
        let fitted = GroupMeanImputer::construction_year().fit(&training).unwrap();
        assert_eq!(fitted.overall_mean(), None);

        let out = fitted.transform(training).unwrap();
        assert_eq!(years(&out), vec![None, None]);
    }

    #[test]
    fn test_exhausted_tiers_fail_when_requested() {
        let training = Table::from_rows(&schema(), vec![row(Some("F1"), Some("I1"), 0.0)]).unwrap();
        let result = GroupMeanImputer::construction_year()
            .with_fallback(FallbackPolicy::Fail)
            .fit_transform(training);
        assert!(matches!(result, Err(PreprocessingError::MissingValues(_))));
    }

    #[test]
    fn test_requires_numeric_column() {
        let training = Table::from_rows(&schema(), vec![row(Some("F1"), Some("I1"), 1999.0)]).unwrap();
        let result = GroupMeanImputer::new("funder").fit(&training);
        assert!(matches!(result, Err(PreprocessingError::TypeMismatch { .. })));
    }

    #[test]
    fn test_missing_group_column() {
        let training = Table::from_rows(&schema(), vec![row(Some("F1"), Some("I1"), 1999.0)]).unwrap();
        let result = GroupMeanImputer::new("construction_year")
            .with_group_by(["basin"])
            .fit(&training);
        assert!(matches!(result, Err(PreprocessingError::MissingColumn { .. })));
    }
}
