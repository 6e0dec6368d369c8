//! Core traits for preprocessing steps.
//!
//! This module defines three traits:
//! - [`Transformer`]: holds hyperparameters and learns statistics from the
//!   training table.
//! - [`FittedTransformer`]: holds the learned statistics and applies them to
//!   any table.
//! - [`PairStep`]: the interface the pipeline driver sees, mapping a
//!   `(training, evaluation)` pair to a new pair.
//!
//! Every [`Transformer`] is a [`PairStep`] through a blanket impl that fits on
//! the training table only and then transforms both tables with the same
//! fitted statistics. Evaluation rows can therefore never influence a
//! statistic.

use crate::preprocessing::error::Result;
use crate::table::{Table, TablePair};
use serde::Serialize;
use std::any::type_name;

/// Trait for unfitted transformers with hyperparameters.
///
/// # Example
/// ```ignore
/// use waterpoint_features::preprocessing::{Transformer, FittedTransformer, GroupMeanImputer};
///
/// let imputer = GroupMeanImputer::construction_year();
/// let fitted = imputer.fit(&training)?;
/// let training = fitted.transform(training)?;
/// let evaluation = fitted.transform(evaluation)?;
/// ```
pub trait Transformer {
    /// The fitted transformer type.
    type Fitted: FittedTransformer;

    /// Learn statistics from the training table.
    ///
    /// # Errors
    /// Returns [`PreprocessingError`](crate::preprocessing::PreprocessingError) if:
    /// - a required column is absent
    /// - a column holds values of the wrong kind
    /// - there is no data to learn from
    fn fit(&self, training: &Table) -> Result<Self::Fitted>;

    /// Fit on `training` and transform it in one step.
    fn fit_transform(&self, training: Table) -> Result<Table> {
        let fitted = self.fit(&training)?;
        fitted.transform(training)
    }
}

/// Trait for fitted transformers.
pub trait FittedTransformer {
    /// Serializable view of the learned statistics.
    type Params: Serialize;

    /// Apply the learned statistics to a table.
    fn transform(&self, table: Table) -> Result<Table>;

    /// Learned statistics, for inspection and reporting.
    fn extract_params(&self) -> Self::Params;
}

/// A step of the feature pipeline.
///
/// Implemented automatically for every [`Transformer`]; steps whose output
/// depends on both tables (such as the one-hot encoder's level set)
/// implement it directly.
pub trait PairStep {
    /// Apply the step to both tables.
    fn apply(&self, pair: TablePair) -> Result<TablePair>;

    /// Name used in logs and error messages.
    fn step_name(&self) -> &'static str;
}

impl<T: Transformer> PairStep for T {
    fn apply(&self, pair: TablePair) -> Result<TablePair> {
        let (training, evaluation) = pair.into_parts();
        let fitted = self.fit(&training)?;
        Ok(TablePair::new(
            fitted.transform(training)?,
            fitted.transform(evaluation)?,
        ))
    }

    fn step_name(&self) -> &'static str {
        short_type_name::<T>()
    }
}

/// Last path segment of a type name, without generics.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full_name = type_name::<T>();
    let before_generic = match full_name.find('<') {
        Some(pos) => &full_name[..pos],
        None => full_name,
    };
    match before_generic.rfind("::") {
        Some(pos) => &before_generic[pos + 2..],
        None => before_generic,
    }
}
