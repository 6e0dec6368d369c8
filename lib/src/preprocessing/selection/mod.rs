//! Label-aware feature selection and diagnostics.
//!
//! - [`DiscriminativeFilter`]: drops indicator columns whose set rows show
//!   the same class mix as the whole training table.
//! - [`impurity_scores`]: Gini impurity of indicator columns, for
//!   inspection only.

mod discriminative;
mod impurity;

pub use discriminative::{ColumnDeviation, DiscriminativeFilter, FilterParams, FittedDiscriminativeFilter};
pub use impurity::{gini, impurity_scores};
