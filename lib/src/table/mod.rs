//! In-memory record tables.
//!
//! The pipeline works on a pair of [`Table`]s (training and evaluation)
//! built from raw survey rows by an external loader.
//!
//! # Core Concepts
//!
//! - **Value**: a cell: number, category label, boolean, date or missing.
//! - **Schema**: the declared [`ColumnKind`] of every column. Kinds are fixed
//!   when a table is built and only change when a step says so.
//! - **Table**: ordered named columns of equal length.
//! - **Labels**: training targets, passed explicitly to label-aware steps.
//! - **FeatureMatrix**: the dense `f64` output handed to a model trainer.
//!
//! # Example
//!
//! ```rust
//! use waterpoint_features::table::{ColumnKind, Schema, Table, Value};
//!
//! let schema = Schema::new()
//!     .with_column("population", ColumnKind::Numeric)
//!     .with_column("basin", ColumnKind::Categorical);
//! let table = Table::from_rows(
//!     &schema,
//!     vec![
//!         vec![Value::from(120.0), Value::from("Pangani")],
//!         vec![Value::Missing, Value::from("Rufiji")],
//!     ],
//! )
//! .unwrap();
//! assert_eq!(table.n_rows(), 2);
//! ```

mod frame;
mod labels;
mod matrix;
mod schema;
mod value;

pub use frame::{Column, Table};
pub use labels::Labels;
pub use matrix::FeatureMatrix;
pub use schema::{ColumnKind, Schema};
pub use value::Value;

pub(crate) use value::format_number;

use crate::preprocessing::error::Result;

/// Training and evaluation tables threaded through the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct TablePair {
    /// Table that statistics are fitted on.
    pub training: Table,
    /// Held-out table that fitted statistics are applied to.
    pub evaluation: Table,
}

impl TablePair {
    /// Pair up two tables.
    pub fn new(training: Table, evaluation: Table) -> Self {
        Self {
            training,
            evaluation,
        }
    }

    /// Split back into `(training, evaluation)`.
    pub fn into_parts(self) -> (Table, Table) {
        (self.training, self.evaluation)
    }

    /// Dense matrices of both tables, for the model trainer.
    pub fn to_matrices(&self) -> Result<(FeatureMatrix, FeatureMatrix)> {
        Ok((self.training.to_matrix()?, self.evaluation.to_matrix()?))
    }
}
