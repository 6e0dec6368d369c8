//! Error types for preprocessing operations.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = PreprocessingError> = std::result::Result<T, E>;

/// Error type for preprocessing operations.
#[derive(Debug, Error)]
pub enum PreprocessingError {
    /// An expected column is absent from a table.
    #[error("Missing column: '{column}'")]
    MissingColumn { column: String },
    /// A column name is already taken.
    #[error("Duplicate column: '{0}'")]
    DuplicateColumn(String),
    /// Training and evaluation tables no longer share a schema.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
    /// Shape mismatch between expected and actual dimensions.
    #[error("Invalid shape: expected {expected}, got {got}")]
    InvalidShape { expected: String, got: String },
    /// A value does not fit the declared or required column kind.
    #[error("Type mismatch in column '{column}': expected {expected}, got {got}")]
    TypeMismatch {
        column: String,
        expected: String,
        got: String,
    },
    /// A value of the right kind that cannot be interpreted (e.g. a bad date).
    #[error("Invalid value in column '{column}': {value}")]
    InvalidValue { column: String, value: String },
    /// Numerical computation error (singular matrix, no convergence, ...).
    #[error("Numerical error: {0}")]
    NumericalError(String),
    /// Data contains missing values when not expected.
    #[error("Missing values: {0}")]
    MissingValues(String),
    /// Invalid hyperparameter value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),
    /// Label count differs from the training row count.
    #[error("Label mismatch: expected {expected} labels, got {got}")]
    LabelMismatch { expected: usize, got: usize },
    /// A pipeline step failed.
    #[error("Step '{step}' failed: {source}")]
    Step {
        step: String,
        #[source]
        source: Box<PreprocessingError>,
    },
    /// Pipeline configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl PreprocessingError {
    pub(crate) fn missing_column(name: &str) -> Self {
        PreprocessingError::MissingColumn {
            column: name.to_string(),
        }
    }

    /// Wrap this error with the name of the step that raised it.
    pub fn in_step(self, step: &str) -> Self {
        PreprocessingError::Step {
            step: step.to_string(),
            source: Box::new(self),
        }
    }

    /// Strip any `Step` wrappers.
    pub fn root_cause(&self) -> &PreprocessingError {
        match self {
            PreprocessingError::Step { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
