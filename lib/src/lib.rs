//! # waterpoint-features
//!
//! Turns raw water-point survey tables into numeric feature matrices for a
//! pump-status classifier (`functional`, `non functional`,
//! `functional needs repair`), without letting the held-out table leak into
//! any learned statistic.
//!
//! ## Core Design Principles
//!
//! - **Fit on training only**: every statistic (group means, quantile cut
//!   points, class rates, discriminant axes) is learned from the training
//!   table and then applied to both tables.
//! - **Declared column kinds**: a [`Schema`](table::Schema) fixes each
//!   column's kind up front; steps never sniff types from values.
//! - **Owned tables**: steps consume a [`TablePair`](table::TablePair) and
//!   return a new one.
//!
//! ## Quick Start
//!
//! ```rust
//! use waterpoint_features::config::PipelineConfig;
//! use waterpoint_features::preprocessing::FeaturePipeline;
//! use waterpoint_features::table::{Schema, Table};
//!
//! let config = PipelineConfig::default();
//! let pipeline = FeaturePipeline::standard(&config).unwrap();
//! assert_eq!(pipeline.len(), 9);
//!
//! // Rows come from an external loader, laid out as `Schema::water_points()`.
//! let empty = Table::from_rows(&Schema::water_points(), Vec::new()).unwrap();
//! assert_eq!(empty.n_columns(), 40);
//! ```
//!
//! ## Module Structure
//!
//! - `table`: values, schemas, tables, labels and the output matrix
//! - `preprocessing`: transform steps and the pipeline driver
//! - `config`: serde-backed pipeline configuration
//!
//! ## Logging
//!
//! The crate emits `tracing` events (step timings at `info`, fitted
//! statistics at `debug`, exhausted imputation at `warn`) and never installs
//! a subscriber itself.

/// Pipeline configuration.
pub mod config;

/// Feature transformation steps and the pipeline driver.
pub mod preprocessing;

/// In-memory record tables.
pub mod table;

pub use config::PipelineConfig;
pub use preprocessing::{FeaturePipeline, PreprocessingError};
pub use table::{FeatureMatrix, Labels, Schema, Table, TablePair, Value};
