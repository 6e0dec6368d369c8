//! Feature transformation steps for the water-point pipeline.
//!
//! Every step follows the same split as the rest of the crate's estimators:
//! an unfitted [`Transformer`] holds the column names and options, `fit`
//! learns statistics from the training table only, and the resulting
//! [`FittedTransformer`] applies them to any table. The pipeline driver sees
//! steps through [`PairStep`].
//!
//! # Available Steps
//!
//! ## Cleaning
//! - [`ColumnPruner`]: drop a fixed list of columns
//! - [`DateDecomposer`]: date -> ordinal, year, month
//! - [`BooleanNormalizer`]: flags -> 0/1, missing -> 0
//!
//! ## Imputation
//! - [`GroupMeanImputer`]: hierarchical group means with an overall fallback
//! - [`GeoImputer`]: coordinates, elevation and population
//!
//! ## Encoding
//! - [`AmountBucketer`]: quantile tiers of `amount_tsh`
//! - [`CodeStringifier`]: integer codes -> categories
//! - [`CategoricalEncoder`]: one-hot over levels shared by both tables
//!
//! ## Label-aware
//! - [`DiscriminativeFilter`]: drop indicators that do not move class rates
//! - [`LinearProjection`]: standardize and project onto discriminant axes
//! - [`impurity_scores`]: Gini impurity per indicator (diagnostic)
//!
//! ## Pipeline
//! - [`FeaturePipeline`]: ordered, named steps with schema checks
//!
//! # Example
//!
//! ```ignore
//! use waterpoint_features::preprocessing::{GroupMeanImputer, PairStep};
//! use waterpoint_features::table::TablePair;
//!
//! let pair = GroupMeanImputer::construction_year().apply(TablePair::new(training, evaluation))?;
//! ```

pub mod booleans;
pub mod dates;
pub mod decomposition;
pub mod encoding;
pub mod error;
pub mod imputation;
pub mod pipeline;
pub mod pruning;
pub mod selection;
pub mod traits;

// Re-export main types
pub use booleans::BooleanNormalizer;
pub use dates::DateDecomposer;
pub use decomposition::{FittedLinearProjection, LinearProjection, ProjectionParams};
pub use encoding::{
    AmountBucketer, BucketParams, CategoricalEncoder, CategoricalEncoderParams, CodeStringifier,
    FittedAmountBucketer, FittedCategoricalEncoder, LevelSet,
};
pub use error::{PreprocessingError, Result};
pub use imputation::{
    FallbackPolicy, FittedGeoImputer, FittedGroupMeanImputer, GeoImputer, GroupMeanImputer,
    GroupMeanParams, GroupTier,
};
pub use pipeline::FeaturePipeline;
pub use pruning::ColumnPruner;
pub use selection::{
    gini, impurity_scores, ColumnDeviation, DiscriminativeFilter, FilterParams,
    FittedDiscriminativeFilter,
};
pub use traits::{FittedTransformer, PairStep, Transformer};
