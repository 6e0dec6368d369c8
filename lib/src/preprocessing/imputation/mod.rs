//! Imputation transformers for handling missing values.
//!
//! # Available Transformers
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`GroupMeanImputer`] | Fill one column from a chain of training group means, then the overall mean |
//! | [`GeoImputer`] | Coordinate/elevation/population imputation with the longitude sentinel rule |
//!
//! # Example
//!
//! ```ignore
//! use waterpoint_features::preprocessing::imputation::GeoImputer;
//! use waterpoint_features::preprocessing::{PairStep, FallbackPolicy};
//!
//! let imputer = GeoImputer::default().with_fallback(FallbackPolicy::Fail);
//! let pair = imputer.apply(pair)?;
//! ```

pub mod geo;
pub mod group_mean;

pub use geo::{FittedGeoImputer, GeoImputer};
pub use group_mean::{FittedGroupMeanImputer, GroupMeanImputer, GroupMeanParams, GroupTier};

use serde::{Deserialize, Serialize};

/// What to do with values still missing after the last imputation tier.
///
/// This only happens when the training column has no known values at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Keep the values missing and log a warning.
    #[default]
    LeaveMissing,
    /// Fail the step with `MissingValues`.
    Fail,
}
