//! Encoders that turn raw columns into indicator features.
//!
//! # Available Encoders
//!
//! ## AmountBucketer
//! Quantile tiers of a monetary column, one-hot encoded.
//!
//! ```ignore
//! // amount_tsh: [0, 10, 20, 30, 40]
//! // -> amount_tsh_q1..amount_tsh_q4, amount_tsh_null
//! ```
//!
//! ## CodeStringifier
//! Integer place codes become categorical labels.
//!
//! ## CategoricalEncoder
//! One indicator per level shared by the training and evaluation tables.

mod bucket;
mod codes;
mod one_hot;

pub use bucket::{AmountBucketer, BucketParams, FittedAmountBucketer};
pub use codes::CodeStringifier;
pub use one_hot::{CategoricalEncoder, CategoricalEncoderParams, FittedCategoricalEncoder, LevelSet};
