//! The feature pipeline driver.
//!
//! # Available Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`FeaturePipeline`] | Ordered named steps applied to a training/evaluation pair |
//!
//! # Example
//!
//! ```ignore
//! use waterpoint_features::config::PipelineConfig;
//! use waterpoint_features::preprocessing::pipeline::FeaturePipeline;
//!
//! let pipeline = FeaturePipeline::standard(&PipelineConfig::default())?;
//! let pair = pipeline.run(training, evaluation)?;
//! let (x_train, x_eval) = pair.to_matrices()?;
//! ```

#[allow(clippy::module_inception)]
pub mod pipeline;

pub use pipeline::FeaturePipeline;
