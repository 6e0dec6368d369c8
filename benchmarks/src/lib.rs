//! Benchmark utilities for waterpoint-features.
//!
//! - Synthetic water-point survey tables with plausible sentinels and gaps
//! - Timing helpers

pub mod synthetic;
pub mod utils;

pub use synthetic::{SurveyGenerator, SyntheticSurvey};
pub use utils::{benchmark_with_warmup, time_fn, BenchmarkStats};
