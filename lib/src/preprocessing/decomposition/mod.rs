//! Supervised projections of numeric feature subsets.
//!
//! [`LinearProjection`] standardizes a group of numeric columns with
//! training statistics, fits a linear discriminant analysis on the training
//! labels and replaces the group with the discriminant components
//! `lda_0..lda_k`.

mod lda;
mod linalg;

pub use lda::{FittedLinearProjection, LinearProjection, ProjectionParams};
