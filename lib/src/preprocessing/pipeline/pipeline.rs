//! Sequential pipeline over a training/evaluation pair.
//!
//! Each step receives the pair produced by the previous one. The driver
//! stops at the first failing step and reports it by name, and checks after
//! every step that both tables still share one schema.

use crate::config::PipelineConfig;
use crate::preprocessing::decomposition::LinearProjection;
use crate::preprocessing::encoding::{AmountBucketer, CategoricalEncoder, CodeStringifier};
use crate::preprocessing::error::Result;
use crate::preprocessing::imputation::{GeoImputer, GroupMeanImputer};
use crate::preprocessing::selection::DiscriminativeFilter;
use crate::preprocessing::traits::PairStep;
use crate::preprocessing::{BooleanNormalizer, ColumnPruner, DateDecomposer};
use crate::table::{Labels, Table, TablePair};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

struct NamedStep {
    name: String,
    step: Box<dyn PairStep>,
}

/// Ordered list of named pipeline steps.
#[derive(Default)]
pub struct FeaturePipeline {
    steps: Vec<NamedStep>,
}

impl fmt::Debug for FeaturePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeaturePipeline")
            .field("steps", &self.step_names())
            .finish()
    }
}

fn standard_steps(config: &PipelineConfig) -> Vec<NamedStep> {
    fn named(name: &str, step: impl PairStep + 'static) -> NamedStep {
        NamedStep {
            name: name.to_string(),
            step: Box::new(step),
        }
    }

    vec![
        named("column_pruning", ColumnPruner::new(config.prune_columns.iter().cloned())),
        named(
            "amount_bucketing",
            AmountBucketer::new(config.amount_column.as_str()).with_buckets(config.amount_buckets),
        ),
        named(
            "construction_year_imputation",
            GroupMeanImputer::new(config.construction_year_column.as_str())
                .with_group_by(config.construction_year_groups.iter().cloned())
                .with_sentinels(config.missing_sentinels.iter().copied())
                .with_fallback(config.fallback),
        ),
        named(
            "date_decomposition",
            DateDecomposer::new(
                config.date_column.as_str(),
                config.year_column.as_str(),
                config.month_column.as_str(),
            ),
        ),
        named(
            "geo_imputation",
            GeoImputer::new(config.geo_columns.iter().cloned())
                .with_group_by(config.geo_groups.iter().cloned())
                .with_sentinels(config.missing_sentinels.iter().copied())
                .with_coordinates(config.longitude_column.as_str(), config.latitude_column.as_str())
                .with_fallback(config.fallback),
        ),
        named(
            "post_imputation_pruning",
            ColumnPruner::new(config.deferred_prune_columns.iter().cloned()),
        ),
        named(
            "boolean_normalization",
            BooleanNormalizer::new(config.boolean_columns.iter().cloned()),
        ),
        named(
            "code_stringification",
            CodeStringifier::new(config.code_columns.iter().cloned()),
        ),
        named(
            "one_hot_encoding",
            CategoricalEncoder::new()
                .with_code_columns(config.code_columns.iter().cloned())
                .with_null_label(config.null_label.as_str()),
        ),
    ]
}

impl FeaturePipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// The water-point pipeline: pruning, bucketing, imputation, date and
    /// flag normalization, then one-hot encoding.
    ///
    /// # Errors
    /// `InvalidParameter` if `config` fails validation.
    pub fn standard(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            steps: standard_steps(config),
        })
    }

    /// Append the label-aware steps: the discriminative filter, then the
    /// discriminant projection if `config.projection_columns` is non-empty.
    ///
    /// # Errors
    /// `InvalidParameter` if `config` fails validation.
    pub fn with_label_steps(self, config: &PipelineConfig, labels: &Labels) -> Result<Self> {
        config.validate()?;
        let pipeline = self.with_named_step(
            "discriminative_filter",
            DiscriminativeFilter::new(labels.clone()).with_margin(config.discriminative_margin),
        );
        if config.projection_columns.is_empty() {
            return Ok(pipeline);
        }
        Ok(pipeline.with_named_step(
            "linear_projection",
            LinearProjection::new(config.projection_columns.iter().cloned(), labels.clone()),
        ))
    }

    /// Append a step named after its type.
    pub fn with_step<S: PairStep + 'static>(self, step: S) -> Self {
        let name = step.step_name().to_string();
        self.with_named_step(name, step)
    }

    /// Append a step under an explicit name.
    pub fn with_named_step<S: PairStep + 'static>(mut self, name: impl Into<String>, step: S) -> Self {
        self.steps.push(NamedStep {
            name: name.into(),
            step: Box::new(step),
        });
        self
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the pipeline has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Apply every step in order.
    ///
    /// # Errors
    /// `SchemaMismatch` if the input tables differ in schema; otherwise the
    /// first step error, wrapped in `Step` with the step name.
    pub fn run(&self, training: Table, evaluation: Table) -> Result<TablePair> {
        training.check_parity(&evaluation)?;
        debug!(
            steps = self.steps.len(),
            training_rows = training.n_rows(),
            evaluation_rows = evaluation.n_rows(),
            "running feature pipeline"
        );

        let mut pair = TablePair::new(training, evaluation);
        for NamedStep { name, step } in &self.steps {
            let start = Instant::now();
            pair = step.apply(pair).map_err(|e| e.in_step(name))?;
            pair.training
                .check_parity(&pair.evaluation)
                .map_err(|e| e.in_step(name))?;
            info!(
                step = %name,
                columns = pair.training.n_columns(),
                elapsed_us = start.elapsed().as_micros() as u64,
                "applied pipeline step"
            );
        }
        Ok(pair)
    }
}
