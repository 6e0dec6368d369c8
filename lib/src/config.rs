//! Pipeline configuration.
//!
//! [`PipelineConfig::default`] describes the water-point survey layout. Every
//! field can be overridden from JSON; absent fields keep their defaults.
//!
//! ```
//! use waterpoint_features::config::PipelineConfig;
//!
//! let config = PipelineConfig::from_json_str(r#"{ "amount_buckets": 5, "fallback": "fail" }"#).unwrap();
//! assert_eq!(config.amount_buckets, 5);
//! assert_eq!(config.null_label, "NULL");
//! ```

use crate::preprocessing::error::{PreprocessingError, Result};
use crate::preprocessing::imputation::FallbackPolicy;
use serde::{Deserialize, Serialize};

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Column names and parameters of the standard feature pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Columns removed before any other step.
    pub prune_columns: Vec<String>,
    /// Columns removed after geo imputation (they serve as grouping keys).
    pub deferred_prune_columns: Vec<String>,
    /// Monetary column split into quantile tiers.
    pub amount_column: String,
    /// Number of quantile tiers.
    pub amount_buckets: usize,
    /// Column filled by the construction-year imputer.
    pub construction_year_column: String,
    /// Grouping tiers for construction year, most specific first.
    pub construction_year_groups: Vec<String>,
    /// Date column decomposed into ordinal, year and month.
    pub date_column: String,
    /// Name of the derived year column.
    pub year_column: String,
    /// Name of the derived month column.
    pub month_column: String,
    /// Columns filled by the geo imputer.
    pub geo_columns: Vec<String>,
    /// Grouping tiers for the geo imputer, most specific first.
    pub geo_groups: Vec<String>,
    /// Longitude column of the sentinel rule.
    pub longitude_column: String,
    /// Latitude column of the sentinel rule.
    pub latitude_column: String,
    /// Numeric values treated as missing by the imputers.
    pub missing_sentinels: Vec<f64>,
    /// Flag columns normalized to 0/1.
    pub boolean_columns: Vec<String>,
    /// Integer place codes turned into categories.
    pub code_columns: Vec<String>,
    /// Level used for missing categorical values.
    pub null_label: String,
    /// Behaviour when imputation tiers are exhausted.
    pub fallback: FallbackPolicy,
    /// Minimum class-rate deviation kept by the discriminative filter.
    pub discriminative_margin: f64,
    /// Numeric columns replaced by a discriminant projection (empty: no projection).
    pub projection_columns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            prune_columns: strings(&[
                "id",
                "num_private",
                "wpt_name",
                "scheme_name",
                "region",
                "recorded_by",
                "quantity",
                "quality_group",
                "source_type",
                "payment",
                "waterpoint_type_group",
                "extraction_type_group",
            ]),
            deferred_prune_columns: strings(&["subvillage"]),
            amount_column: "amount_tsh".to_string(),
            amount_buckets: 4,
            construction_year_column: "construction_year".to_string(),
            construction_year_groups: strings(&["funder", "installer"]),
            date_column: "date_recorded".to_string(),
            year_column: "year_recorded".to_string(),
            month_column: "month_recorded".to_string(),
            geo_columns: strings(&["longitude", "latitude", "gps_height", "population"]),
            geo_groups: strings(&["subvillage", "district_code", "basin"]),
            longitude_column: "longitude".to_string(),
            latitude_column: "latitude".to_string(),
            missing_sentinels: vec![0.0, 1.0],
            boolean_columns: strings(&["public_meeting", "permit"]),
            code_columns: strings(&["region_code", "district_code"]),
            null_label: "NULL".to_string(),
            fallback: FallbackPolicy::LeaveMissing,
            discriminative_margin: 0.051,
            projection_columns: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON configuration and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the columns pruned first.
    pub fn with_prune_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.prune_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the number of amount tiers.
    pub fn with_amount_buckets(mut self, buckets: usize) -> Self {
        self.amount_buckets = buckets;
        self
    }

    /// Set the exhausted-fallback policy of both imputers.
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Set the discriminative filter margin.
    pub fn with_discriminative_margin(mut self, margin: f64) -> Self {
        self.discriminative_margin = margin;
        self
    }

    /// Set the columns replaced by the discriminant projection.
    pub fn with_projection_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.projection_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Check parameter ranges and that no column is pruned before a later
    /// step reads it.
    pub fn validate(&self) -> Result<()> {
        if self.amount_buckets == 0 {
            return Err(PreprocessingError::InvalidParameter(
                "amount_buckets must be positive".to_string(),
            ));
        }
        if !(self.discriminative_margin.is_finite() && self.discriminative_margin >= 0.0) {
            return Err(PreprocessingError::InvalidParameter(format!(
                "discriminative_margin must be a non-negative number, got {}",
                self.discriminative_margin
            )));
        }
        if self.null_label.is_empty() {
            return Err(PreprocessingError::InvalidParameter(
                "null_label must not be empty".to_string(),
            ));
        }
        let read_later = std::iter::once(&self.amount_column)
            .chain(std::iter::once(&self.construction_year_column))
            .chain(&self.construction_year_groups)
            .chain(std::iter::once(&self.date_column))
            .chain(&self.geo_columns)
            .chain(&self.geo_groups)
            .chain(&self.boolean_columns)
            .chain(&self.code_columns);
        for column in read_later {
            if self.prune_columns.contains(column) {
                return Err(PreprocessingError::InvalidParameter(format!(
                    "Column '{}' is pruned before a step that reads it",
                    column
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.prune_columns.len(), 12);
        assert!(!config.prune_columns.contains(&"amount_tsh".to_string()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{ "null_label": "unknown", "geo_groups": ["basin"], "fallback": "fail" }"#,
        )
        .unwrap();
        assert_eq!(config.null_label, "unknown");
        assert_eq!(config.geo_groups, vec!["basin"]);
        assert_eq!(config.fallback, FallbackPolicy::Fail);
        assert_eq!(config.amount_column, "amount_tsh");
    }

    #[test]
    fn test_malformed_json() {
        let result = PipelineConfig::from_json_str("{ amount_buckets: }");
        assert!(matches!(result, Err(PreprocessingError::Config(_))));
    }

    #[test]
    fn test_validation_errors() {
        let zero = PipelineConfig::default().with_amount_buckets(0);
        assert!(matches!(zero.validate(), Err(PreprocessingError::InvalidParameter(_))));

        let negative = PipelineConfig::default().with_discriminative_margin(-0.1);
        assert!(negative.validate().is_err());

        let conflict = PipelineConfig::default().with_prune_columns(["id", "basin"]);
        assert!(matches!(conflict.validate(), Err(PreprocessingError::InvalidParameter(_))));
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = PipelineConfig::default().with_projection_columns(["gps_height"]);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(PipelineConfig::from_json_str(&json).unwrap(), config);
    }
}
