//! Geo and population imputation.
//!
//! Survey rows with an unknown GPS fix carry longitude `0`; their latitude is
//! meaningless and is forced to `0` before anything else runs, so it is then
//! treated as missing like every other `0`/`1` sentinel. Each of longitude,
//! latitude, elevation (`gps_height`) and population is then filled by
//! training group means for subvillage, district code and basin, falling back
//! to the overall training mean.

use crate::preprocessing::error::Result;
use crate::preprocessing::imputation::{
    FallbackPolicy, FittedGroupMeanImputer, GroupMeanImputer, GroupMeanParams,
};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::{Column, Table, Value};

/// Geo/population imputer (unfitted).
#[derive(Clone, Debug)]
pub struct GeoImputer {
    columns: Vec<String>,
    group_by: Vec<String>,
    sentinels: Vec<f64>,
    longitude: String,
    latitude: String,
    fallback: FallbackPolicy,
}

impl Default for GeoImputer {
    fn default() -> Self {
        Self::new(["longitude", "latitude", "gps_height", "population"])
    }
}

impl GeoImputer {
    /// Impute the given columns with the water-point grouping tiers.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            group_by: vec![
                "subvillage".to_string(),
                "district_code".to_string(),
                "basin".to_string(),
            ],
            sentinels: vec![0.0, 1.0],
            longitude: "longitude".to_string(),
            latitude: "latitude".to_string(),
            fallback: FallbackPolicy::default(),
        }
    }

    /// Set the grouping tiers, most specific first.
    pub fn with_group_by<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the values treated as missing.
    pub fn with_sentinels(mut self, sentinels: impl IntoIterator<Item = f64>) -> Self {
        self.sentinels = sentinels.into_iter().collect();
        self
    }

    /// Set the coordinate columns used by the longitude sentinel rule.
    pub fn with_coordinates(mut self, longitude: impl Into<String>, latitude: impl Into<String>) -> Self {
        self.longitude = longitude.into();
        self.latitude = latitude.into();
        self
    }

    /// Set what happens when every tier is exhausted.
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }
}

/// Set latitude to `0` on every row whose longitude is `0`.
fn zero_latitude_without_longitude(mut table: Table, longitude: &str, latitude: &str) -> Result<Table> {
    let lat = table.column(latitude)?;
    let values = lat
        .values()
        .iter()
        .zip(table.values(longitude)?)
        .map(|(lat, lon)| match lon {
            Value::Number(x) if *x == 0.0 => Value::Number(0.0),
            _ => lat.clone(),
        })
        .collect();
    let replaced = Column::new(latitude, lat.kind(), values)?;
    table.replace_column(latitude, replaced)?;
    Ok(table)
}

/// Fitted geo/population imputer.
#[derive(Clone, Debug)]
pub struct FittedGeoImputer {
    longitude: String,
    latitude: String,
    imputers: Vec<FittedGroupMeanImputer>,
}

impl FittedGeoImputer {
    /// Fitted imputer for one column.
    pub fn imputer(&self, column: &str) -> Option<&FittedGroupMeanImputer> {
        self.imputers
            .iter()
            .find(|i| i.extract_params().column == column)
    }
}

impl Transformer for GeoImputer {
    type Fitted = FittedGeoImputer;

    fn fit(&self, training: &Table) -> Result<Self::Fitted> {
        let prepared =
            zero_latitude_without_longitude(training.clone(), &self.longitude, &self.latitude)?;
        let imputers = self
            .columns
            .iter()
            .map(|column| {
                GroupMeanImputer::new(column.as_str())
                    .with_group_by(self.group_by.iter().cloned())
                    .with_sentinels(self.sentinels.iter().copied())
                    .with_fallback(self.fallback)
                    .fit(&prepared)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(FittedGeoImputer {
            longitude: self.longitude.clone(),
            latitude: self.latitude.clone(),
            imputers,
        })
    }
}

impl FittedTransformer for FittedGeoImputer {
    type Params = Vec<GroupMeanParams>;

    fn transform(&self, table: Table) -> Result<Table> {
        let table = zero_latitude_without_longitude(table, &self.longitude, &self.latitude)?;
        self.imputers
            .iter()
            .try_fold(table, |table, imputer| imputer.transform(table))
    }

    fn extract_params(&self) -> Self::Params {
        self.imputers.iter().map(|i| i.extract_params()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::error::PreprocessingError;
    use crate::preprocessing::traits::PairStep;
    use crate::table::{ColumnKind, Schema, TablePair};

    fn schema() -> Schema {
        Schema::new()
            .with_column("longitude", ColumnKind::Numeric)
            .with_column("latitude", ColumnKind::Numeric)
            .with_column("gps_height", ColumnKind::Numeric)
            .with_column("population", ColumnKind::Numeric)
            .with_column("subvillage", ColumnKind::Categorical)
            .with_column("district_code", ColumnKind::Numeric)
            .with_column("basin", ColumnKind::Categorical)
    }

    fn row(lon: f64, lat: f64, height: f64, pop: f64, sub: &str, district: f64, basin: &str) -> Vec<Value> {
        vec![
            lon.into(),
            lat.into(),
            height.into(),
            pop.into(),
            sub.into(),
            district.into(),
            basin.into(),
        ]
    }

    fn col(table: &Table, name: &str) -> Vec<Option<f64>> {
        table.column(name).unwrap().numbers()
    }

    #[test]
    fn test_longitude_sentinel_forces_latitude_before_imputation() {
        let training = Table::from_rows(
            &schema(),
            vec![
                row(34.0, -5.0, 1200.0, 100.0, "S1", 1.0, "Pangani"),
                row(36.0, -7.0, 1400.0, 300.0, "S2", 2.0, "Pangani"),
                row(0.0, -99.0, 0.0, 0.0, "S1", 1.0, "Pangani"),
            ],
        )
        .unwrap();

        let out = GeoImputer::default().fit_transform(training).unwrap();
        // Latitude -99 is discarded and imputed from subvillage S1, never kept.
        assert_eq!(col(&out, "latitude")[2], Some(-5.0));
        assert_eq!(col(&out, "longitude")[2], Some(34.0));
        assert_eq!(col(&out, "gps_height")[2], Some(1200.0));
        assert_eq!(col(&out, "population")[2], Some(100.0));
    }

    #[test]
    fn test_forced_latitude_excluded_from_training_means() {
        let training = Table::from_rows(
            &schema(),
            vec![
                row(34.0, -4.0, 10.0, 10.0, "S1", 1.0, "B"),
                row(0.0, -50.0, 10.0, 10.0, "S1", 1.0, "B"),
            ],
        )
        .unwrap();
        let fitted = GeoImputer::default().fit(&training).unwrap();
        let lat = fitted.imputer("latitude").unwrap();
        assert_eq!(lat.group_mean("subvillage", "S1"), Some(-4.0));
        assert_eq!(lat.overall_mean(), Some(-4.0));
    }

    #[test]
    fn test_tier_priority() {
        let training = Table::from_rows(
            &schema(),
            vec![
                row(30.0, -1.0, 100.0, 10.0, "S1", 1.0, "B1"),
                row(32.0, -3.0, 300.0, 30.0, "S2", 1.0, "B1"),
                row(38.0, -9.0, 900.0, 90.0, "S3", 2.0, "B2"),
            ],
        )
        .unwrap();
        let evaluation = Table::from_rows(
            &schema(),
            vec![
                // Known subvillage.
                row(0.0, 0.0, 1.0, 0.0, "S3", 1.0, "B1"),
                // Unknown subvillage, known district.
                row(0.0, 0.0, 0.0, 1.0, "S9", 1.0, "B2"),
                // Unknown subvillage and district, known basin.
                row(0.0, 0.0, 0.0, 0.0, "S9", 7.0, "B2"),
                // Nothing known.
                row(0.0, 0.0, 0.0, 0.0, "S9", 7.0, "B9"),
            ],
        )
        .unwrap();

        let out = GeoImputer::default()
            .apply(TablePair::new(training, evaluation))
            .unwrap();
        let heights = col(&out.evaluation, "gps_height");
        assert_eq!(heights[0], Some(900.0));
        assert_eq!(heights[1], Some(200.0));
        assert_eq!(heights[2], Some(900.0));
        assert_eq!(heights[3], Some(1300.0 / 3.0));
    }

    #[test]
    fn test_requires_group_columns() {
        let schema = Schema::new()
            .with_column("longitude", ColumnKind::Numeric)
            .with_column("latitude", ColumnKind::Numeric);
        let training = Table::from_rows(&schema, vec![vec![1.0.into(), 2.0.into()]]).unwrap();
        let result = GeoImputer::new(["longitude"]).fit(&training);
        assert!(matches!(result, Err(PreprocessingError::MissingColumn { .. })));
    }
}
