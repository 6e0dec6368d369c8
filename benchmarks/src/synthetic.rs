//! Deterministic synthetic water-point surveys.
//!
//! Rows follow [`Schema::water_points`] and mimic the raw survey's quirks:
//! `0` sentinels in amounts, coordinates, elevation, population and
//! construction year, missing flags and labels, and high-cardinality place
//! names. The status label depends on a few columns plus noise, so
//! label-aware steps have something to find.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use waterpoint_features::table::{ColumnKind, Labels, Schema, Table, Value};
use waterpoint_features::PreprocessingError;

const BASINS: [&str; 9] = [
    "Lake Nyasa",
    "Lake Victoria",
    "Pangani",
    "Ruvuma / Southern Coast",
    "Internal",
    "Lake Tanganyika",
    "Wami / Ruvu",
    "Rufiji",
    "Lake Rukwa",
];
const QUANTITIES: [&str; 5] = ["enough", "insufficient", "dry", "seasonal", "unknown"];
const EXTRACTION: [&str; 6] = ["gravity", "submersible", "swn 80", "nira/tanira", "india mark ii", "other"];
const STATUS: [&str; 3] = ["functional", "non functional", "functional needs repair"];

/// A generated training/evaluation split with training labels.
#[derive(Clone, Debug)]
pub struct SyntheticSurvey {
    /// Training rows.
    pub training: Table,
    /// Held-out rows.
    pub evaluation: Table,
    /// Status label per training row.
    pub labels: Labels,
}

/// Seeded generator of raw survey rows.
#[derive(Debug)]
pub struct SurveyGenerator {
    rng: StdRng,
    schema: Schema,
}

impl SurveyGenerator {
    /// Create a generator; equal seeds give equal tables.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            schema: Schema::water_points(),
        }
    }

    /// Generate `n_training` labelled rows and `n_evaluation` unlabelled rows.
    pub fn survey(
        &mut self,
        n_training: usize,
        n_evaluation: usize,
    ) -> Result<SyntheticSurvey, PreprocessingError> {
        let (training, labels) = self.table(0, n_training)?;
        let (evaluation, _) = self.table(n_training, n_evaluation)?;
        Ok(SyntheticSurvey {
            training,
            evaluation,
            labels: Labels::new(labels)?,
        })
    }

    fn table(
        &mut self,
        first_id: usize,
        n_rows: usize,
    ) -> Result<(Table, Vec<&'static str>), PreprocessingError> {
        let mut rows = Vec::with_capacity(n_rows);
        let mut labels = Vec::with_capacity(n_rows);
        for i in 0..n_rows {
            let (row, label) = self.row(first_id + i);
            rows.push(row);
            labels.push(label);
        }
        Ok((Table::from_rows(&self.schema, rows)?, labels))
    }

    fn maybe_zero(&mut self, share: f64, value: f64) -> Value {
        if self.rng.gen_bool(share) {
            Value::from(0.0)
        } else {
            Value::from(value)
        }
    }

    fn row(&mut self, id: usize) -> (Vec<Value>, &'static str) {
        let region = self.rng.gen_range(1..=21u32);
        let district = self.rng.gen_range(1..=8u32);
        let basin = *BASINS.choose(&mut self.rng).unwrap_or(&BASINS[0]);
        let quantity = *QUANTITIES.choose(&mut self.rng).unwrap_or(&QUANTITIES[0]);
        let extraction = *EXTRACTION.choose(&mut self.rng).unwrap_or(&EXTRACTION[0]);
        let year = self.rng.gen_range(1960.0..2013.0f64).round();
        let no_fix = self.rng.gen_bool(0.03);

        let columns: Vec<(String, ColumnKind)> = self
            .schema
            .iter()
            .map(|(name, kind)| (name.to_string(), kind))
            .collect();
        let mut row = Vec::with_capacity(columns.len());
        for (name, kind) in columns {
            let value = match name.as_str() {
                "id" => Value::from(id as f64),
                "amount_tsh" => {
                    let amount = 10f64.powf(self.rng.gen_range(0.0..4.5));
                    self.maybe_zero(0.7, amount.round())
                }
                "date_recorded" => Value::from(format!(
                    "{}-{:02}-{:02}",
                    self.rng.gen_range(2011..=2013),
                    self.rng.gen_range(1..=12),
                    self.rng.gen_range(1..=28)
                )),
                "longitude" if no_fix => Value::from(0.0),
                "longitude" => Value::from(self.rng.gen_range(29.5..40.5f64)),
                "latitude" => Value::from(self.rng.gen_range(-11.5..-1.0f64)),
                "gps_height" => {
                    let height = self.rng.gen_range(-50.0..2700.0f64).round();
                    self.maybe_zero(0.3, height)
                }
                "population" => {
                    let population = self.rng.gen_range(1.0..2000.0f64).round();
                    self.maybe_zero(0.35, population)
                }
                "construction_year" => self.maybe_zero(0.35, year),
                "region_code" => Value::from(f64::from(region)),
                "district_code" => Value::from(f64::from(district)),
                "num_private" => Value::from(0.0),
                "basin" => Value::from(basin),
                "quantity" | "quantity_group" => Value::from(quantity),
                "extraction_type" | "extraction_type_group" => Value::from(extraction),
                "region" => Value::from(format!("region_{}", region)),
                "subvillage" => Value::from(format!("sv_{}", self.rng.gen_range(0..400))),
                "wpt_name" => Value::from(format!("wpt_{}", id)),
                "recorded_by" => Value::from("GeoData Consultants Ltd"),
                "funder" | "installer" | "scheme_name" if self.rng.gen_bool(0.06) => Value::Missing,
                "funder" | "installer" => {
                    Value::from(format!("{}_{}", name, self.rng.gen_range(0..25)))
                }
                "ward" | "lga" => Value::from(format!("{}_{}", name, self.rng.gen_range(0..60))),
                _ => match kind {
                    ColumnKind::Boolean if self.rng.gen_bool(0.05) => Value::Missing,
                    ColumnKind::Boolean => Value::from(self.rng.gen_bool(0.85)),
                    ColumnKind::Categorical => {
                        Value::from(format!("{}_{}", name, self.rng.gen_range(0..6)))
                    }
                    ColumnKind::Numeric => Value::from(self.rng.gen_range(0.0..100.0f64).round()),
                    ColumnKind::Date => Value::Missing,
                },
            };
            row.push(value);
        }

        let weights = if quantity == "dry" {
            [0.05, 0.9, 0.05]
        } else if extraction == "other" || year < 1980.0 {
            [0.35, 0.5, 0.15]
        } else {
            [0.55, 0.38, 0.07]
        };
        let draw: f64 = self.rng.gen();
        let label = if draw < weights[0] {
            STATUS[0]
        } else if draw < weights[0] + weights[1] {
            STATUS[1]
        } else {
            STATUS[2]
        };
        (row, label)
    }
}
