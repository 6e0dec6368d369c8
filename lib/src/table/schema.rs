//! Declared column types.
//!
//! Every column of a [`Table`](crate::table::Table) carries a [`ColumnKind`]
//! taken from an explicit [`Schema`] when the table is built. Steps never
//! inspect runtime values to decide whether a column is categorical.

use crate::table::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Measurements and integer codes.
    Numeric,
    /// String labels, one-hot encoded at the end of the pipeline.
    Categorical,
    /// True/false flags and indicator columns.
    Boolean,
    /// Calendar dates (ISO text or parsed dates).
    Date,
}

impl ColumnKind {
    /// Whether a value may be stored in a column of this kind.
    ///
    /// Missing values are accepted by every kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, v) if v.is_missing() => true,
            (ColumnKind::Numeric, Value::Number(_)) => true,
            (ColumnKind::Categorical, Value::Text(_)) => true,
            (ColumnKind::Boolean, Value::Bool(_)) => true,
            (ColumnKind::Boolean, Value::Number(x)) => *x == 0.0 || *x == 1.0,
            (ColumnKind::Date, Value::Date(_) | Value::Text(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Date => "date",
        };
        f.write_str(name)
    }
}

/// Ordered mapping from column name to [`ColumnKind`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: IndexMap<String, ColumnKind>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column declaration.
    pub fn with_column(mut self, name: impl Into<String>, kind: ColumnKind) -> Self {
        self.columns.insert(name.into(), kind);
        self
    }

    /// Declared kind of `name`, if present.
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns.get(name).copied()
    }

    /// Number of declared columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema declares no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnKind)> {
        self.columns.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    /// The 40-column raw water-point survey schema.
    ///
    /// `region_code` and `district_code` arrive as integer codes and are
    /// declared numeric; the code stringification step turns them into
    /// categorical labels.
    pub fn water_points() -> Self {
        use ColumnKind::*;
        const COLUMNS: [(&str, ColumnKind); 40] = [
            ("id", Numeric),
            ("amount_tsh", Numeric),
            ("date_recorded", Date),
            ("funder", Categorical),
            ("gps_height", Numeric),
            ("installer", Categorical),
            ("longitude", Numeric),
            ("latitude", Numeric),
            ("wpt_name", Categorical),
            ("num_private", Numeric),
            ("basin", Categorical),
            ("subvillage", Categorical),
            ("region", Categorical),
            ("region_code", Numeric),
            ("district_code", Numeric),
            ("lga", Categorical),
            ("ward", Categorical),
            ("population", Numeric),
            ("public_meeting", Boolean),
            ("recorded_by", Categorical),
            ("scheme_management", Categorical),
            ("scheme_name", Categorical),
            ("permit", Boolean),
            ("construction_year", Numeric),
            ("extraction_type", Categorical),
            ("extraction_type_group", Categorical),
            ("extraction_type_class", Categorical),
            ("management", Categorical),
            ("management_group", Categorical),
            ("payment", Categorical),
            ("payment_type", Categorical),
            ("water_quality", Categorical),
            ("quality_group", Categorical),
            ("quantity", Categorical),
            ("quantity_group", Categorical),
            ("source", Categorical),
            ("source_type", Categorical),
            ("source_class", Categorical),
            ("waterpoint_type", Categorical),
            ("waterpoint_type_group", Categorical),
        ];
        COLUMNS
            .iter()
            .fold(Schema::new(), |schema, (name, kind)| schema.with_column(*name, *kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_point_schema() {
        let schema = Schema::water_points();
        assert_eq!(schema.len(), 40);
        assert_eq!(schema.kind_of("date_recorded"), Some(ColumnKind::Date));
        assert_eq!(schema.kind_of("permit"), Some(ColumnKind::Boolean));
        assert_eq!(schema.kind_of("region_code"), Some(ColumnKind::Numeric));
        assert_eq!(schema.kind_of("nope"), None);
        assert_eq!(schema.iter().next().map(|(n, _)| n), Some("id"));
    }

    #[test]
    fn test_kind_accepts() {
        assert!(ColumnKind::Numeric.accepts(&Value::Number(3.0)));
        assert!(ColumnKind::Numeric.accepts(&Value::Missing));
        assert!(!ColumnKind::Numeric.accepts(&Value::from("3")));
        assert!(ColumnKind::Boolean.accepts(&Value::Number(1.0)));
        assert!(!ColumnKind::Boolean.accepts(&Value::Number(2.0)));
        assert!(ColumnKind::Date.accepts(&Value::from("2011-03-14")));
    }
}
