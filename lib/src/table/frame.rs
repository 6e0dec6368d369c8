//! Column-oriented record table.

use crate::preprocessing::error::{PreprocessingError, Result};
use crate::table::{ColumnKind, FeatureMatrix, Schema, Value};

/// A named, typed column.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    values: Vec<Value>,
}

impl Column {
    /// Create a column, checking every value against `kind`.
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<Value>) -> Result<Self> {
        let name = name.into();
        if let Some(bad) = values.iter().find(|v| !kind.accepts(v)) {
            return Err(PreprocessingError::TypeMismatch {
                column: name,
                expected: kind.to_string(),
                got: bad.type_name().to_string(),
            });
        }
        Ok(Self { name, kind, values })
    }

    /// Build an indicator column from flags.
    pub(crate) fn indicator(name: impl Into<String>, flags: impl IntoIterator<Item = bool>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Boolean,
            values: flags.into_iter().map(Value::Bool).collect(),
        }
    }

    /// Build a numeric column; `None` entries become missing.
    pub(crate) fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Numeric,
            values: values.into_iter().map(Value::from).collect(),
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared kind.
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Cell values in row order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric view of the column; non-numeric and missing cells are `None`.
    pub fn numbers(&self) -> Vec<Option<f64>> {
        self.values.iter().map(Value::as_f64).collect()
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }
}

/// Ordered collection of equally long columns.
///
/// Both the training and the evaluation table of a run are `Table`s; the
/// pipeline moves them through its steps by value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table from rows laid out in `schema` order.
    ///
    /// # Errors
    /// `InvalidShape` if a row has the wrong width, `TypeMismatch` if a value
    /// does not fit its declared kind.
    pub fn from_rows(schema: &Schema, rows: Vec<Vec<Value>>) -> Result<Self> {
        let width = schema.len();
        let mut buffers: Vec<Vec<Value>> = (0..width).map(|_| Vec::with_capacity(rows.len())).collect();
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(PreprocessingError::InvalidShape {
                    expected: format!("{} values", width),
                    got: format!("{} values in row {}", row.len(), i),
                });
            }
            for (buffer, value) in buffers.iter_mut().zip(row) {
                buffer.push(value);
            }
        }
        let columns = schema
            .iter()
            .zip(buffers)
            .map(|((name, kind), values)| Column::new(name, kind, values))
            .collect::<Result<Vec<_>>>()?;
        Self::from_columns(columns)
    }

    /// Build a table from columns.
    ///
    /// # Errors
    /// `InvalidShape` on unequal lengths, `DuplicateColumn` on repeated names.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut table = Table {
            columns: Vec::with_capacity(columns.len()),
            n_rows: columns.first().map_or(0, Column::len),
        };
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Current schema (names and kinds in order).
    pub fn schema(&self) -> Schema {
        self.columns
            .iter()
            .fold(Schema::new(), |schema, c| schema.with_column(c.name.clone(), c.kind))
    }

    /// Whether a column named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.position(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| PreprocessingError::missing_column(name))
    }

    /// Values of a column by name.
    pub fn values(&self, name: &str) -> Result<&[Value]> {
        self.column(name).map(Column::values)
    }

    /// Fail with `MissingColumn` for the first absent name.
    pub fn require<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        match names.iter().find(|n| !self.contains(n.as_ref())) {
            Some(name) => Err(PreprocessingError::missing_column(name.as_ref())),
            None => Ok(()),
        }
    }

    /// Append a column at the end.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.contains(&column.name) {
            return Err(PreprocessingError::DuplicateColumn(column.name));
        }
        if self.columns.is_empty() {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("{} rows", self.n_rows),
                got: format!("{} rows in column '{}'", column.len(), column.name),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Replace the column named `name` in place, keeping its position.
    ///
    /// The replacement may carry a different name and kind.
    pub fn replace_column(&mut self, name: &str, column: Column) -> Result<()> {
        let idx = self
            .position(name)
            .ok_or_else(|| PreprocessingError::missing_column(name))?;
        if column.len() != self.n_rows {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("{} rows", self.n_rows),
                got: format!("{} rows in column '{}'", column.len(), column.name),
            });
        }
        if column.name != name && self.contains(&column.name) {
            return Err(PreprocessingError::DuplicateColumn(column.name));
        }
        self.columns[idx] = column;
        Ok(())
    }

    /// Remove and return a column.
    pub fn drop_column(&mut self, name: &str) -> Result<Column> {
        let idx = self
            .position(name)
            .ok_or_else(|| PreprocessingError::missing_column(name))?;
        Ok(self.columns.remove(idx))
    }

    /// Remove several columns; nothing is removed unless all exist.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        self.require(names)?;
        self.columns
            .retain(|c| !names.iter().any(|n| n.as_ref() == c.name));
        Ok(())
    }

    /// Names of all columns declared with `kind`.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Check that `other` has the same column names, order and kinds.
    pub fn check_parity(&self, other: &Table) -> Result<()> {
        let ours = self.columns.iter().map(|c| (c.name.as_str(), c.kind));
        let theirs = other.columns.iter().map(|c| (c.name.as_str(), c.kind));
        if ours.eq(theirs) {
            return Ok(());
        }
        let first_diff = self
            .columns
            .iter()
            .zip(&other.columns)
            .find(|(a, b)| a.name != b.name || a.kind != b.kind)
            .map(|(a, b)| format!("'{}' ({}) vs '{}' ({})", a.name, a.kind, b.name, b.kind))
            .unwrap_or_else(|| format!("{} vs {} columns", self.n_columns(), other.n_columns()));
        Err(PreprocessingError::SchemaMismatch(first_diff))
    }

    /// Convert to a dense matrix for model training.
    ///
    /// # Errors
    /// `TypeMismatch` if a text or date value is still present.
    pub fn to_matrix(&self) -> Result<FeatureMatrix> {
        let (rows, cols) = (self.n_rows, self.columns.len());
        let mut data = vec![f64::NAN; rows * cols];
        for (j, column) in self.columns.iter().enumerate() {
            for (i, value) in column.values.iter().enumerate() {
                data[i * cols + j] = match value {
                    v if v.is_missing() => f64::NAN,
                    Value::Number(x) => *x,
                    Value::Bool(b) => f64::from(u8::from(*b)),
                    other => {
                        return Err(PreprocessingError::TypeMismatch {
                            column: column.name.clone(),
                            expected: "number or bool".to_string(),
                            got: other.type_name().to_string(),
                        })
                    }
                };
            }
        }
        let names = self.columns.iter().map(|c| c.name.clone()).collect();
        FeatureMatrix::new(names, data, rows, cols)
    }
}
