//! Linear discriminant projection.
//!
//! Fitting, on the training table only:
//!
//! ```text
//! z   = (x - mean) / std                      population std, 0 -> 1
//! Sw  = sum_k sum_{i in k} (z_i - mu_k)(z_i - mu_k)^T / (n - K)
//! Sb  = sum_k prior_k (mu_k - mu)(mu_k - mu)^T
//! Sb v = lambda Sw v                          via Sw + ridge*I = L L^T
//! ```
//!
//! The generalized problem becomes the symmetric `L^-1 Sb L^-T w = lambda w`
//! and `v = L^-T w`, so every component has unit within-class variance.
//! `min(K - 1, p)` components are kept in decreasing eigenvalue order; each
//! is flipped so its largest-magnitude loading is positive.

use super::linalg::{cholesky, solve_lower, solve_lower_transposed, symmetric_eigen, transpose};
use crate::preprocessing::error::{PreprocessingError, Result};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::{Column, ColumnKind, Labels, Table};
use serde::Serialize;
use tracing::debug;

/// Standardize-then-LDA projection of a numeric column subset.
#[derive(Clone, Debug)]
pub struct LinearProjection {
    columns: Vec<String>,
    labels: Labels,
    prefix: String,
    ridge: f64,
}

impl LinearProjection {
    /// Project `columns` using the training `labels`.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>, labels: Labels) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            labels,
            prefix: "lda".to_string(),
            ridge: 1e-6,
        }
    }

    /// Set the output column prefix (`<prefix>_0`, `<prefix>_1`, ...).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the ridge added to the within-class scatter diagonal.
    ///
    /// # Panics
    /// Panics if `ridge` is negative or not finite.
    pub fn with_ridge(mut self, ridge: f64) -> Self {
        assert!(ridge.is_finite() && ridge >= 0.0, "Ridge must be a non-negative number");
        self.ridge = ridge;
        self
    }
}

/// Serializable parameters of a fitted [`LinearProjection`].
#[derive(Clone, Debug, Serialize)]
pub struct ProjectionParams {
    /// Input columns, in loading order.
    pub columns: Vec<String>,
    /// Training mean of each input column.
    pub mean: Vec<f64>,
    /// Training population std of each input column (zero replaced by one).
    pub scale: Vec<f64>,
    /// Sorted class labels the projection was fitted on.
    pub classes: Vec<String>,
    /// Discriminant eigenvalues, decreasing.
    pub eigenvalues: Vec<f64>,
    /// Loadings on the standardized inputs, one vector per component.
    pub components: Vec<Vec<f64>>,
    /// Output column names.
    pub outputs: Vec<String>,
}

/// Fitted linear projection.
#[derive(Clone, Debug)]
pub struct FittedLinearProjection {
    params: ProjectionParams,
}

impl FittedLinearProjection {
    /// Number of discriminant components.
    pub fn n_components(&self) -> usize {
        self.params.components.len()
    }

    /// Loadings of each component on the standardized inputs.
    pub fn components(&self) -> &[Vec<f64>] {
        &self.params.components
    }

    /// Output column names.
    pub fn output_columns(&self) -> &[String] {
        &self.params.outputs
    }

    /// Project one raw input row.
    pub fn project(&self, row: &[f64]) -> Vec<f64> {
        let z: Vec<f64> = row
            .iter()
            .zip(&self.params.mean)
            .zip(&self.params.scale)
            .map(|((x, m), s)| (x - m) / s)
            .collect();
        self.params
            .components
            .iter()
            .map(|w| w.iter().zip(&z).map(|(a, b)| a * b).sum())
            .collect()
    }
}

/// Row-major `n x p` matrix of the subset; missing values are an error.
fn subset_matrix(table: &Table, columns: &[String]) -> Result<Vec<f64>> {
    let n = table.n_rows();
    let p = columns.len();
    let mut data = vec![0.0; n * p];
    for (j, name) in columns.iter().enumerate() {
        let column = table.column(name)?;
        if !matches!(column.kind(), ColumnKind::Numeric | ColumnKind::Boolean) {
            return Err(PreprocessingError::TypeMismatch {
                column: name.clone(),
                expected: "numeric".to_string(),
                got: column.kind().to_string(),
            });
        }
        let missing = column.missing_count();
        if missing > 0 {
            return Err(PreprocessingError::MissingValues(format!(
                "Column '{}' has {} missing values; impute before projecting",
                name, missing
            )));
        }
        for (i, x) in column.numbers().into_iter().enumerate() {
            data[i * p + j] = x.unwrap_or(f64::NAN);
        }
    }
    Ok(data)
}

impl Transformer for LinearProjection {
    type Fitted = FittedLinearProjection;

    fn fit(&self, training: &Table) -> Result<Self::Fitted> {
        let n = training.n_rows();
        let p = self.columns.len();
        let k = self.labels.n_classes();
        if p == 0 {
            return Err(PreprocessingError::InvalidParameter(
                "Projection needs at least one input column".to_string(),
            ));
        }
        if k < 2 {
            return Err(PreprocessingError::InvalidParameter(format!(
                "Projection needs at least two classes, got {}",
                k
            )));
        }
        self.labels.check_rows(n)?;
        if n <= k {
            return Err(PreprocessingError::EmptyData(format!(
                "Projection needs more rows ({}) than classes ({})",
                n, k
            )));
        }
        training.require(&self.columns)?;
        let mut z = subset_matrix(training, &self.columns)?;

        // Standardize with population moments.
        let mut mean = vec![0.0; p];
        let mut scale = vec![0.0; p];
        for j in 0..p {
            mean[j] = (0..n).map(|i| z[i * p + j]).sum::<f64>() / n as f64;
            let var = (0..n).map(|i| (z[i * p + j] - mean[j]).powi(2)).sum::<f64>() / n as f64;
            let std = var.sqrt();
            scale[j] = if std == 0.0 { 1.0 } else { std };
        }
        for i in 0..n {
            for j in 0..p {
                z[i * p + j] = (z[i * p + j] - mean[j]) / scale[j];
            }
        }

        // Class means and overall mean.
        let classes = self.labels.class_indices();
        let mut counts = vec![0usize; k];
        let mut class_means = vec![0.0; k * p];
        for (i, &c) in classes.iter().enumerate() {
            counts[c] += 1;
            for j in 0..p {
                class_means[c * p + j] += z[i * p + j];
            }
        }
        for c in 0..k {
            for j in 0..p {
                class_means[c * p + j] /= counts[c] as f64;
            }
        }
        let priors: Vec<f64> = counts.iter().map(|&c| c as f64 / n as f64).collect();
        let overall: Vec<f64> = (0..p)
            .map(|j| (0..k).map(|c| priors[c] * class_means[c * p + j]).sum())
            .collect();

        // Scatter matrices.
        let mut sw = vec![0.0; p * p];
        for (i, &c) in classes.iter().enumerate() {
            for a in 0..p {
                let da = z[i * p + a] - class_means[c * p + a];
                for b in 0..p {
                    sw[a * p + b] += da * (z[i * p + b] - class_means[c * p + b]);
                }
            }
        }
        let dof = (n - k) as f64;
        for (idx, value) in sw.iter_mut().enumerate() {
            *value /= dof;
            if idx % (p + 1) == 0 {
                *value += self.ridge;
            }
        }
        let mut sb = vec![0.0; p * p];
        for c in 0..k {
            for a in 0..p {
                let da = class_means[c * p + a] - overall[a];
                for b in 0..p {
                    sb[a * p + b] += priors[c] * da * (class_means[c * p + b] - overall[b]);
                }
            }
        }

        // Whiten: M = L^-1 Sb L^-T.
        let l = cholesky(&sw, p)?;
        let y = solve_lower(&l, &sb, p, p);
        let mut m = solve_lower(&l, &transpose(&y, p, p), p, p);
        for a in 0..p {
            for b in a + 1..p {
                let avg = 0.5 * (m[a * p + b] + m[b * p + a]);
                m[a * p + b] = avg;
                m[b * p + a] = avg;
            }
        }
        let (values, vectors) = symmetric_eigen(&m, p)?;
        let loadings = solve_lower_transposed(&l, &vectors, p, p);

        let mut order: Vec<usize> = (0..p).collect();
        order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
        let n_components = (k - 1).min(p);

        let mut eigenvalues = Vec::with_capacity(n_components);
        let mut components = Vec::with_capacity(n_components);
        for &col in order.iter().take(n_components) {
            let mut w: Vec<f64> = (0..p).map(|j| loadings[j * p + col]).collect();
            let pivot = w.iter().copied().fold(0.0, |best: f64, x| if x.abs() > best.abs() { x } else { best });
            if pivot < 0.0 {
                w.iter_mut().for_each(|x| *x = -*x);
            }
            eigenvalues.push(values[col]);
            components.push(w);
        }
        let outputs = (0..n_components).map(|i| format!("{}_{}", self.prefix, i)).collect();
        debug!(inputs = p, components = n_components, eigenvalues = ?eigenvalues, "fitted linear projection");

        Ok(FittedLinearProjection {
            params: ProjectionParams {
                columns: self.columns.clone(),
                mean,
                scale,
                classes: self.labels.classes().to_vec(),
                eigenvalues,
                components,
                outputs,
            },
        })
    }
}

impl FittedTransformer for FittedLinearProjection {
    type Params = ProjectionParams;

    fn transform(&self, mut table: Table) -> Result<Table> {
        let p = self.params.columns.len();
        let data = subset_matrix(&table, &self.params.columns)?;
        let projected: Vec<Vec<f64>> = data.chunks(p).map(|row| self.project(row)).collect();

        for (c, name) in self.params.outputs.iter().enumerate() {
            table.push_column(Column::numeric(
                name.clone(),
                projected.iter().map(|row| Some(row[c])),
            ))?;
        }
        table.drop_columns(&self.params.columns)?;
        Ok(table)
    }

    fn extract_params(&self) -> Self::Params {
        self.params.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::traits::PairStep;
    use crate::table::{Schema, TablePair, Value};

    fn schema() -> Schema {
        Schema::new()
            .with_column("gps_height", ColumnKind::Numeric)
            .with_column("population", ColumnKind::Numeric)
            .with_column("basin", ColumnKind::Categorical)
    }

    fn table(rows: &[(f64, f64)]) -> Table {
        Table::from_rows(
            &schema(),
            rows.iter()
                .map(|&(a, b)| vec![Value::from(a), Value::from(b), Value::from("Pangani")])
                .collect(),
        )
        .unwrap()
    }

    fn training() -> Table {
        table(&[(1.0, 5.0), (2.0, 3.0), (3.0, 4.0), (7.0, 4.0), (8.0, 5.0), (9.0, 3.0)])
    }

    fn labels() -> Labels {
        Labels::new(["functional", "functional", "functional", "non functional", "non functional", "non functional"])
            .unwrap()
    }

    #[test]
    fn test_two_classes_give_one_component() {
        let step = LinearProjection::new(["gps_height", "population"], labels());
        let fitted = step.fit(&training()).unwrap();
        assert_eq!(fitted.n_components(), 1);
        assert_eq!(fitted.output_columns(), &["lda_0"]);

        let w = &fitted.components()[0];
        assert!(w[0] > 0.0 && w[0].abs() > w[1].abs());

        let out = fitted.transform(training()).unwrap();
        assert_eq!(out.column_names(), vec!["basin", "lda_0"]);
        let z: Vec<f64> = out.column("lda_0").unwrap().numbers().into_iter().flatten().collect();
        let mean_a = z[..3].iter().sum::<f64>() / 3.0;
        let mean_b = z[3..].iter().sum::<f64>() / 3.0;
        assert!(mean_b > mean_a);

        // Unit pooled within-class variance.
        let within = z[..3].iter().map(|x| (x - mean_a).powi(2)).sum::<f64>()
            + z[3..].iter().map(|x| (x - mean_b).powi(2)).sum::<f64>();
        assert!((within / 4.0 - 1.0).abs() < 1e-4, "within variance {}", within / 4.0);
    }

    #[test]
    fn test_evaluation_uses_training_statistics() {
        let step = LinearProjection::new(["gps_height", "population"], labels());
        let evaluation = table(&[(2.0, 3.0), (100.0, -40.0)]);
        let out = step.apply(TablePair::new(training(), evaluation)).unwrap();
        let train_z = out.training.column("lda_0").unwrap().numbers();
        let eval_z = out.evaluation.column("lda_0").unwrap().numbers();
        assert!((train_z[1].unwrap() - eval_z[0].unwrap()).abs() < 1e-12);
        assert!(out.training.check_parity(&out.evaluation).is_ok());

        let alone = step.fit(&training()).unwrap();
        let other = step
            .apply(TablePair::new(training(), table(&[(0.0, 0.0)])))
            .unwrap();
        assert_eq!(alone.transform(training()).unwrap(), other.training);
    }

    #[test]
    fn test_three_classes_give_two_components() {
        let schema = Schema::new()
            .with_column("a", ColumnKind::Numeric)
            .with_column("b", ColumnKind::Numeric)
            .with_column("c", ColumnKind::Numeric);
        let rows: Vec<Vec<Value>> = (0..12)
            .map(|i| {
                let class = (i % 3) as f64;
                let jitter = (i / 3) as f64 * 0.3;
                vec![
                    Value::from(class * 2.0 + jitter),
                    Value::from(-class + (i % 2) as f64),
                    Value::from(jitter * jitter),
                ]
            })
            .collect();
        let training = Table::from_rows(&schema, rows).unwrap();
        let labels = Labels::new((0..12).map(|i| format!("class{}", i % 3))).unwrap();
        let fitted = LinearProjection::new(["a", "b", "c"], labels).fit(&training).unwrap();
        assert_eq!(fitted.n_components(), 2);
        let params = fitted.extract_params();
        assert!(params.eigenvalues[0] >= params.eigenvalues[1]);
        for w in fitted.components() {
            let pivot = w.iter().copied().fold(0.0, |best: f64, x| if x.abs() > best.abs() { x } else { best });
            assert!(pivot > 0.0);
        }
    }

    #[test]
    fn test_missing_input_is_rejected() {
        let t = Table::from_rows(
            &schema(),
            vec![
                vec![1.0.into(), Value::Missing, "Pangani".into()],
                vec![2.0.into(), 3.0.into(), "Pangani".into()],
                vec![3.0.into(), 4.0.into(), "Pangani".into()],
            ],
        )
        .unwrap();
        let labels = Labels::new(["a", "b", "a"]).unwrap();
        let result = LinearProjection::new(["gps_height", "population"], labels).fit(&t);
        assert!(matches!(result, Err(PreprocessingError::MissingValues(_))));
    }

    #[test]
    fn test_single_class_is_invalid() {
        let labels = Labels::new(vec!["functional"; 6]).unwrap();
        let result = LinearProjection::new(["gps_height"], labels).fit(&training());
        assert!(matches!(result, Err(PreprocessingError::InvalidParameter(_))));
    }

    #[test]
    fn test_categorical_input_is_rejected() {
        let result = LinearProjection::new(["basin"], labels()).fit(&training());
        assert!(matches!(result, Err(PreprocessingError::TypeMismatch { .. })));
    }
}
