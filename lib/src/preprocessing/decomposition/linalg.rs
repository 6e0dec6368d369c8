//! Small dense linear algebra on row-major `n x n` buffers.

use crate::preprocessing::error::{PreprocessingError, Result};

const MAX_SWEEPS: usize = 100;

/// Lower-triangular Cholesky factor `L` with `a = L L^T`.
pub(crate) fn cholesky(a: &[f64], n: usize) -> Result<Vec<f64>> {
    let mut l = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i * n + k] * l[j * n + k]).sum();
            if i == j {
                let d = a[i * n + i] - sum;
                if !(d > 0.0 && d.is_finite()) {
                    return Err(PreprocessingError::NumericalError(format!(
                        "Matrix is not positive definite (pivot {} = {})",
                        i, d
                    )));
                }
                l[i * n + i] = d.sqrt();
            } else {
                l[i * n + j] = (a[i * n + j] - sum) / l[j * n + j];
            }
        }
    }
    Ok(l)
}

/// Solve `L X = B` for `X`, with `B` an `n x m` matrix.
pub(crate) fn solve_lower(l: &[f64], b: &[f64], n: usize, m: usize) -> Vec<f64> {
    let mut x = vec![0.0; n * m];
    for c in 0..m {
        for i in 0..n {
            let sum: f64 = (0..i).map(|k| l[i * n + k] * x[k * m + c]).sum();
            x[i * m + c] = (b[i * m + c] - sum) / l[i * n + i];
        }
    }
    x
}

/// Solve `L^T X = B` for `X`, with `B` an `n x m` matrix.
pub(crate) fn solve_lower_transposed(l: &[f64], b: &[f64], n: usize, m: usize) -> Vec<f64> {
    let mut x = vec![0.0; n * m];
    for c in 0..m {
        for i in (0..n).rev() {
            let sum: f64 = (i + 1..n).map(|k| l[k * n + i] * x[k * m + c]).sum();
            x[i * m + c] = (b[i * m + c] - sum) / l[i * n + i];
        }
    }
    x
}

pub(crate) fn transpose(a: &[f64], rows: usize, cols: usize) -> Vec<f64> {
    let mut t = vec![0.0; rows * cols];
    for i in 0..rows {
        for j in 0..cols {
            t[j * rows + i] = a[i * cols + j];
        }
    }
    t
}

/// Eigen decomposition of a symmetric matrix by cyclic Jacobi rotations.
///
/// Returns the eigenvalues and the eigenvectors as the columns of an
/// `n x n` matrix, in no particular order.
pub(crate) fn symmetric_eigen(a: &[f64], n: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    let mut a = a.to_vec();
    let mut v = vec![0.0; n * n];
    for i in 0..n {
        v[i * n + i] = 1.0;
    }

    let scale: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt().max(f64::MIN_POSITIVE);
    let mut converged = false;
    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| (p + 1..n).map(move |q| (p, q)))
            .map(|(p, q)| a[p * n + q] * a[p * n + q])
            .sum::<f64>()
            .sqrt();
        if off <= 1e-14 * scale {
            converged = true;
            break;
        }

        for p in 0..n {
            for q in p + 1..n {
                let apq = a[p * n + q];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[q * n + q] - a[p * n + p]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let (akp, akq) = (a[k * n + p], a[k * n + q]);
                    a[k * n + p] = c * akp - s * akq;
                    a[k * n + q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[p * n + k], a[q * n + k]);
                    a[p * n + k] = c * apk - s * aqk;
                    a[q * n + k] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let (vkp, vkq) = (v[k * n + p], v[k * n + q]);
                    v[k * n + p] = c * vkp - s * vkq;
                    v[k * n + q] = s * vkp + c * vkq;
                }
            }
        }
    }

    if !converged {
        return Err(PreprocessingError::NumericalError(format!(
            "Jacobi eigen decomposition did not converge in {} sweeps",
            MAX_SWEEPS
        )));
    }
    let values = (0..n).map(|i| a[i * n + i]).collect();
    Ok((values, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matmul(a: &[f64], b: &[f64], n: usize, k: usize, m: usize) -> Vec<f64> {
        let mut out = vec![0.0; n * m];
        for i in 0..n {
            for j in 0..m {
                out[i * m + j] = (0..k).map(|t| a[i * k + t] * b[t * m + j]).sum();
            }
        }
        out
    }

    #[test]
    fn test_cholesky_known_factor() {
        let l = cholesky(&[4.0, 2.0, 2.0, 3.0], 2).unwrap();
        let expected = [2.0, 0.0, 1.0, 2f64.sqrt()];
        for (a, b) in l.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        assert!(matches!(
            cholesky(&[1.0, 2.0, 2.0, 1.0], 2),
            Err(PreprocessingError::NumericalError(_))
        ));
    }

    #[test]
    fn test_triangular_solves() {
        let l = cholesky(&[4.0, 2.0, 2.0, 3.0], 2).unwrap();
        let b = [1.0, 2.0, 3.0, 4.0];
        let x = solve_lower(&l, &b, 2, 2);
        let back = matmul(&l, &x, 2, 2, 2);
        let lt = transpose(&l, 2, 2);
        let y = solve_lower_transposed(&l, &b, 2, 2);
        let back_t = matmul(&lt, &y, 2, 2, 2);
        for i in 0..4 {
            assert!((back[i] - b[i]).abs() < 1e-12);
            assert!((back_t[i] - b[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_symmetric_eigen() {
        let a = [2.0, 1.0, 0.0, 1.0, 2.0, 0.0, 0.0, 0.0, 5.0];
        let (values, vectors) = symmetric_eigen(&a, 3).unwrap();
        let mut sorted = values.clone();
        sorted.sort_by(f64::total_cmp);
        for (got, want) in sorted.iter().zip([1.0, 3.0, 5.0]) {
            assert!((got - want).abs() < 1e-10, "eigenvalue {} vs {}", got, want);
        }
        // A v = lambda v for every column.
        let av = matmul(&a, &vectors, 3, 3, 3);
        for j in 0..3 {
            for i in 0..3 {
                assert!((av[i * 3 + j] - values[j] * vectors[i * 3 + j]).abs() < 1e-10);
            }
        }
    }
}
