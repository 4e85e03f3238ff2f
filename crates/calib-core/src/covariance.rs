use nalgebra::{DMatrix, DVector};

use crate::error::{CalibError, CalibResult};
use crate::sample::SensorKind;

/// Rows discarded from the start of each recording while the sensor settles.
pub const DEFAULT_WARMUP: usize = 1000;

/// Unbiased sample covariance of `rows` after skipping the first `warmup`.
///
/// Each row is one observation; each column is one variable. The result is
/// exactly symmetric: the lower triangle is copied from the upper one.
pub fn covariance(kind: SensorKind, rows: &[&[f64]], warmup: usize) -> CalibResult<DMatrix<f64>> {
    let total = rows.len();
    let observations = rows.get(warmup..).unwrap_or(&[]);
    if observations.len() < 2 {
        return Err(CalibError::InsufficientSamples {
            kind,
            total,
            warmup,
        });
    }

    let n = observations.len();
    let dim = kind.width();
    if let Some((offset, row)) = observations
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != dim)
    {
        return Err(CalibError::RowWidth {
            kind,
            index: warmup + offset,
            expected: dim,
            found: row.len(),
        });
    }

    // Shift by the first observation so constant columns come out exactly zero.
    let origin = observations[0];
    let shifted = DMatrix::from_fn(n, dim, |r, c| observations[r][c] - origin[c]);
    let mean = DVector::from_fn(dim, |c, _| shifted.column(c).mean());
    let centered = DMatrix::from_fn(n, dim, |r, c| shifted[(r, c)] - mean[c]);

    let denom = (n - 1) as f64;
    let mut cov = DMatrix::zeros(dim, dim);
    for i in 0..dim {
        for j in i..dim {
            let v = centered.column(i).dot(&centered.column(j)) / denom;
            cov[(i, j)] = v;
            cov[(j, i)] = v;
        }
    }

    if cov.iter().any(|v| !v.is_finite()) {
        return Err(CalibError::NonFiniteCovariance { kind });
    }

    tracing::debug!(%kind, total, used = n, "covariance computed");
    Ok(cov)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_rows<const N: usize>(rows: &[[f64; N]]) -> Vec<&[f64]> {
        rows.iter().map(|r| r.as_slice()).collect()
    }

    #[test]
    fn test_constant_data_is_zero_matrix() {
        let rows = vec![[1.0 / 3.0; 3]; 1010];
        let cov = covariance(SensorKind::Accel, &as_rows(&rows), DEFAULT_WARMUP).unwrap();
        assert_eq!(cov.shape(), (3, 3));
        assert!(cov.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_known_values() {
        // x = [1, 2, 3], y = [2, 4, 6], z = [3, 1, 2], w = [0, 0, 0]
        let rows = [
            [1.0, 2.0, 3.0, 0.0],
            [2.0, 4.0, 1.0, 0.0],
            [3.0, 6.0, 2.0, 0.0],
        ];
        let cov = covariance(SensorKind::Gyro, &as_rows(&rows), 0).unwrap();
        assert!((cov[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((cov[(1, 1)] - 4.0).abs() < 1e-12);
        assert!((cov[(0, 1)] - 2.0).abs() < 1e-12);
        assert!((cov[(2, 2)] - 1.0).abs() < 1e-12);
        assert!((cov[(0, 2)] + 0.5).abs() < 1e-12);
        assert_eq!(cov[(3, 3)], 0.0);
    }

    #[test]
    fn test_warmup_rows_are_skipped() {
        let mut rows = vec![[100.0, -50.0, 3.0, 9.0]; 5];
        rows.push([1.0, 1.0, 1.0, 1.0]);
        rows.push([1.0, 1.0, 1.0, 1.0]);
        let cov = covariance(SensorKind::Gyro, &as_rows(&rows), 5).unwrap();
        assert!(cov.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_result_is_symmetric() {
        let rows: Vec<[f64; 4]> = (0..50)
            .map(|i| {
                let t = i as f64;
                [t.sin(), (t * 0.7).cos(), t * 0.01, (t * 1.3).sin() * t]
            })
            .collect();
        let cov = covariance(SensorKind::Gyro, &as_rows(&rows), 10).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(cov[(i, j)], cov[(j, i)]);
            }
        }
    }

    #[test]
    fn test_short_row_is_error() {
        let rows: Vec<&[f64]> = vec![
            &[1.0, 2.0, 3.0][..],
            &[1.0, 2.0][..],
            &[0.5, 0.5, 0.5][..],
        ];
        let err = covariance(SensorKind::Accel, &rows, 0).unwrap_err();
        assert!(matches!(
            err,
            CalibError::RowWidth {
                index: 1,
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_overflowing_covariance_is_error() {
        let rows = [[1e200, 0.0, 0.0, 0.0], [-1e200, 0.0, 0.0, 0.0]];
        assert!(matches!(
            covariance(SensorKind::Gyro, &as_rows(&rows), 0),
            Err(CalibError::NonFiniteCovariance {
                kind: SensorKind::Gyro
            })
        ));
    }

    #[test]
    fn test_insufficient_samples() {
        let rows = vec![[0.2, 0.3, 0.5]; 1001];
        let err = covariance(SensorKind::Accel, &as_rows(&rows), DEFAULT_WARMUP).unwrap_err();
        assert!(matches!(
            err,
            CalibError::InsufficientSamples {
                kind: SensorKind::Accel,
                total: 1001,
                warmup: 1000
            }
        ));

        let empty: Vec<&[f64]> = Vec::new();
        assert!(covariance(SensorKind::Gyro, &empty, 0).is_err());
    }
}
