//! The two generators, producing complete stdout text before anything is
//! printed.

use std::path::Path;

use anyhow::{Context, Result};
use nalgebra::DMatrix;
use tracing::info;

use calib_core::{
    covariance, format_c_matrix, format_grid, render_inverse, sample_matrix, CodeNames,
    InverseFormulas, Samples, SensorKind,
};
use calib_data::read_samples_from_path;

use crate::config::CovarianceConfig;

/// Relative tolerance for `calib inverse --check`.
const CHECK_TOLERANCE: f64 = 1e-9;

/// Noise covariance of both sensors.
#[derive(Debug)]
pub struct CovarianceReport {
    pub accel: DMatrix<f64>,
    pub gyro: DMatrix<f64>,
}

impl CovarianceReport {
    pub fn from_samples(samples: &Samples, warmup: usize) -> Result<Self> {
        let accel = covariance(SensorKind::Accel, &samples.rows(SensorKind::Accel), warmup)
            .context("accelerometer covariance")?;
        let gyro = covariance(SensorKind::Gyro, &samples.rows(SensorKind::Gyro), warmup)
            .context("gyroscope covariance")?;
        Ok(Self { accel, gyro })
    }

    /// C declarations, accelerometer first.
    pub fn to_c(&self, cfg: &CovarianceConfig) -> String {
        let mut out = format_c_matrix(&self.accel, &cfg.accel_name);
        out.push_str(&format_c_matrix(&self.gyro, &cfg.gyro_name));
        out
    }

    pub fn summary(&self) -> String {
        format!(
            "Accelerometer:\n{}Gyro:\n{}",
            format_grid(&self.accel),
            format_grid(&self.gyro)
        )
    }
}

pub fn covariance_report(
    path: &Path,
    warmup: usize,
    cfg: &CovarianceConfig,
) -> Result<CovarianceReport> {
    let samples = read_samples_from_path(path, &cfg.labels())?;
    info!(
        accel = samples.accel.len(),
        gyro = samples.gyro.len(),
        warmup,
        "loaded {}",
        path.display()
    );
    CovarianceReport::from_samples(&samples, warmup)
}

/// Generated C statements for the inverse of a `dim`×`dim` matrix.
pub fn inverse_code(dim: usize, names: &CodeNames, check: bool) -> Result<String> {
    let formulas = InverseFormulas::derive(dim)?;
    if check {
        formulas
            .verify(&sample_matrix(dim), CHECK_TOLERANCE)
            .with_context(|| format!("checking {dim}x{dim} formulas"))?;
        info!(dim, "formulas agree with numeric inverse");
    }
    Ok(render_inverse(&formulas, names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_recording(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_report_renders_both_matrices() {
        let mut rows = Vec::new();
        for i in 0..20 {
            rows.push(if i % 2 == 0 { "accel,1,1,2" } else { "accel,1,2,1" });
            rows.push("gyro,0.5,0.5,0.5,20");
        }
        let file = write_recording(&rows);
        let cfg = CovarianceConfig::default();

        let report = covariance_report(file.path(), 10, &cfg).unwrap();
        let text = report.to_c(&cfg);
        assert!(text.starts_with("double accel_cov[3][3] = {\n"));
        assert!(text.contains("double gyro_cov[4][4] = {\n"));
        assert!(text.ends_with("};\n\n"));
        assert!(text.contains("0.00000000e+00"));
        assert!(report.accel[(1, 1)] > 0.0);
        assert_eq!(report.gyro[(3, 3)], 0.0);
    }

    #[test]
    fn test_report_fails_on_short_recording() {
        let file = write_recording(&["accel,1,1,1", "gyro,1,2,3,4"]);
        let cfg = CovarianceConfig::default();
        let err = covariance_report(file.path(), cfg.warmup, &cfg).unwrap_err();
        assert!(format!("{err:#}").contains("warm-up"));
    }

    #[test]
    fn test_report_rejects_non_finite_input() {
        let mut rows: Vec<String> = (0..1005).map(|i| format!("gyro,{i},1,1,1")).collect();
        rows[1002] = "gyro,nan,1,1,1".into();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let file = write_recording(&rows);
        let cfg = CovarianceConfig::default();
        let Err(err) = covariance_report(file.path(), 1000, &cfg) else {
            panic!("non-finite gyro value was accepted");
        };
        assert!(format!("{err:#}").contains("line 1003"));

        let file = write_recording(&["accel,1e308,1e308,0"]);
        let Err(err) = covariance_report(file.path(), 0, &cfg) else {
            panic!("overflowing accel row was accepted");
        };
        assert!(format!("{err:#}").contains("not finite"));
    }

    #[test]
    fn test_summary_has_both_headings() {
        let report = CovarianceReport {
            accel: DMatrix::identity(3, 3),
            gyro: DMatrix::identity(4, 4),
        };
        let summary = report.summary();
        assert!(summary.starts_with("Accelerometer:\n"));
        assert!(summary.contains("Gyro:\n"));
        assert_eq!(summary.lines().count(), 9);
    }

    #[test]
    fn test_inverse_code_default_dimension() {
        let text = inverse_code(3, &CodeNames::default(), true).unwrap();
        assert!(text.starts_with("double det = "));
        assert_eq!(text.lines().count(), 10);
        assert!(text.contains("res[2][2] = (a[0][0]*a[1][1] - a[0][1]*a[1][0]) / det;"));
    }

    #[test]
    fn test_inverse_code_rejects_large_dimension() {
        assert!(inverse_code(9, &CodeNames::default(), false).is_err());
    }
}
