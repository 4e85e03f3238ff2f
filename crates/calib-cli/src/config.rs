//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$CALIB_CONFIG` environment variable
//! 2. `~/.config/calib/config.toml`
//! 3. Built-in defaults (everything is optional)

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use calib_core::{CodeNames, Labels, DEFAULT_WARMUP};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub covariance: CovarianceConfig,
    pub inverse: InverseConfig,
}

/// Covariance report settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CovarianceConfig {
    /// Recording to read when no path is given on the command line.
    pub input: PathBuf,
    /// Leading rows per sensor to discard.
    pub warmup: usize,
    pub accel_label: String,
    pub gyro_label: String,
    /// Array names in the generated declarations.
    pub accel_name: String,
    pub gyro_name: String,
}

/// Inverse generator settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InverseConfig {
    pub dimension: usize,
    pub input_name: String,
    pub output_name: String,
    pub det_name: String,
}

// --- Defaults ---

impl Default for CovarianceConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data.csv"),
            warmup: DEFAULT_WARMUP,
            accel_label: "accel".into(),
            gyro_label: "gyro".into(),
            accel_name: "accel_cov".into(),
            gyro_name: "gyro_cov".into(),
        }
    }
}

impl Default for InverseConfig {
    fn default() -> Self {
        let names = CodeNames::default();
        Self {
            dimension: 3,
            input_name: names.input,
            output_name: names.output,
            det_name: names.det,
        }
    }
}

impl CovarianceConfig {
    pub fn labels(&self) -> Labels {
        Labels::new(self.accel_label.clone(), self.gyro_label.clone())
    }
}

impl InverseConfig {
    pub fn names(&self) -> CodeNames {
        CodeNames {
            input: self.input_name.clone(),
            output: self.output_name.clone(),
            det: self.det_name.clone(),
        }
    }
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config() -> Result<Config> {
    let path = config_path();

    if let Some(p) = &path {
        if p.exists() {
            let content =
                std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            let config: Config =
                toml::from_str(&content).with_context(|| format!("parsing {}", p.display()))?;
            return Ok(config);
        }
    }

    Ok(Config::default())
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("CALIB_CONFIG") {
        return Some(PathBuf::from(p));
    }

    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join("calib").join("config.toml"))
}

/// Show the active config path (for `calib config`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}
