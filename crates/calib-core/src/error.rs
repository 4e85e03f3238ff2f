use std::path::PathBuf;

use thiserror::Error;

use crate::sample::SensorKind;

#[derive(Debug, Error)]
pub enum CalibError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(String),

    #[error("line {line}, field {field}: cannot parse {text:?} as a number")]
    Parse {
        line: u64,
        field: usize,
        text: String,
    },

    #[error("line {line}: {kind} row has {found} numeric fields, expected {expected}")]
    FieldCount {
        line: u64,
        kind: SensorKind,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: {kind} row sums to zero and cannot be normalized")]
    ZeroSum { line: u64, kind: SensorKind },

    #[error("line {line}: {kind} row sum is not finite and cannot be normalized")]
    NonFiniteSum { line: u64, kind: SensorKind },

    #[error("{kind}: row {index} has {found} values, expected {expected}")]
    RowWidth {
        kind: SensorKind,
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("{kind}: covariance is not finite; the input values are too large")]
    NonFiniteCovariance { kind: SensorKind },

    #[error("{kind}: {total} rows read, need at least 2 after skipping {warmup} warm-up rows")]
    InsufficientSamples {
        kind: SensorKind,
        total: usize,
        warmup: usize,
    },

    #[error("invalid matrix dimension: {0}")]
    InvalidDimension(usize),

    #[error("matrix dimension {got} exceeds the supported maximum of {max}")]
    DimensionTooLarge { got: usize, max: usize },

    #[error("verification failed: {0}")]
    VerificationFailed(String),
}

pub type CalibResult<T> = Result<T, CalibError>;
