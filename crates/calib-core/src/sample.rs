use std::fmt;

use crate::error::{CalibError, CalibResult};

// ---------------------------------------------------------------------------
// SensorKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Accel,
    Gyro,
}

impl SensorKind {
    /// Number of numeric fields following the label.
    pub fn width(self) -> usize {
        match self {
            Self::Accel => 3,
            Self::Gyro => 4,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accel => write!(f, "accel"),
            Self::Gyro => write!(f, "gyro"),
        }
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Row labels that select a sensor. Compared verbatim, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub accel: String,
    pub gyro: String,
}

impl Labels {
    pub fn new(accel: impl Into<String>, gyro: impl Into<String>) -> Self {
        Self {
            accel: accel.into(),
            gyro: gyro.into(),
        }
    }

    pub fn kind_of(&self, label: &str) -> Option<SensorKind> {
        if label == self.accel {
            Some(SensorKind::Accel)
        } else if label == self.gyro {
            Some(SensorKind::Gyro)
        } else {
            None
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::new("accel", "gyro")
    }
}

// ---------------------------------------------------------------------------
// SampleRow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SampleRow {
    /// Accelerometer reading, scaled so the three axes sum to 1.
    Accel([f64; 3]),
    /// Gyroscope reading, as recorded.
    Gyro([f64; 4]),
    /// Unrecognised label.
    Ignored,
}

/// Parse one record. `line` is 1-based and only used in error messages.
pub fn parse_row<'a, I>(fields: I, line: u64, labels: &Labels) -> CalibResult<SampleRow>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut fields = fields.into_iter();
    let Some(label) = fields.next() else {
        return Ok(SampleRow::Ignored);
    };
    let Some(kind) = labels.kind_of(label.trim()) else {
        return Ok(SampleRow::Ignored);
    };

    let values = fields
        .enumerate()
        .map(|(i, text)| parse_number(text, line, i + 1))
        .collect::<CalibResult<Vec<f64>>>()?;

    if values.len() != kind.width() {
        return Err(CalibError::FieldCount {
            line,
            kind,
            expected: kind.width(),
            found: values.len(),
        });
    }

    match kind {
        SensorKind::Accel => {
            let sum: f64 = values.iter().sum();
            if sum == 0.0 {
                return Err(CalibError::ZeroSum { line, kind });
            }
            if !sum.is_finite() {
                return Err(CalibError::NonFiniteSum { line, kind });
            }
            Ok(SampleRow::Accel([
                values[0] / sum,
                values[1] / sum,
                values[2] / sum,
            ]))
        }
        SensorKind::Gyro => Ok(SampleRow::Gyro([
            values[0], values[1], values[2], values[3],
        ])),
    }
}

/// Finite decimal only: `nan` and `inf` parse as `f64` but are rejected.
fn parse_number(text: &str, line: u64, field: usize) -> CalibResult<f64> {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CalibError::Parse {
            line,
            field,
            text: text.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

/// Rows accumulated per sensor over a whole recording.
#[derive(Debug, Clone, Default)]
pub struct Samples {
    pub accel: Vec<[f64; 3]>,
    pub gyro: Vec<[f64; 4]>,
    pub ignored: usize,
}

impl Samples {
    pub fn push(&mut self, row: SampleRow) {
        match row {
            SampleRow::Accel(v) => self.accel.push(v),
            SampleRow::Gyro(v) => self.gyro.push(v),
            SampleRow::Ignored => self.ignored += 1,
        }
    }

    pub fn rows(&self, kind: SensorKind) -> Vec<&[f64]> {
        match kind {
            SensorKind::Accel => self.accel.iter().map(|r| r.as_slice()).collect(),
            SensorKind::Gyro => self.gyro.iter().map(|r| r.as_slice()).collect(),
        }
    }
}
