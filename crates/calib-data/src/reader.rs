//! CSV ingestion for recorded IMU samples.
//!
//! One record per line, no header: `label,v1,v2,...`. Every record goes
//! through [`parse_row`]; the first malformed record aborts the read.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use calib_core::{parse_row, CalibError, CalibResult, Labels, Samples};

/// Read every sample in the file at `path`.
pub fn read_samples_from_path(path: &Path, labels: &Labels) -> CalibResult<Samples> {
    let file = File::open(path).map_err(|source| CalibError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("reading samples from {}", path.display());
    read_samples(file, labels)
}

/// Read every sample from `input` into a fresh accumulator.
pub fn read_samples<R: Read>(input: R, labels: &Labels) -> CalibResult<Samples> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let mut samples = Samples::default();
    let mut record = StringRecord::new();
    let mut index: u64 = 0;
    loop {
        let more = reader
            .read_record(&mut record)
            .map_err(|e| CalibError::Csv(e.to_string()))?;
        if !more {
            break;
        }
        index += 1;
        let line = record.position().map(|p| p.line()).unwrap_or(index);
        samples.push(parse_row(record.iter(), line, labels)?);
    }

    debug!(
        records = index,
        accel = samples.accel.len(),
        gyro = samples.gyro.len(),
        "samples read"
    );
    if samples.ignored > 0 {
        warn!("{} rows with unrecognised labels ignored", samples.ignored);
    }
    Ok(samples)
}
