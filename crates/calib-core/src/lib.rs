pub mod codegen;
pub mod covariance;
pub mod error;
pub mod literal;
pub mod sample;
pub mod symbolic;

pub use codegen::{render_inverse, sample_matrix, CodeNames, InverseFormulas};
pub use covariance::{covariance, DEFAULT_WARMUP};
pub use error::{CalibError, CalibResult};
pub use literal::{format_c_matrix, format_grid, format_sci};
pub use sample::{parse_row, Labels, SampleRow, Samples, SensorKind};
pub use symbolic::{Polynomial, SymbolicMatrix, MAX_DIMENSION};
