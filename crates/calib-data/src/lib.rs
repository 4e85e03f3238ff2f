pub mod reader;

pub use reader::{read_samples, read_samples_from_path};
