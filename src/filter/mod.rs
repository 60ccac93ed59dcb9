pub mod error;
pub mod measurement;
pub mod timestamp;

pub use error::FilterError;
pub use measurement::{MeasurementFilter, MeasurementQuery};
pub use timestamp::parse_timestamp;
