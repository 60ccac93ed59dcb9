pub mod measurement;
pub mod series;
pub mod user;

pub use measurement::{Measurement, MeasurementView, MeasurementWrite};
pub use series::{Series, SeriesInput, SeriesRange};
pub use user::User;
