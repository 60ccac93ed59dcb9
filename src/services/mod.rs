pub mod auth_service;
pub mod measurement_service;
pub mod series_service;

pub use auth_service::{AuthService, LoginResult, UserInfo};
pub use measurement_service::{MeasurementError, MeasurementInput, MeasurementService, Numeric};
pub use series_service::{SeriesError, SeriesService};
