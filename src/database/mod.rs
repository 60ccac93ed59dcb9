pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod store;

pub use manager::{Database, DatabaseError};
pub use store::{MeasurementStore, SeriesStore, Store, UserStore, WriteOutcome};
