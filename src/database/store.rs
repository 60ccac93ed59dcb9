use async_trait::async_trait;

use super::models::{
    Measurement, MeasurementView, MeasurementWrite, Series, SeriesInput, SeriesRange, User,
};
use super::DatabaseError;
use crate::filter::MeasurementFilter;

/// Result of a range-checked measurement write. The range lookup and the
/// write happen inside one transaction in the store.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Written(Measurement),
    SeriesMissing,
    OutOfRange(SeriesRange),
    MeasurementMissing,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, DatabaseError>;

    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError>;

    async fn update_password(&self, id: i32, password_hash: &str) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// All series ordered by name
    async fn list_series(&self) -> Result<Vec<Series>, DatabaseError>;

    async fn insert_series(&self, input: &SeriesInput) -> Result<Series, DatabaseError>;

    async fn update_series(&self, id: i32, input: &SeriesInput) -> Result<Option<Series>, DatabaseError>;

    /// Deletes the series and, through the schema cascade, its measurements
    async fn delete_series(&self, id: i32) -> Result<Option<Series>, DatabaseError>;
}

#[async_trait]
pub trait MeasurementStore: Send + Sync {
    /// Newest first, joined with series display fields
    async fn list_measurements(
        &self,
        filter: &MeasurementFilter,
    ) -> Result<Vec<MeasurementView>, DatabaseError>;

    async fn insert_measurement(&self, write: MeasurementWrite) -> Result<WriteOutcome, DatabaseError>;

    async fn update_measurement(
        &self,
        id: i32,
        write: MeasurementWrite,
    ) -> Result<WriteOutcome, DatabaseError>;

    /// Unconditional delete; returns how many rows went away
    async fn delete_measurement(&self, id: i32) -> Result<u64, DatabaseError>;
}

/// Everything the services need from persistence.
#[async_trait]
pub trait Store: UserStore + SeriesStore + MeasurementStore {
    async fn health_check(&self) -> Result<(), DatabaseError>;
}
