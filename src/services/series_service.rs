use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::database::models::{Series, SeriesInput};
use crate::database::{DatabaseError, Store};

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("Series {0} not found")]
    NotFound(i32),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// CRUD over series definitions. Range sanity (`min <= max`) is left to the
/// caller.
#[derive(Clone)]
pub struct SeriesService {
    store: Arc<dyn Store>,
}

impl SeriesService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Series>, SeriesError> {
        Ok(self.store.list_series().await?)
    }

    pub async fn create(&self, input: SeriesInput) -> Result<Series, SeriesError> {
        let series = self.store.insert_series(&input).await?;
        info!("Created series '{}' (id {})", series.name, series.id);
        Ok(series)
    }

    pub async fn update(&self, id: i32, input: SeriesInput) -> Result<Series, SeriesError> {
        let series = self
            .store
            .update_series(id, &input)
            .await?
            .ok_or(SeriesError::NotFound(id))?;
        info!("Updated series '{}' (id {})", series.name, series.id);
        Ok(series)
    }

    /// Removes the series together with its measurements.
    pub async fn delete(&self, id: i32) -> Result<Series, SeriesError> {
        let series = self
            .store
            .delete_series(id)
            .await?
            .ok_or(SeriesError::NotFound(id))?;
        info!("Deleted series '{}' (id {})", series.name, series.id);
        Ok(series)
    }
}
