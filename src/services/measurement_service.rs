use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::database::models::{Measurement, MeasurementView, MeasurementWrite, SeriesRange};
use crate::database::{DatabaseError, Store, WriteOutcome};
use crate::filter::{parse_timestamp, FilterError, MeasurementFilter};

#[derive(Debug, Error)]
pub enum MeasurementError {
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("Invalid number for \"{field}\": {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Value {value} is out of range ({} - {}).", .range.min_value, .range.max_value)]
    OutOfRange { value: f64, range: SeriesRange },

    #[error("Series does not exist")]
    SeriesNotFound,

    #[error("Measurement not found")]
    MeasurementNotFound,

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// A JSON number, or a string holding one (form inputs often send strings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn as_f64(&self, field: &'static str) -> Result<f64, MeasurementError> {
        match self {
            Numeric::Number(n) => Ok(*n),
            Numeric::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| MeasurementError::InvalidNumber {
                    field,
                    value: s.clone(),
                }),
        }
    }

    fn as_id(&self, field: &'static str) -> Result<i32, MeasurementError> {
        let invalid = || MeasurementError::InvalidNumber {
            field,
            value: match self {
                Numeric::Number(n) => n.to_string(),
                Numeric::Text(s) => s.clone(),
            },
        };
        match self {
            Numeric::Number(n) if n.fract() == 0.0 && *n >= i32::MIN as f64 && *n <= i32::MAX as f64 => {
                Ok(*n as i32)
            }
            Numeric::Number(_) => Err(invalid()),
            Numeric::Text(s) => s.trim().parse::<i32>().map_err(|_| invalid()),
        }
    }
}

/// Body of measurement create/update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasurementInput {
    pub value: Option<Numeric>,
    pub series_id: Option<Numeric>,
    pub timestamp: Option<String>,
}

/// Measurement CRUD with range validation against the owning series.
#[derive(Clone)]
pub struct MeasurementService {
    store: Arc<dyn Store>,
}

impl MeasurementService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &MeasurementFilter) -> Result<Vec<MeasurementView>, MeasurementError> {
        let rows = self.store.list_measurements(filter).await?;
        debug!("Listed {} measurements", rows.len());
        Ok(rows)
    }

    /// Insert a measurement; timestamp defaults to now.
    pub async fn create(&self, input: MeasurementInput) -> Result<Measurement, MeasurementError> {
        let (Some(value), Some(series_id)) = (input.value, input.series_id) else {
            return Err(MeasurementError::MissingFields("Missing \"value\" or \"series_id\""));
        };

        let timestamp = match input.timestamp.filter(|t| !t.trim().is_empty()) {
            Some(raw) => parse_timestamp("timestamp", &raw)?,
            None => Utc::now(),
        };

        let write = MeasurementWrite {
            value: value.as_f64("value")?,
            series_id: series_id.as_id("series_id")?,
            timestamp,
        };

        let row = resolve(self.store.insert_measurement(write).await?, write.value)?;
        info!("Recorded measurement {} = {} on series {}", row.id, row.value, row.series_id);
        Ok(row)
    }

    /// Replace a measurement, re-validating against the target series.
    pub async fn update(&self, id: i32, input: MeasurementInput) -> Result<Measurement, MeasurementError> {
        let (Some(value), Some(series_id), Some(raw_ts)) = (input.value, input.series_id, input.timestamp)
        else {
            return Err(MeasurementError::MissingFields(
                "Missing \"value\", \"series_id\" or \"timestamp\"",
            ));
        };

        let write = MeasurementWrite {
            value: value.as_f64("value")?,
            series_id: series_id.as_id("series_id")?,
            timestamp: parse_timestamp("timestamp", &raw_ts)?,
        };

        let row = resolve(self.store.update_measurement(id, write).await?, write.value)?;
        info!("Updated measurement {} = {} on series {}", row.id, row.value, row.series_id);
        Ok(row)
    }

    /// Deletes without checking that the row existed.
    pub async fn delete(&self, id: i32) -> Result<(), MeasurementError> {
        let removed = self.store.delete_measurement(id).await?;
        debug!("Deleted measurement {} ({} rows)", id, removed);
        Ok(())
    }
}

fn resolve(outcome: WriteOutcome, value: f64) -> Result<Measurement, MeasurementError> {
    match outcome {
        WriteOutcome::Written(row) => Ok(row),
        WriteOutcome::SeriesMissing => Err(MeasurementError::SeriesNotFound),
        WriteOutcome::OutOfRange(range) => Err(MeasurementError::OutOfRange { value, range }),
        WriteOutcome::MeasurementMissing => Err(MeasurementError::MeasurementNotFound),
    }
}
