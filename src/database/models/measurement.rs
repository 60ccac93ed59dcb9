use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Measurement {
    pub id: i32,
    pub value: f64,
    pub series_id: i32,
    pub timestamp: DateTime<Utc>,
}

/// Listing row: a measurement joined with its series' display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MeasurementView {
    pub id: i32,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub series_id: i32,
    pub series_name: String,
    pub color: Option<String>,
}

/// Validated-shape payload for insert/update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementWrite {
    pub value: f64,
    pub series_id: i32,
    pub timestamp: DateTime<Utc>,
}
