use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Series {
    pub id: i32,
    pub name: String,
    pub min_value: f64,
    pub max_value: f64,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl Series {
    pub fn range(&self) -> SeriesRange {
        SeriesRange {
            min_value: self.min_value,
            max_value: self.max_value,
        }
    }
}

/// Body of series create/update. Fields are passed through to the store
/// unvalidated; the schema decides what is acceptable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesInput {
    pub name: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

pub const DEFAULT_SERIES_COLOR: &str = "#000000";

/// Inclusive value bounds of a series.
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct SeriesRange {
    pub min_value: f64,
    pub max_value: f64,
}

impl SeriesRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min_value && value <= self.max_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bounds_are_inclusive() {
        let range = SeriesRange { min_value: -10.0, max_value: 50.0 };
        assert!(range.contains(-10.0));
        assert!(range.contains(50.0));
        assert!(range.contains(25.0));
        assert!(!range.contains(50.0001));
        assert!(!range.contains(-10.5));
        assert!(!range.contains(f64::NAN));
    }

    #[test]
    fn inverted_range_accepts_nothing() {
        let range = SeriesRange { min_value: 5.0, max_value: 1.0 };
        assert!(!range.contains(3.0));
    }
}
