use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{parse_timestamp, FilterError};

/// Raw query string of `GET /api/measurements`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeasurementQuery {
    /// Comma separated series ids, e.g. `1,2`
    pub series_id: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Conjunctive listing filter. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementFilter {
    pub series_ids: Option<Vec<i32>>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl MeasurementFilter {
    pub fn matches(&self, series_id: i32, timestamp: DateTime<Utc>) -> bool {
        if let Some(ids) = &self.series_ids {
            if !ids.contains(&series_id) {
                return false;
            }
        }
        if let Some(start) = self.start {
            if timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if timestamp > end {
                return false;
            }
        }
        true
    }
}

impl TryFrom<MeasurementQuery> for MeasurementFilter {
    type Error = FilterError;

    fn try_from(query: MeasurementQuery) -> Result<Self, Self::Error> {
        let series_ids = match non_empty(query.series_id) {
            Some(csv) => {
                let ids = parse_series_ids(&csv)?;
                if ids.is_empty() {
                    None
                } else {
                    Some(ids)
                }
            }
            None => None,
        };

        let start = non_empty(query.start)
            .map(|raw| parse_timestamp("start", &raw))
            .transpose()?;
        let end = non_empty(query.end)
            .map(|raw| parse_timestamp("end", &raw))
            .transpose()?;

        Ok(Self { series_ids, start, end })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_series_ids(csv: &str) -> Result<Vec<i32>, FilterError> {
    csv.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>()
                .map_err(|_| FilterError::InvalidSeriesId(part.to_string()))
        })
        .collect()
}
