use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::database::models::{
    series::DEFAULT_SERIES_COLOR, Measurement, MeasurementView, MeasurementWrite, Series,
    SeriesInput, User,
};
use crate::database::{DatabaseError, MeasurementStore, SeriesStore, Store, UserStore, WriteOutcome};
use crate::filter::MeasurementFilter;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    series: BTreeMap<i32, Series>,
    measurements: BTreeMap<i32, Measurement>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory store with the same constraints as the SQL schema
/// (unique usernames, NOT NULL series columns, cascading series delete).
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    unavailable: Arc<Mutex<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent health check fail
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    pub fn password_hash(&self, username: &str) -> Option<String> {
        self.lock()
            .users
            .values()
            .find(|u| u.username == username)
            .map(|u| u.password_hash.clone())
    }

    pub fn measurement_count(&self) -> usize {
        self.lock().measurements.len()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }
}

fn series_from_input(id: i32, input: &SeriesInput, color: Option<String>) -> Result<Series, DatabaseError> {
    let name = input
        .name
        .clone()
        .ok_or_else(|| DatabaseError::Constraint("series.name".into()))?;
    let min_value = input
        .min_value
        .ok_or_else(|| DatabaseError::Constraint("series.min_value".into()))?;
    let max_value = input
        .max_value
        .ok_or_else(|| DatabaseError::Constraint("series.max_value".into()))?;
    Ok(Series {
        id,
        name,
        min_value,
        max_value,
        color,
        icon: input.icon.clone(),
    })
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.lock().users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, DatabaseError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut tables = self.lock();
        if tables.users.values().any(|u| u.username == username) {
            return Err(DatabaseError::UniqueViolation("users_username_key".into()));
        }
        let id = tables.next_id();
        let user = User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_password(&self, id: i32, password_hash: &str) -> Result<bool, DatabaseError> {
        match self.lock().users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl SeriesStore for MemoryStore {
    async fn list_series(&self) -> Result<Vec<Series>, DatabaseError> {
        let mut rows: Vec<Series> = self.lock().series.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn insert_series(&self, input: &SeriesInput) -> Result<Series, DatabaseError> {
        let mut tables = self.lock();
        let color = Some(input.color.clone().unwrap_or_else(|| DEFAULT_SERIES_COLOR.to_string()));
        let series = series_from_input(tables.next_id + 1, input, color)?;
        tables.next_id();
        tables.series.insert(series.id, series.clone());
        Ok(series)
    }

    async fn update_series(&self, id: i32, input: &SeriesInput) -> Result<Option<Series>, DatabaseError> {
        let mut tables = self.lock();
        if !tables.series.contains_key(&id) {
            return Ok(None);
        }
        let series = series_from_input(id, input, input.color.clone())?;
        tables.series.insert(id, series.clone());
        Ok(Some(series))
    }

    async fn delete_series(&self, id: i32) -> Result<Option<Series>, DatabaseError> {
        let mut tables = self.lock();
        let removed = tables.series.remove(&id);
        if removed.is_some() {
            tables.measurements.retain(|_, m| m.series_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl MeasurementStore for MemoryStore {
    async fn list_measurements(
        &self,
        filter: &MeasurementFilter,
    ) -> Result<Vec<MeasurementView>, DatabaseError> {
        let tables = self.lock();
        let mut rows: Vec<MeasurementView> = tables
            .measurements
            .values()
            .filter(|m| filter.matches(m.series_id, m.timestamp))
            .filter_map(|m| {
                tables.series.get(&m.series_id).map(|s| MeasurementView {
                    id: m.id,
                    value: m.value,
                    timestamp: m.timestamp,
                    series_id: m.series_id,
                    series_name: s.name.clone(),
                    color: s.color.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert_measurement(&self, write: MeasurementWrite) -> Result<WriteOutcome, DatabaseError> {
        let mut tables = self.lock();
        let Some(series) = tables.series.get(&write.series_id) else {
            return Ok(WriteOutcome::SeriesMissing);
        };
        let range = series.range();
        if !range.contains(write.value) {
            return Ok(WriteOutcome::OutOfRange(range));
        }
        let id = tables.next_id();
        let row = Measurement {
            id,
            value: write.value,
            series_id: write.series_id,
            timestamp: write.timestamp,
        };
        tables.measurements.insert(id, row.clone());
        Ok(WriteOutcome::Written(row))
    }

    async fn update_measurement(
        &self,
        id: i32,
        write: MeasurementWrite,
    ) -> Result<WriteOutcome, DatabaseError> {
        let mut tables = self.lock();
        let Some(series) = tables.series.get(&write.series_id) else {
            return Ok(WriteOutcome::SeriesMissing);
        };
        let range = series.range();
        if !range.contains(write.value) {
            return Ok(WriteOutcome::OutOfRange(range));
        }
        match tables.measurements.get_mut(&id) {
            Some(row) => {
                row.value = write.value;
                row.series_id = write.series_id;
                row.timestamp = write.timestamp;
                Ok(WriteOutcome::Written(row.clone()))
            }
            None => Ok(WriteOutcome::MeasurementMissing),
        }
    }

    async fn delete_measurement(&self, id: i32) -> Result<u64, DatabaseError> {
        Ok(self.lock().measurements.remove(&id).map_or(0, |_| 1))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        if *self.unavailable.lock().unwrap() {
            return Err(DatabaseError::Connection("memory store marked unavailable".into()));
        }
        Ok(())
    }
}
