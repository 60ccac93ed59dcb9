use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use super::manager::{Database, DatabaseError};
use super::models::{
    Measurement, MeasurementView, MeasurementWrite, Series, SeriesInput, SeriesRange, User,
    series::DEFAULT_SERIES_COLOR,
};
use super::query_builder::measurement_list_query;
use super::store::{MeasurementStore, SeriesStore, Store, UserStore, WriteOutcome};
use crate::filter::MeasurementFilter;

#[async_trait]
impl UserStore for Database {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(self.pool())
        .await?;
        Ok(user)
    }

    async fn update_password(&self, id: i32, password_hash: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SeriesStore for Database {
    async fn list_series(&self) -> Result<Vec<Series>, DatabaseError> {
        let rows = sqlx::query_as::<_, Series>(
            "SELECT id, name, min_value, max_value, color, icon FROM series ORDER BY name",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn insert_series(&self, input: &SeriesInput) -> Result<Series, DatabaseError> {
        let color = input.color.as_deref().unwrap_or(DEFAULT_SERIES_COLOR);
        let row = sqlx::query_as::<_, Series>(
            r#"
            INSERT INTO series (name, min_value, max_value, color, icon)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, min_value, max_value, color, icon
            "#,
        )
        .bind(&input.name)
        .bind(input.min_value)
        .bind(input.max_value)
        .bind(color)
        .bind(&input.icon)
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    async fn update_series(&self, id: i32, input: &SeriesInput) -> Result<Option<Series>, DatabaseError> {
        let row = sqlx::query_as::<_, Series>(
            r#"
            UPDATE series
            SET name = $1, min_value = $2, max_value = $3, color = $4, icon = $5
            WHERE id = $6
            RETURNING id, name, min_value, max_value, color, icon
            "#,
        )
        .bind(&input.name)
        .bind(input.min_value)
        .bind(input.max_value)
        .bind(&input.color)
        .bind(&input.icon)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    async fn delete_series(&self, id: i32) -> Result<Option<Series>, DatabaseError> {
        let row = sqlx::query_as::<_, Series>(
            "DELETE FROM series WHERE id = $1 RETURNING id, name, min_value, max_value, color, icon",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }
}

/// Load and share-lock the series range so a concurrent range edit waits
/// for this transaction.
async fn locked_range(
    tx: &mut Transaction<'_, Postgres>,
    series_id: i32,
) -> Result<Option<SeriesRange>, DatabaseError> {
    let range = sqlx::query_as::<_, SeriesRange>(
        "SELECT min_value, max_value FROM series WHERE id = $1 FOR SHARE",
    )
    .bind(series_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(range)
}

#[async_trait]
impl MeasurementStore for Database {
    async fn list_measurements(
        &self,
        filter: &MeasurementFilter,
    ) -> Result<Vec<MeasurementView>, DatabaseError> {
        let mut builder = measurement_list_query(filter);
        let rows = builder
            .build_query_as::<MeasurementView>()
            .fetch_all(self.pool())
            .await?;
        Ok(rows)
    }

    async fn insert_measurement(&self, write: MeasurementWrite) -> Result<WriteOutcome, DatabaseError> {
        let mut tx = self.pool().begin().await?;

        let Some(range) = locked_range(&mut tx, write.series_id).await? else {
            return Ok(WriteOutcome::SeriesMissing);
        };
        if !range.contains(write.value) {
            return Ok(WriteOutcome::OutOfRange(range));
        }

        let row = sqlx::query_as::<_, Measurement>(
            r#"
            INSERT INTO measurements (value, series_id, "timestamp")
            VALUES ($1, $2, $3)
            RETURNING id, value, series_id, "timestamp"
            "#,
        )
        .bind(write.value)
        .bind(write.series_id)
        .bind(write.timestamp)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(WriteOutcome::Written(row))
    }

    async fn update_measurement(
        &self,
        id: i32,
        write: MeasurementWrite,
    ) -> Result<WriteOutcome, DatabaseError> {
        let mut tx = self.pool().begin().await?;

        let Some(range) = locked_range(&mut tx, write.series_id).await? else {
            return Ok(WriteOutcome::SeriesMissing);
        };
        if !range.contains(write.value) {
            return Ok(WriteOutcome::OutOfRange(range));
        }

        let row = sqlx::query_as::<_, Measurement>(
            r#"
            UPDATE measurements
            SET value = $1, series_id = $2, "timestamp" = $3
            WHERE id = $4
            RETURNING id, value, series_id, "timestamp"
            "#,
        )
        .bind(write.value)
        .bind(write.series_id)
        .bind(write.timestamp)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        match row {
            Some(row) => {
                tx.commit().await?;
                Ok(WriteOutcome::Written(row))
            }
            None => Ok(WriteOutcome::MeasurementMissing),
        }
    }

    async fn delete_measurement(&self, id: i32) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM measurements WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl Store for Database {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Database::health_check(self).await
    }
}
