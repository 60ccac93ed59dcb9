use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

use crate::app::AppState;
use crate::database::models::Measurement;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::MeasurementInput;

/// POST /api/measurements - `timestamp` is optional and defaults to now
pub async fn measurement_create(
    State(state): State<AppState>,
    payload: Result<Json<MeasurementInput>, JsonRejection>,
) -> ApiResult<Measurement> {
    let Json(input) = payload?;
    let row = state.measurements.create(input).await?;
    Ok(ApiResponse::created(row))
}

/// PUT /api/measurements/:id - `value`, `series_id` and `timestamp` all required
pub async fn measurement_update(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<MeasurementInput>, JsonRejection>,
) -> ApiResult<Measurement> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let row = state.measurements.update(id, input).await?;
    Ok(ApiResponse::success(row))
}

/// DELETE /api/measurements/:id - 204 whether or not the row existed
pub async fn measurement_delete(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    state.measurements.delete(id).await?;
    Ok(ApiResponse::no_content())
}
