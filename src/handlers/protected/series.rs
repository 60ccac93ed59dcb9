use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path, State,
    },
    Json,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::{Series, SeriesInput};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// POST /api/series
pub async fn series_create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<SeriesInput>, JsonRejection>,
) -> ApiResult<Series> {
    let Json(input) = payload?;
    tracing::debug!("User '{}' creating series", auth_user.username);
    let series = state.series.create(input).await?;
    Ok(ApiResponse::created(series))
}

/// PUT /api/series/:id - Replace all fields
pub async fn series_update(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<SeriesInput>, JsonRejection>,
) -> ApiResult<Series> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let series = state.series.update(id, input).await?;
    Ok(ApiResponse::success(series))
}

/// DELETE /api/series/:id - Also removes the series' measurements
pub async fn series_delete(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Value> {
    let Path(id) = id?;
    let deleted = state.series.delete(id).await?;
    Ok(ApiResponse::success(json!({
        "message": "Series deleted",
        "deleted": deleted,
    })))
}
