use axum::extract::State;

use crate::app::AppState;
use crate::database::models::Series;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/series - All series ordered by name
pub async fn series_list(State(state): State<AppState>) -> ApiResult<Vec<Series>> {
    let series = state.series.list().await?;
    Ok(ApiResponse::success(series))
}
