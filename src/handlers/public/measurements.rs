use axum::extract::{rejection::QueryRejection, Query, State};

use crate::app::AppState;
use crate::database::models::MeasurementView;
use crate::filter::{MeasurementFilter, MeasurementQuery};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/measurements?series_id=1,2&start=..&end=..
///
/// Newest first, each row carrying its series name and color.
pub async fn measurements_list(
    State(state): State<AppState>,
    query: Result<Query<MeasurementQuery>, QueryRejection>,
) -> ApiResult<Vec<MeasurementView>> {
    let Query(query) = query?;
    let filter = MeasurementFilter::try_from(query)?;
    let rows = state.measurements.list(&filter).await?;
    Ok(ApiResponse::success(rows))
}
