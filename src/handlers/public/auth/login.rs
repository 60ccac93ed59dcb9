use axum::{extract::rejection::JsonRejection, extract::State, Json};

use super::CredentialsRequest;
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::LoginResult;

/// POST /auth/login - Authenticate and receive a bearer token
///
/// Returns `{ "token": "...", "user": { "id": 1, "username": "..." } }`.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<LoginResult> {
    let Json(body) = payload?;
    let result = state.auth.login(body.username, body.password).await?;
    Ok(ApiResponse::success(result))
}
