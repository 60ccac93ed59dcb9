use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};

use super::CredentialsRequest;
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /auth/register - Create a user account
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload?;
    state.auth.register(body.username, body.password).await?;
    Ok(ApiResponse::created(json!({
        "message": "User created. You can log in now."
    })))
}
