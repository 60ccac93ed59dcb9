use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// PUT /auth/change-password - Replace the caller's password
pub async fn change_password_put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload?;
    state
        .auth
        .change_password(auth_user.user_id, body.old_password, body.new_password)
        .await?;
    Ok(ApiResponse::success(json!({ "message": "Password changed" })))
}
