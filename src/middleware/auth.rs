use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::app::AppState;
use crate::auth::Claims;
use crate::error::ApiError;

/// Authenticated principal decoded from the bearer token
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// JWT authentication middleware. A missing or non-Bearer header is 401,
/// a token that fails verification is 403.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;

    let claims = state.auth.verify_token(token).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or("Access token required")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Access token required"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
