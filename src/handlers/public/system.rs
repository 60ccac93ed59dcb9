use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - Service description
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Measurement API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/auth/login, /auth/register (public), /auth/change-password (protected)",
            "series": "/api/series[/:id] (GET public, writes protected)",
            "measurements": "/api/measurements[/:id] (GET public, writes protected)",
            "health": "/health (public)",
        }
    }))
}

/// GET /health - Liveness plus a database round trip
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    state.store.health_check().await.map_err(|e| {
        tracing::warn!("Health check failed: {}", e);
        ApiError::service_unavailable("Database unavailable")
    })?;

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok"
    })))
}
