//! Health check endpoint.

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::app::AppState;

/// Liveness/readiness probe.
///
/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
    {
        Ok(_) => "up",
        Err(err) => {
            tracing::warn!("Health check database probe failed: {}", err);
            "down"
        }
    };

    Json(json!({
        "status": if database == "up" { "healthy" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    }))
}
