//! Health check endpoint

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// GET /health
///
/// Always 200; `status` is `degraded` when Postgres does not answer.
/// `cache` is `null` when Redis is not configured.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Health check: database unreachable"))
        .is_ok();
    let cache = state.cache.ping().await;

    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "service": "pos-server",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "cache": cache,
    }))
}
