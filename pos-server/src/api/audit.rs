//! Audit log API

use axum::extract::{Query, State};
use axum::{Json, Router, middleware, routing::get};
use shared::models::{AuditEntry, AuditFilter};
use shared::pagination::{PageQuery, PaginatedResponse};

use crate::api::ApiResult;
use crate::auth::middleware::{MANAGERS, require_roles};
use crate::db;
use crate::error::internal;
use crate::services::Actor;
use crate::state::AppState;

/// Audit router (owner/manager)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/audit-logs", get(list))
        .route_layer(middleware::from_fn(require_roles(MANAGERS)))
}

/// GET /api/audit-logs
async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Query(page): Query<PageQuery>,
    Query(filter): Query<AuditFilter>,
) -> ApiResult<PaginatedResponse<AuditEntry>> {
    let (entries, total) = db::audit::query(
        &state.pool,
        actor.user.tenant_id,
        &filter,
        i64::from(page.limit()),
        page.offset(),
    )
    .await
    .map_err(internal)?;
    Ok(Json(PaginatedResponse::from_query(entries, total, &page)))
}
