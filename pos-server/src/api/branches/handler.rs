//! Branch API Handlers

use axum::Json;
use axum::extract::{Path, State};
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{Branch, BranchCreate, BranchUpdate};
use shared::util::{now_millis, sanitize_inline_text, sanitize_optional};

use crate::api::ApiResult;
use crate::api::extract::ValidatedJson;
use crate::cache::{self, BRANCH_TTL_SECS};
use crate::db;
use crate::error::{conflict_or_internal, internal};
use crate::services::Actor;
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::new(ErrorCode::BranchNotFound)
}

async fn invalidate(state: &AppState, tenant_id: i64) {
    state.cache.invalidate(&cache::branches_key(tenant_id)).await;
}

/// GET /api/branches
pub async fn list(State(state): State<AppState>, actor: Actor) -> ApiResult<Vec<Branch>> {
    let key = cache::branches_key(actor.user.tenant_id);
    if let Some(cached) = state.cache.get_json::<Vec<Branch>>(&key).await {
        return Ok(Json(cached));
    }
    let branches = db::branches::list(&state.pool, actor.user.tenant_id)
        .await
        .map_err(internal)?;
    state.cache.set_json(&key, &branches, BRANCH_TTL_SECS).await;
    Ok(Json(branches))
}

/// GET /api/branches/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<Branch> {
    let branch = db::branches::find(&state.pool, actor.user.tenant_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(not_found)?;
    Ok(Json(branch))
}

/// POST /api/branches
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(mut data): ValidatedJson<BranchCreate>,
) -> ApiResult<Branch> {
    data.name = sanitize_inline_text(&data.name);
    data.address = sanitize_optional(data.address.as_deref());
    data.phone = sanitize_optional(data.phone.as_deref());

    let now = now_millis();
    let branch = db::branches::create(&state.pool, actor.user.tenant_id, &data, now)
        .await
        .map_err(conflict_or_internal(ErrorCode::BranchNameExists))?;
    actor
        .audit(&state.pool, "branch.create", "branch", Some(branch.id), json!({ "name": branch.name }), now)
        .await
        .map_err(internal)?;
    invalidate(&state, actor.user.tenant_id).await;
    Ok(Json(branch))
}

/// PUT /api/branches/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidatedJson(mut data): ValidatedJson<BranchUpdate>,
) -> ApiResult<Branch> {
    data.name = data.name.as_deref().map(sanitize_inline_text);
    data.address = sanitize_optional(data.address.as_deref());
    data.phone = sanitize_optional(data.phone.as_deref());

    let now = now_millis();
    let branch = db::branches::update(&state.pool, actor.user.tenant_id, id, &data, now)
        .await
        .map_err(conflict_or_internal(ErrorCode::BranchNameExists))?
        .ok_or_else(not_found)?;
    actor
        .audit(&state.pool, "branch.update", "branch", Some(branch.id), json!(data), now)
        .await
        .map_err(internal)?;
    invalidate(&state, actor.user.tenant_id).await;
    Ok(Json(branch))
}

/// DELETE /api/branches/{id}
///
/// Refused while live staff accounts are still assigned to the branch.
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let tenant_id = actor.user.tenant_id;
    db::branches::find(&state.pool, tenant_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(not_found)?;

    let staff = db::branches::count_staff(&state.pool, tenant_id, id)
        .await
        .map_err(internal)?;
    if staff > 0 {
        return Err(AppError::still_referenced(ErrorCode::BranchHasStaff, "staff", staff));
    }

    let now = now_millis();
    let deleted = db::branches::soft_delete(&state.pool, tenant_id, id, now)
        .await
        .map_err(internal)?;
    if deleted {
        actor
            .audit(&state.pool, "branch.delete", "branch", Some(id), json!({}), now)
            .await
            .map_err(internal)?;
        invalidate(&state, tenant_id).await;
    }
    Ok(Json(deleted))
}
