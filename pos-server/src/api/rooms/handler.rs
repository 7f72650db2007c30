//! Hotel Room API Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{Room, RoomCreate, RoomUpdate};
use shared::util::{now_millis, sanitize_inline_text, sanitize_optional};

use crate::api::ApiResult;
use crate::api::extract::ValidatedJson;
use crate::auth::CurrentUser;
use crate::db;
use crate::error::{conflict_or_internal, internal};
use crate::services::Actor;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RoomQuery {
    pub branch_id: Option<i64>,
}

fn not_found() -> AppError {
    AppError::new(ErrorCode::RoomNotFound)
}

async fn load(state: &AppState, user: &CurrentUser, id: i64) -> Result<Room, AppError> {
    db::rooms::find(&state.pool, user.tenant_id, id)
        .await
        .map_err(internal)?
        .filter(|r| user.can_access_branch(r.branch_id))
        .ok_or_else(not_found)
}

/// GET /api/rooms
pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<RoomQuery>,
) -> ApiResult<Vec<Room>> {
    let branch_id = actor.user.list_scope(query.branch_id)?;
    let rooms = db::rooms::list(&state.pool, actor.user.tenant_id, branch_id)
        .await
        .map_err(internal)?;
    Ok(Json(rooms))
}

/// GET /api/rooms/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<Room> {
    Ok(Json(load(&state, &actor.user, id).await?))
}

/// POST /api/rooms
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(mut data): ValidatedJson<RoomCreate>,
) -> ApiResult<Room> {
    let user = &actor.user;
    let branch_id = user.target_branch(data.branch_id)?;
    db::branches::find(&state.pool, user.tenant_id, branch_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::BranchNotFound))?;
    data.room_number = sanitize_inline_text(&data.room_number);
    data.room_type = sanitize_optional(data.room_type.as_deref());

    let now = now_millis();
    let room = db::rooms::create(&state.pool, user.tenant_id, branch_id, &data, now)
        .await
        .map_err(conflict_or_internal(ErrorCode::RoomNumberExists))?;
    actor
        .audit(
            &state.pool,
            "room.create",
            "room",
            Some(room.id),
            json!({ "room_number": room.room_number, "nightly_rate": room.nightly_rate }),
            now,
        )
        .await
        .map_err(internal)?;
    Ok(Json(room))
}

/// PUT /api/rooms/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidatedJson(mut data): ValidatedJson<RoomUpdate>,
) -> ApiResult<Room> {
    let user = &actor.user;
    load(&state, user, id).await?;
    data.room_number = data.room_number.as_deref().map(sanitize_inline_text);
    data.room_type = sanitize_optional(data.room_type.as_deref());

    let now = now_millis();
    let room = db::rooms::update(&state.pool, user.tenant_id, id, &data, now)
        .await
        .map_err(conflict_or_internal(ErrorCode::RoomNumberExists))?
        .ok_or_else(not_found)?;
    actor
        .audit(&state.pool, "room.update", "room", Some(id), json!(data), now)
        .await
        .map_err(internal)?;
    Ok(Json(room))
}

/// DELETE /api/rooms/{id}
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let user = &actor.user;
    let room = load(&state, user, id).await?;

    let now = now_millis();
    let deleted = db::rooms::soft_delete(&state.pool, user.tenant_id, id, now)
        .await
        .map_err(internal)?;
    if deleted {
        actor
            .audit(&state.pool, "room.delete", "room", Some(id), json!({ "room_number": room.room_number }), now)
            .await
            .map_err(internal)?;
    }
    Ok(Json(deleted))
}
