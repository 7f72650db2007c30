//! Restaurant Table API Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    CloseTabRequest, CloseTabResult, RestaurantTable, TableCreate, TableFilter, TableStatus,
    TableUpdate,
};
use shared::util::{now_millis, sanitize_inline_text};
use sqlx::PgConnection;

use crate::api::ApiResult;
use crate::api::extract::ValidatedJson;
use crate::auth::CurrentUser;
use crate::db;
use crate::error::{conflict_or_internal, internal};
use crate::services::tab::{self, CloseTarget};
use crate::services::Actor;
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::new(ErrorCode::TableNotFound)
}

async fn load(state: &AppState, user: &CurrentUser, id: i64) -> Result<RestaurantTable, AppError> {
    db::tables::find(&state.pool, user.tenant_id, id)
        .await
        .map_err(internal)?
        .filter(|t| user.can_access_branch(t.branch_id))
        .ok_or_else(not_found)
}

/// `SELECT ... FOR UPDATE` scoped to the caller's branches
async fn lock(conn: &mut PgConnection, user: &CurrentUser, id: i64) -> Result<RestaurantTable, AppError> {
    db::tables::find_for_update(conn, user.tenant_id, id)
        .await
        .map_err(internal)?
        .filter(|t| user.can_access_branch(t.branch_id))
        .ok_or_else(not_found)
}

fn ensure_no_open_tabs(table: &RestaurantTable, open: i64) -> Result<(), AppError> {
    if open > 0 {
        return Err(AppError::still_referenced(ErrorCode::TableHasOpenOrders, "open_tabs", open)
            .with_detail("table_id", table.id));
    }
    Ok(())
}

/// Occupancy follows tabs; staff may only toggle between available and reserved
fn check_status_change(current: &RestaurantTable, requested: Option<TableStatus>) -> Result<(), AppError> {
    match requested {
        None => Ok(()),
        Some(TableStatus::Occupied) => Err(AppError::validation(
            "Tables become occupied by opening a tab",
        )),
        Some(_) if current.status == TableStatus::Occupied => Err(AppError::with_message(
            ErrorCode::TableOccupied,
            "Table has an open tab",
        )),
        Some(_) => Ok(()),
    }
}

/// GET /api/tables
pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Query(filter): Query<TableFilter>,
) -> ApiResult<Vec<RestaurantTable>> {
    let branch_id = actor.user.list_scope(filter.branch_id)?;
    let tables = db::tables::list(&state.pool, actor.user.tenant_id, branch_id, &filter)
        .await
        .map_err(internal)?;
    Ok(Json(tables))
}

/// GET /api/tables/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<RestaurantTable> {
    Ok(Json(load(&state, &actor.user, id).await?))
}

/// POST /api/tables
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(mut data): ValidatedJson<TableCreate>,
) -> ApiResult<RestaurantTable> {
    let user = &actor.user;
    let branch_id = user.target_branch(data.branch_id)?;
    db::branches::find(&state.pool, user.tenant_id, branch_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::BranchNotFound))?;
    data.name = sanitize_inline_text(&data.name);

    let now = now_millis();
    let table = db::tables::create(&state.pool, user.tenant_id, branch_id, &data, now)
        .await
        .map_err(conflict_or_internal(ErrorCode::TableNameExists))?;
    actor
        .audit(
            &state.pool,
            "table.create",
            "table",
            Some(table.id),
            json!({ "name": table.name, "branch_id": branch_id }),
            now,
        )
        .await
        .map_err(internal)?;
    Ok(Json(table))
}

/// PUT /api/tables/{id}
///
/// The row stays locked from the status check to the write so a tab
/// opening concurrently cannot slip in between.
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidatedJson(mut data): ValidatedJson<TableUpdate>,
) -> ApiResult<RestaurantTable> {
    let user = &actor.user;
    data.name = data.name.as_deref().map(sanitize_inline_text);
    let now = now_millis();
    let mut tx = state.pool.begin().await.map_err(internal)?;

    let current = lock(&mut tx, user, id).await?;
    check_status_change(&current, data.status)?;
    let table = db::tables::update(&mut tx, user.tenant_id, id, &data, now)
        .await
        .map_err(conflict_or_internal(ErrorCode::TableNameExists))?
        .ok_or_else(not_found)?;
    actor
        .audit(&mut *tx, "table.update", "table", Some(id), json!(data), now)
        .await
        .map_err(internal)?;
    tx.commit().await.map_err(internal)?;
    Ok(Json(table))
}

/// DELETE /api/tables/{id}
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let user = &actor.user;
    let now = now_millis();
    let mut tx = state.pool.begin().await.map_err(internal)?;

    let table = lock(&mut tx, user, id).await?;
    let open = db::orders::count_open_on_table(&mut *tx, table.id)
        .await
        .map_err(internal)?;
    ensure_no_open_tabs(&table, open)?;

    let deleted = db::tables::soft_delete(&mut tx, user.tenant_id, id, now)
        .await
        .map_err(internal)?;
    if deleted {
        actor
            .audit(&mut *tx, "table.delete", "table", Some(id), json!({ "name": table.name }), now)
            .await
            .map_err(internal)?;
    }
    tx.commit().await.map_err(internal)?;
    Ok(Json(deleted))
}

/// POST /api/tables/{id}/release
///
/// Manual reset for a table left occupied without an open tab.
pub async fn release(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<RestaurantTable> {
    let user = &actor.user;
    let now = now_millis();
    let mut tx = state.pool.begin().await.map_err(internal)?;

    let table = lock(&mut tx, user, id).await?;
    let open = db::orders::count_open_on_table(&mut *tx, table.id)
        .await
        .map_err(internal)?;
    ensure_no_open_tabs(&table, open)?;

    let freed = db::tables::free(&mut tx, table.id, now).await.map_err(internal)?;
    actor
        .audit(
            &mut *tx,
            "table.release",
            "table",
            Some(id),
            json!({ "previous_status": table.status, "assigned_cashier_id": table.assigned_cashier_id }),
            now,
        )
        .await
        .map_err(internal)?;
    tx.commit().await.map_err(internal)?;

    tracing::info!(table_id = id, user_id = user.id, "Table released manually");
    Ok(Json(freed))
}

/// POST /api/tables/{id}/close
pub async fn close_tab(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidatedJson(data): ValidatedJson<CloseTabRequest>,
) -> ApiResult<CloseTabResult> {
    let result = tab::close(&state, &actor, CloseTarget::Table(id), &data).await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(status: TableStatus) -> RestaurantTable {
        RestaurantTable {
            id: 1,
            tenant_id: 1,
            branch_id: 1,
            name: "T1".into(),
            capacity: 4,
            status,
            assigned_cashier_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_occupied_is_not_manual() {
        let err = check_status_change(&table(TableStatus::Available), Some(TableStatus::Occupied))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_occupied_table_keeps_status() {
        let err = check_status_change(&table(TableStatus::Occupied), Some(TableStatus::Reserved))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TableOccupied);
        assert!(check_status_change(&table(TableStatus::Occupied), None).is_ok());
        assert!(check_status_change(&table(TableStatus::Available), Some(TableStatus::Reserved)).is_ok());
    }

    #[test]
    fn test_open_tabs_block_delete_and_release() {
        let t = table(TableStatus::Occupied);
        let err = ensure_no_open_tabs(&t, 2).unwrap_err();
        assert_eq!(err.code, ErrorCode::TableHasOpenOrders);
        assert_eq!(err.message, "Table has open tabs: 2");
        let details = err.details.unwrap();
        assert_eq!(details["open_tabs"], 2);
        assert_eq!(details["table_id"], 1);

        assert!(ensure_no_open_tabs(&table(TableStatus::Available), 0).is_ok());
    }
}
