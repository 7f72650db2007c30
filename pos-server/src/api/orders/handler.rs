//! Restaurant Order API Handlers
//!
//! Thin wrappers: the lifecycle rules live in `services::orders` and
//! `services::tab`.

use axum::Json;
use axum::extract::{Path, Query, State};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AddItemsRequest, CloseTabRequest, CloseTabResult, ItemStatusUpdate, OrderCreate, OrderDetail,
    OrderFilter, OrderStatusUpdate, RestaurantOrder,
};
use shared::pagination::{PageQuery, PaginatedResponse};

use crate::api::ApiResult;
use crate::api::extract::ValidatedJson;
use crate::db;
use crate::error::internal;
use crate::services::tab::{self, CloseTarget};
use crate::services::{self, Actor, orders};
use crate::state::AppState;

/// GET /api/orders
pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Query(page): Query<PageQuery>,
    Query(filter): Query<OrderFilter>,
) -> ApiResult<PaginatedResponse<RestaurantOrder>> {
    let branch_id = actor.user.list_scope(filter.branch_id)?;
    let (rows, total) = db::orders::list(
        &state.pool,
        actor.user.tenant_id,
        branch_id,
        &filter,
        i64::from(page.limit()),
        page.offset(),
    )
    .await
    .map_err(internal)?;
    Ok(Json(PaginatedResponse::from_query(rows, total, &page)))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<OrderDetail> {
    let order = db::orders::find(&state.pool, actor.user.tenant_id, id)
        .await
        .map_err(internal)?
        .filter(|o| actor.user.can_access_branch(o.branch_id))
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    let detail = services::order_detail(&state.pool, order).await.map_err(internal)?;
    Ok(Json(detail))
}

/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(data): ValidatedJson<OrderCreate>,
) -> ApiResult<OrderDetail> {
    Ok(Json(orders::open(&state, &actor, &data).await?))
}

/// POST /api/orders/{id}/items
pub async fn add_items(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidatedJson(data): ValidatedJson<AddItemsRequest>,
) -> ApiResult<OrderDetail> {
    Ok(Json(orders::add_items(&state, &actor, id, &data).await?))
}

/// POST /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<OrderDetail> {
    Ok(Json(orders::cancel(&state, &actor, id).await?))
}

/// PATCH /api/orders/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidatedJson(data): ValidatedJson<OrderStatusUpdate>,
) -> ApiResult<OrderDetail> {
    Ok(Json(orders::update_status(&state, &actor, id, data.status).await?))
}

/// PATCH /api/orders/{id}/items/{item_id}/status
pub async fn update_item_status(
    State(state): State<AppState>,
    actor: Actor,
    Path((id, item_id)): Path<(i64, i64)>,
    ValidatedJson(data): ValidatedJson<ItemStatusUpdate>,
) -> ApiResult<OrderDetail> {
    Ok(Json(
        orders::update_item_status(&state, &actor, id, item_id, data.status).await?,
    ))
}

/// POST /api/orders/{id}/close
pub async fn close_tab(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidatedJson(data): ValidatedJson<CloseTabRequest>,
) -> ApiResult<CloseTabResult> {
    let result = tab::close(&state, &actor, CloseTarget::Order(id), &data).await?;
    Ok(Json(result))
}
