//! Kitchen display API
//!
//! The queue snapshot a display loads before following the Socket.IO feed.

use axum::extract::{Query, State};
use axum::{Json, Router, middleware, routing::get};
use serde::{Deserialize, Serialize};
use shared::models::OrderDetail;

use crate::api::ApiResult;
use crate::auth::middleware::{KITCHEN_STAFF, require_roles};
use crate::db;
use crate::error::internal;
use crate::services::{self, Actor};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct KitchenQuery {
    pub branch_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct KitchenStatus {
    pub connected_clients: usize,
}

/// Kitchen router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/kitchen/orders", get(queue))
        .route("/api/kitchen/status", get(status))
        .route_layer(middleware::from_fn(require_roles(KITCHEN_STAFF)))
}

/// GET /api/kitchen/orders
async fn queue(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<KitchenQuery>,
) -> ApiResult<Vec<OrderDetail>> {
    let branch_id = actor.user.list_scope(query.branch_id)?;
    let orders = db::orders::kitchen_queue(&state.pool, actor.user.tenant_id, branch_id)
        .await
        .map_err(internal)?;
    let details = services::order_details(&state.pool, orders)
        .await
        .map_err(internal)?;
    Ok(Json(details))
}

/// GET /api/kitchen/status
async fn status(State(state): State<AppState>, actor: Actor) -> ApiResult<KitchenStatus> {
    Ok(Json(KitchenStatus {
        connected_clients: state.kitchen.connected(actor.user.tenant_id),
    }))
}
