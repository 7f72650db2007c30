//! Restaurant Order API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::middleware::{CASHIERS, FLOOR_STAFF, KITCHEN_STAFF, require_roles};
use crate::state::AppState;

/// Order router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<AppState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    // Taking orders at the table
    let floor_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}/items", post(handler::add_items))
        .route("/{id}/cancel", post(handler::cancel))
        .route_layer(middleware::from_fn(require_roles(FLOOR_STAFF)));

    // Kitchen progress
    let kitchen_routes = Router::new()
        .route("/{id}/status", patch(handler::update_status))
        .route("/{id}/items/{item_id}/status", patch(handler::update_item_status))
        .route_layer(middleware::from_fn(require_roles(KITCHEN_STAFF)));

    let checkout_routes = Router::new()
        .route("/{id}/close", post(handler::close_tab))
        .route_layer(middleware::from_fn(require_roles(CASHIERS)));

    read_routes
        .merge(floor_routes)
        .merge(kitchen_routes)
        .merge(checkout_routes)
}
