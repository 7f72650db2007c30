//! Restaurant Table API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::middleware::{CASHIERS, MANAGERS, require_roles};
use crate::state::AppState;

/// Table router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<AppState> {
    // Floor plan: any authenticated staff
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/release", post(handler::release))
        .route_layer(middleware::from_fn(require_roles(MANAGERS)));

    // Settle every open tab on the table at once
    let checkout_routes = Router::new()
        .route("/{id}/close", post(handler::close_tab))
        .route_layer(middleware::from_fn(require_roles(CASHIERS)));

    read_routes.merge(manage_routes).merge(checkout_routes)
}
