//! Product API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::middleware::{MANAGERS, require_roles};
use crate::state::AppState;

/// Product router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<AppState> {
    // Catalog reads: any authenticated staff
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    // Catalog and stock management
    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", axum::routing::put(handler::update).delete(handler::delete))
        .route("/{id}/stock", post(handler::adjust_stock))
        .route_layer(middleware::from_fn(require_roles(MANAGERS)));

    read_routes.merge(manage_routes)
}
