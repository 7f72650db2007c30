//! Hotel Room API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::middleware::{MANAGERS, require_roles};
use crate::state::AppState;

/// Room router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/rooms", routes())
}

fn routes() -> Router<AppState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route_layer(middleware::from_fn(require_roles(MANAGERS)));

    read_routes.merge(manage_routes)
}
