//! Customer API Module

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::middleware::{MANAGERS, require_roles};
use crate::state::AppState;

/// Customer router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/customers", routes())
}

fn routes() -> Router<AppState> {
    // Front-of-house staff look up and register customers
    let staff_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).put(handler::update));

    let manage_routes = Router::new()
        .route("/{id}", axum::routing::delete(handler::delete))
        .route_layer(middleware::from_fn(require_roles(MANAGERS)));

    staff_routes.merge(manage_routes)
}
