//! Hotel Booking API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::middleware::{CASHIERS, require_roles};
use crate::state::AppState;

/// Booking router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/bookings", routes())
}

fn routes() -> Router<AppState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    // Front desk
    let desk_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}/check-in", post(handler::check_in))
        .route("/{id}/check-out", post(handler::check_out))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/charges", post(handler::add_charge))
        .route_layer(middleware::from_fn(require_roles(CASHIERS)));

    read_routes.merge(desk_routes)
}
