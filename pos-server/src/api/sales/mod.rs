//! Sales API Module

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::middleware::{CASHIERS, require_roles};
use crate::state::AppState;

/// Sales router (owner/manager/cashier)
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/sales", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route_layer(middleware::from_fn(require_roles(CASHIERS)))
}
