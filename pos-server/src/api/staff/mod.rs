//! Staff API Module

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::middleware::{MANAGERS, require_roles};
use crate::state::AppState;

/// Staff router (owner/manager)
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/staff", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route_layer(middleware::from_fn(require_roles(MANAGERS)))
}
