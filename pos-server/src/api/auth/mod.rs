//! Auth API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::state::AppState;

/// Login and sign-up, each behind its own per-IP limiter
pub fn public_router(state: &AppState) -> Router<AppState> {
    let login = Router::new()
        .route("/api/auth/login", post(handler::login))
        .route_layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    let register = Router::new()
        .route("/api/auth/register", post(handler::register))
        .route_layer(middleware::from_fn_with_state(state.clone(), register_rate_limit));

    login.merge(register)
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/api/auth/me", get(handler::me))
}
