//! HTTP API
//!
//! # Structure
//!
//! - [`health`] - liveness and dependency status (public)
//! - [`auth`] - login, sign-up and the caller's profile
//! - [`branches`] - tenant locations (owner)
//! - [`staff`] - staff accounts (owner/manager)
//! - [`products`] - catalog and stock
//! - [`customers`] - customer directory
//! - [`expenses`] - expense ledger (owner/manager)
//! - [`sales`] - retail checkout and sales history
//! - [`tables`] - restaurant tables, table close and release
//! - [`orders`] - restaurant orders and tabs
//! - [`kitchen`] - kitchen display queue
//! - [`rooms`] / [`bookings`] - hospitality
//! - [`audit`] - audit log (owner/manager)

pub mod audit;
pub mod auth;
pub mod bookings;
pub mod branches;
pub mod customers;
pub mod expenses;
pub mod extract;
pub mod health;
pub mod kitchen;
pub mod orders;
pub mod products;
pub mod rooms;
pub mod sales;
pub mod staff;
pub mod tables;

use axum::extract::DefaultBodyLimit;
use axum::{Json, Router, middleware};
use http::HeaderName;
use shared::error::AppError;
use socketioxide::layer::SocketIoLayer;
use tower_http::compression::CompressionLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::auth::middleware::require_auth;
use crate::security::{self, MAX_BODY_BYTES};
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, AppError>;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Every authenticated route, role gates applied per resource
fn protected_router() -> Router<AppState> {
    Router::new()
        .merge(auth::protected_router())
        .merge(branches::router())
        .merge(staff::router())
        .merge(products::router())
        .merge(customers::router())
        .merge(expenses::router())
        .merge(sales::router())
        .merge(tables::router())
        .merge(orders::router())
        .merge(kitchen::router())
        .merge(rooms::router())
        .merge(bookings::router())
        .merge(audit::router())
}

/// Routes without middleware or state
pub fn build_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::public_router(state))
        .merge(
            protected_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_auth)),
        )
}

/// Fully layered application, ready to serve
pub fn build_app(state: AppState, socket_layer: SocketIoLayer, cors_origins: &[String]) -> Router {
    let hsts = state.production;
    build_router(&state)
        .layer(socket_layer)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(security::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(REQUEST_ID))
        .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
        .layer(middleware::from_fn(move |req: axum::extract::Request, next: middleware::Next| {
            security::security_headers(hsts, req, next)
        }))
        .layer(security::cors_layer(cors_origins))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use shared::models::{Role, Staff};
    use tower::ServiceExt;

    const SECRET: &str = "router-test-secret";

    fn app() -> (Router, AppState) {
        let (state, layer) = AppState::for_tests(SECRET).unwrap();
        (build_app(state.clone(), layer, &[]), state)
    }

    fn token(state: &AppState, role: Role) -> String {
        let staff = Staff {
            id: 7,
            tenant_id: 1,
            branch_id: Some(1),
            email: "cashier@example.com".into(),
            full_name: "Cass".into(),
            role,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        };
        state.jwt.issue(&staff).unwrap()
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let (app, _) = app();
        let res = app
            .oneshot(Request::builder().uri("/api/orders").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().contains_key("x-request-id"));
        assert_eq!(res.headers().get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        let body = body_json(res).await;
        assert_eq!(body["code"], 1001);
    }

    #[tokio::test]
    async fn test_malformed_token_is_rejected() {
        let (app, _) = app();
        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/products")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(res).await["code"], 1004);
    }

    #[tokio::test]
    async fn test_role_gate_runs_after_auth() {
        let (app, state) = app();
        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/audit-logs")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token(&state, Role::Waiter)))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(res).await["code"], 2002);
    }

    #[tokio::test]
    async fn test_validation_runs_before_any_query() {
        let (app, state) = app();
        let res = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/orders/1/items")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token(&state, Role::Cashier)))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"items": []}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["code"], 2);
        assert!(body["details"]["items"].is_array());
    }

    #[tokio::test]
    async fn test_health_reports_unreachable_database() {
        let (app, _) = app();
        let res = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["service"], "pos-server");
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["database"], false);
        assert!(body["cache"].is_null());
    }
}
