//! Authentication middleware and role gates

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use shared::models::Role;

use crate::auth::CurrentUser;
use crate::auth::extractor::authenticate;
use crate::security_log;
use crate::state::AppState;

/// Require a valid bearer token; injects [`CurrentUser`] into request extensions.
///
/// `OPTIONS` preflight requests pass through untouched.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let user = authenticate(&state.jwt, auth_header, req.uri())?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Role gate: the request passes if the user's role is in `roles`.
///
/// # Usage
///
/// ```ignore
/// Router::new()
///     .route("/api/expenses", get(list))
///     .layer(middleware::from_fn(require_roles(MANAGERS)));
/// ```
pub fn require_roles(
    roles: &'static [Role],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(|| AppError::new(ErrorCode::NotAuthenticated))?;

            if !roles.contains(&user.role) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id,
                    user_role = user.role.as_str(),
                    uri = req.uri().to_string()
                );
                return Err(AppError::with_message(
                    ErrorCode::RoleRequired,
                    format!("Requires one of: {}", role_list(roles)),
                ));
            }

            Ok(next.run(req).await)
        })
    }
}

fn role_list(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Owner only
pub const OWNERS: &[Role] = &[Role::Owner];
/// Owner or manager
pub const MANAGERS: &[Role] = &[Role::Owner, Role::Manager];
/// Staff who take payment
pub const CASHIERS: &[Role] = &[Role::Owner, Role::Manager, Role::Cashier];
/// Staff who open tabs and add items
pub const FLOOR_STAFF: &[Role] = &[Role::Owner, Role::Manager, Role::Cashier, Role::Waiter];
/// Everyone who may move kitchen statuses
pub const KITCHEN_STAFF: &[Role] = &[
    Role::Owner,
    Role::Manager,
    Role::Cashier,
    Role::Waiter,
    Role::Kitchen,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_sets() {
        assert!(MANAGERS.contains(&Role::Manager));
        assert!(!MANAGERS.contains(&Role::Cashier));
        assert!(CASHIERS.contains(&Role::Cashier));
        assert!(!CASHIERS.contains(&Role::Waiter));
        assert!(FLOOR_STAFF.contains(&Role::Waiter));
        assert!(!FLOOR_STAFF.contains(&Role::Kitchen));
        assert!(KITCHEN_STAFF.contains(&Role::Kitchen));
    }

    #[test]
    fn test_role_list() {
        assert_eq!(role_list(MANAGERS), "owner, manager");
    }
}
