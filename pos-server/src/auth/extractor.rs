//! JWT Extractor
//!
//! Lets handlers take `CurrentUser` directly; reuses the identity inserted by
//! `require_auth` when present.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::{AppError, ErrorCode};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::security_log;
use crate::state::AppState;

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let user = authenticate(&state.jwt, auth_header, &parts.uri)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Validate an Authorization header value into a `CurrentUser`
pub fn authenticate(
    jwt: &JwtService,
    auth_header: Option<&str>,
    uri: &http::Uri,
) -> Result<CurrentUser, AppError> {
    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::with_message(ErrorCode::TokenInvalid, "Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = uri.to_string());
            return Err(AppError::new(ErrorCode::NotAuthenticated));
        }
    };

    match jwt.validate(token) {
        Ok(claims) => Ok(CurrentUser::from(claims)),
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = e.to_string(),
                uri = uri.to_string()
            );
            match e {
                JwtError::ExpiredToken => Err(AppError::new(ErrorCode::TokenExpired)),
                _ => Err(AppError::new(ErrorCode::TokenInvalid)),
            }
        }
    }
}
