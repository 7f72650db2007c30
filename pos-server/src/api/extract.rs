//! Request extractors shared by handlers

use std::collections::HashMap;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::auth::CurrentUser;
use crate::auth::rate_limit::extract_ip;
use crate::services::Actor;
use crate::state::AppState;

/// JSON body that has passed its `validator` rules
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        value.validate().map_err(validation_error)?;
        Ok(ValidatedJson(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(e) => AppError::with_message(ErrorCode::ValidationFailed, e.body_text()),
        JsonRejection::MissingJsonContentType(_) => {
            AppError::with_message(ErrorCode::InvalidRequest, "Expected Content-Type: application/json")
        }
        other => AppError::with_message(ErrorCode::InvalidFormat, other.body_text()),
    }
}

/// Flatten nested `validator` errors into `field.path -> [codes]`
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut fields: HashMap<String, Vec<String>> = HashMap::new();
    collect(&errors, String::new(), &mut fields);

    let mut err = AppError::with_message(ErrorCode::ValidationFailed, "Request validation failed");
    let mut keys: Vec<_> = fields.into_iter().collect();
    keys.sort_by(|a, b| a.0.cmp(&b.0));
    for (field, codes) in keys {
        err = err.with_detail(field, Value::from(codes));
    }
    err
}

fn collect(errors: &ValidationErrors, prefix: String, out: &mut HashMap<String, Vec<String>>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.entry(path)
                    .or_default()
                    .extend(list.iter().map(|e| e.code.to_string()));
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

/// Client address as seen through the proxy chain
pub struct ClientIp(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(extract_ip(&parts.headers, &parts.extensions)))
    }
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        let ip = extract_ip(&parts.headers, &parts.extensions);
        Ok(Actor { user, ip })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{AddItemsRequest, OrderItemInput};

    #[test]
    fn test_nested_validation_paths() {
        let req = AddItemsRequest {
            items: vec![OrderItemInput {
                product_id: 1,
                quantity: 0,
                modifiers: vec![],
                notes: None,
            }],
        };
        let err = validation_error(req.validate().unwrap_err());
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details["items[0].quantity"], serde_json::json!(["range"]));
    }

    #[test]
    fn test_empty_list_is_a_field_error() {
        let err = validation_error(AddItemsRequest { items: vec![] }.validate().unwrap_err());
        assert_eq!(err.details.unwrap()["items"], serde_json::json!(["length"]));
    }
}
