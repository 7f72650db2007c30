//! Customer API Handlers
//!
//! Customers are tenant-wide: every branch sees the same directory.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};
use shared::pagination::{PageQuery, PaginatedResponse};
use shared::util::{now_millis, sanitize_inline_text, sanitize_multiline_text, sanitize_optional};

use crate::api::ApiResult;
use crate::api::extract::ValidatedJson;
use crate::db;
use crate::error::internal;
use crate::services::Actor;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    pub search: Option<String>,
}

fn not_found() -> AppError {
    AppError::new(ErrorCode::CustomerNotFound)
}

fn normalize_email(email: Option<&str>) -> Option<String> {
    sanitize_optional(email).map(|e| e.to_lowercase())
}

/// GET /api/customers
pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Query(page): Query<PageQuery>,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<PaginatedResponse<Customer>> {
    let search = db::search_pattern(query.search.as_deref());
    let (rows, total) = db::customers::list(
        &state.pool,
        actor.user.tenant_id,
        search.as_deref(),
        i64::from(page.limit()),
        page.offset(),
    )
    .await
    .map_err(internal)?;
    Ok(Json(PaginatedResponse::from_query(rows, total, &page)))
}

/// GET /api/customers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<Customer> {
    let customer = db::customers::find(&state.pool, actor.user.tenant_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(not_found)?;
    Ok(Json(customer))
}

/// POST /api/customers
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(mut data): ValidatedJson<CustomerCreate>,
) -> ApiResult<Customer> {
    data.name = sanitize_inline_text(&data.name);
    data.email = normalize_email(data.email.as_deref());
    data.phone = sanitize_optional(data.phone.as_deref());
    data.notes = data.notes.as_deref().map(sanitize_multiline_text);

    let now = now_millis();
    let customer = db::customers::create(&state.pool, actor.user.tenant_id, &data, now)
        .await
        .map_err(internal)?;
    actor
        .audit(&state.pool, "customer.create", "customer", Some(customer.id), json!({ "name": customer.name }), now)
        .await
        .map_err(internal)?;
    Ok(Json(customer))
}

/// PUT /api/customers/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidatedJson(mut data): ValidatedJson<CustomerUpdate>,
) -> ApiResult<Customer> {
    data.name = data.name.as_deref().map(sanitize_inline_text);
    data.email = normalize_email(data.email.as_deref());
    data.phone = sanitize_optional(data.phone.as_deref());
    data.notes = data.notes.as_deref().map(sanitize_multiline_text);

    let now = now_millis();
    let customer = db::customers::update(&state.pool, actor.user.tenant_id, id, &data, now)
        .await
        .map_err(internal)?
        .ok_or_else(not_found)?;
    actor
        .audit(&state.pool, "customer.update", "customer", Some(customer.id), json!(data), now)
        .await
        .map_err(internal)?;
    Ok(Json(customer))
}

/// DELETE /api/customers/{id}
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let now = now_millis();
    let deleted = db::customers::soft_delete(&state.pool, actor.user.tenant_id, id, now)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err(not_found());
    }
    actor
        .audit(&state.pool, "customer.delete", "customer", Some(id), json!({}), now)
        .await
        .map_err(internal)?;
    Ok(Json(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalized() {
        assert_eq!(
            normalize_email(Some("  Ana@Example.COM ")).as_deref(),
            Some("ana@example.com")
        );
        assert_eq!(normalize_email(Some("   ")), None);
        assert_eq!(normalize_email(None), None);
    }
}
