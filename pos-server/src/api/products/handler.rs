//! Product API Handlers
//!
//! Reads go through the per-tenant Redis cache; every write drops the
//! tenant's product keys.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{Product, ProductCreate, ProductFilter, ProductUpdate, StockAdjustment};
use shared::pagination::{PageQuery, PaginatedResponse};
use shared::util::{now_millis, sanitize_inline_text, sanitize_optional};

use crate::api::ApiResult;
use crate::api::extract::ValidatedJson;
use crate::auth::CurrentUser;
use crate::cache::{self, PRODUCT_TTL_SECS};
use crate::db;
use crate::error::{conflict_or_internal, internal};
use crate::services::{self, Actor};
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::new(ErrorCode::ProductNotFound)
}

/// Tenant-wide products are readable from every branch
fn readable(user: &CurrentUser, product: &Product) -> bool {
    product.branch_id.is_none_or(|b| user.can_access_branch(b))
}

/// Only owners edit tenant-wide products
fn writable(user: &CurrentUser, product: &Product) -> bool {
    match product.branch_id {
        Some(b) => user.can_access_branch(b),
        None => user.is_owner(),
    }
}

async fn load(state: &AppState, user: &CurrentUser, id: i64) -> Result<Product, AppError> {
    let key = cache::product_key(user.tenant_id, &format!("item:{id}"));
    let product = match state.cache.get_json::<Product>(&key).await {
        Some(product) => product,
        None => {
            let product = db::products::find(&state.pool, user.tenant_id, id)
                .await
                .map_err(internal)?
                .ok_or_else(not_found)?;
            state.cache.set_json(&key, &product, PRODUCT_TTL_SECS).await;
            product
        }
    };
    if readable(user, &product) {
        Ok(product)
    } else {
        Err(not_found())
    }
}

async fn invalidate(state: &AppState, tenant_id: i64) {
    state.cache.invalidate_prefix(&cache::product_prefix(tenant_id)).await;
}

/// GET /api/products
pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Query(page): Query<PageQuery>,
    Query(mut filter): Query<ProductFilter>,
) -> ApiResult<PaginatedResponse<Product>> {
    let user = &actor.user;
    filter.branch_id = user.list_scope(filter.branch_id)?;

    let key = serde_json::to_string(&(&filter, &page))
        .map(|q| cache::product_key(user.tenant_id, &format!("list:{q}")))
        .map_err(internal)?;
    if let Some(cached) = state.cache.get_json::<PaginatedResponse<Product>>(&key).await {
        return Ok(Json(cached));
    }

    let search = db::search_pattern(filter.search.as_deref());
    let (rows, total) = db::products::list(
        &state.pool,
        user.tenant_id,
        filter.branch_id,
        &filter,
        search.as_deref(),
        i64::from(page.limit()),
        page.offset(),
    )
    .await
    .map_err(internal)?;

    let response = PaginatedResponse::from_query(rows, total, &page);
    state.cache.set_json(&key, &response, PRODUCT_TTL_SECS).await;
    Ok(Json(response))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<Product> {
    Ok(Json(load(&state, &actor.user, id).await?))
}

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(mut data): ValidatedJson<ProductCreate>,
) -> ApiResult<Product> {
    let user = &actor.user;
    let branch_id = if user.is_owner() {
        data.branch_id
    } else {
        Some(user.target_branch(data.branch_id)?)
    };
    data.name = sanitize_inline_text(&data.name);
    data.sku = sanitize_optional(data.sku.as_deref());
    data.category = sanitize_optional(data.category.as_deref());

    let now = now_millis();
    let product = db::products::create(&state.pool, user.tenant_id, branch_id, &data, now)
        .await
        .map_err(conflict_or_internal(ErrorCode::ProductSkuExists))?;
    actor
        .audit(
            &state.pool,
            "product.create",
            "product",
            Some(product.id),
            json!({ "name": product.name, "sku": product.sku, "branch_id": product.branch_id }),
            now,
        )
        .await
        .map_err(internal)?;

    invalidate(&state, user.tenant_id).await;
    Ok(Json(product))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidatedJson(mut data): ValidatedJson<ProductUpdate>,
) -> ApiResult<Product> {
    let user = &actor.user;
    let current = load(&state, user, id).await?;
    if !writable(user, &current) {
        return Err(AppError::new(ErrorCode::BranchAccessDenied));
    }
    data.name = data.name.as_deref().map(sanitize_inline_text);
    data.sku = sanitize_optional(data.sku.as_deref());
    data.category = sanitize_optional(data.category.as_deref());

    let now = now_millis();
    let product = db::products::update(&state.pool, user.tenant_id, id, &data, now)
        .await
        .map_err(conflict_or_internal(ErrorCode::ProductSkuExists))?
        .ok_or_else(not_found)?;
    actor
        .audit(&state.pool, "product.update", "product", Some(product.id), json!(data), now)
        .await
        .map_err(internal)?;

    invalidate(&state, user.tenant_id).await;
    Ok(Json(product))
}

/// DELETE /api/products/{id}
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let user = &actor.user;
    let current = load(&state, user, id).await?;
    if !writable(user, &current) {
        return Err(AppError::new(ErrorCode::BranchAccessDenied));
    }

    let now = now_millis();
    let deleted = db::products::soft_delete(&state.pool, user.tenant_id, id, now)
        .await
        .map_err(internal)?;
    if deleted {
        actor
            .audit(&state.pool, "product.delete", "product", Some(id), json!({ "name": current.name }), now)
            .await
            .map_err(internal)?;
    }

    invalidate(&state, user.tenant_id).await;
    Ok(Json(deleted))
}

/// POST /api/products/{id}/stock
pub async fn adjust_stock(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidatedJson(data): ValidatedJson<StockAdjustment>,
) -> ApiResult<Product> {
    let product = services::retail::adjust_stock(&state, &actor, id, &data).await?;
    Ok(Json(product))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{ProductType, Role};

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: 1,
            tenant_id: 1,
            branch_id: Some(1),
            role,
            email: "m@example.com".into(),
        }
    }

    fn product(branch_id: Option<i64>) -> Product {
        Product {
            id: 1,
            tenant_id: 1,
            branch_id,
            name: "Cola".into(),
            sku: None,
            category: None,
            product_type: ProductType::Product,
            price: Decimal::ONE,
            cost: None,
            stock_quantity: 1,
            low_stock_threshold: 0,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_tenant_wide_products_read_everywhere_written_by_owner() {
        let manager = user(Role::Manager);
        assert!(readable(&manager, &product(None)));
        assert!(!writable(&manager, &product(None)));
        assert!(writable(&user(Role::Owner), &product(None)));
    }

    #[test]
    fn test_other_branch_products_hidden() {
        let cashier = user(Role::Cashier);
        assert!(readable(&cashier, &product(Some(1))));
        assert!(!readable(&cashier, &product(Some(2))));
    }
}
