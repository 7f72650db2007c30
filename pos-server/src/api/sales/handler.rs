//! Sales API Handlers
//!
//! Sales are immutable once written. Restaurant sales come from closing a tab;
//! this module only records direct retail checkouts.

use axum::Json;
use axum::extract::{Path, Query, State};
use shared::error::{AppError, ErrorCode};
use shared::models::{RetailSaleCreate, Sale, SaleDetail, SaleFilter};
use shared::pagination::{PageQuery, PaginatedResponse};

use crate::api::ApiResult;
use crate::api::extract::ValidatedJson;
use crate::db;
use crate::error::internal;
use crate::services::{self, Actor};
use crate::state::AppState;

/// GET /api/sales
pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Query(page): Query<PageQuery>,
    Query(filter): Query<SaleFilter>,
) -> ApiResult<PaginatedResponse<Sale>> {
    let branch_id = actor.user.list_scope(filter.branch_id)?;
    let (rows, total) = db::sales::list(
        &state.pool,
        actor.user.tenant_id,
        branch_id,
        &filter,
        i64::from(page.limit()),
        page.offset(),
    )
    .await
    .map_err(internal)?;
    Ok(Json(PaginatedResponse::from_query(rows, total, &page)))
}

/// GET /api/sales/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<SaleDetail> {
    let sale = db::sales::find(&state.pool, actor.user.tenant_id, id)
        .await
        .map_err(internal)?
        .filter(|s| actor.user.can_access_branch(s.branch_id))
        .ok_or_else(|| AppError::new(ErrorCode::SaleNotFound))?;
    let items = db::sales::items(&state.pool, sale.id).await.map_err(internal)?;
    Ok(Json(SaleDetail { sale, items }))
}

/// POST /api/sales
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(data): ValidatedJson<RetailSaleCreate>,
) -> ApiResult<SaleDetail> {
    let detail = services::retail::create_sale(&state, &actor, &data).await?;
    Ok(Json(detail))
}
