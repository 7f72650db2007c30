//! Hotel Booking API Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use shared::models::{Booking, BookingCreate, BookingDetail, BookingFilter, FolioChargeCreate};
use shared::pagination::{PageQuery, PaginatedResponse};

use crate::api::ApiResult;
use crate::api::extract::ValidatedJson;
use crate::db;
use crate::error::internal;
use crate::services::Actor;
use crate::services::bookings::{self, BookingAction};
use crate::state::AppState;

/// GET /api/bookings
pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Query(page): Query<PageQuery>,
    Query(filter): Query<BookingFilter>,
) -> ApiResult<PaginatedResponse<Booking>> {
    let branch_id = actor.user.list_scope(filter.branch_id)?;
    let (rows, total) = db::bookings::list(
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

/// GET /api/bookings/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<BookingDetail> {
    Ok(Json(bookings::get(&state, &actor, id).await?))
}

/// POST /api/bookings
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(data): ValidatedJson<BookingCreate>,
) -> ApiResult<BookingDetail> {
    Ok(Json(bookings::create(&state, &actor, &data).await?))
}

/// POST /api/bookings/{id}/check-in
pub async fn check_in(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<BookingDetail> {
    Ok(Json(bookings::transition(&state, &actor, id, BookingAction::CheckIn).await?))
}

/// POST /api/bookings/{id}/check-out
pub async fn check_out(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<BookingDetail> {
    Ok(Json(bookings::transition(&state, &actor, id, BookingAction::CheckOut).await?))
}

/// POST /api/bookings/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<BookingDetail> {
    Ok(Json(bookings::transition(&state, &actor, id, BookingAction::Cancel).await?))
}

/// POST /api/bookings/{id}/charges
pub async fn add_charge(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidatedJson(data): ValidatedJson<FolioChargeCreate>,
) -> ApiResult<BookingDetail> {
    Ok(Json(bookings::add_charge(&state, &actor, id, &data).await?))
}
