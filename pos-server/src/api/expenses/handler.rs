//! Expense API Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{Expense, ExpenseCreate, ExpenseFilter, ExpenseUpdate};
use shared::pagination::{PageQuery, PaginatedResponse};
use shared::util::{now_millis, sanitize_inline_text, sanitize_optional};

use crate::api::ApiResult;
use crate::api::extract::ValidatedJson;
use crate::auth::CurrentUser;
use crate::db;
use crate::db::expenses::NewExpense;
use crate::error::internal;
use crate::services::Actor;
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::new(ErrorCode::ExpenseNotFound)
}

async fn load(state: &AppState, user: &CurrentUser, id: i64) -> Result<Expense, AppError> {
    db::expenses::find(&state.pool, user.tenant_id, id)
        .await
        .map_err(internal)?
        .filter(|e| user.can_access_branch(e.branch_id))
        .ok_or_else(not_found)
}

/// GET /api/expenses
pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Query(page): Query<PageQuery>,
    Query(filter): Query<ExpenseFilter>,
) -> ApiResult<PaginatedResponse<Expense>> {
    let branch_id = actor.user.list_scope(filter.branch_id)?;
    let (rows, total) = db::expenses::list(
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

/// GET /api/expenses/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<Expense> {
    Ok(Json(load(&state, &actor.user, id).await?))
}

/// POST /api/expenses
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(data): ValidatedJson<ExpenseCreate>,
) -> ApiResult<Expense> {
    let user = &actor.user;
    let branch_id = user.target_branch(data.branch_id)?;
    let category = sanitize_inline_text(&data.category);
    let description = sanitize_optional(data.description.as_deref());
    let now = now_millis();

    let expense = db::expenses::create(
        &state.pool,
        &NewExpense {
            tenant_id: user.tenant_id,
            branch_id,
            category: &category,
            description: description.as_deref(),
            amount: data.amount,
            incurred_at: data.incurred_at.unwrap_or(now),
            recorded_by: user.id,
        },
        now,
    )
    .await
    .map_err(internal)?;

    actor
        .audit(
            &state.pool,
            "expense.create",
            "expense",
            Some(expense.id),
            json!({ "category": expense.category, "amount": expense.amount, "branch_id": branch_id }),
            now,
        )
        .await
        .map_err(internal)?;
    Ok(Json(expense))
}

/// PUT /api/expenses/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidatedJson(mut data): ValidatedJson<ExpenseUpdate>,
) -> ApiResult<Expense> {
    let user = &actor.user;
    load(&state, user, id).await?;
    data.category = data.category.as_deref().map(sanitize_inline_text);
    data.description = sanitize_optional(data.description.as_deref());

    let now = now_millis();
    let expense = db::expenses::update(&state.pool, user.tenant_id, id, &data, now)
        .await
        .map_err(internal)?
        .ok_or_else(not_found)?;
    actor
        .audit(&state.pool, "expense.update", "expense", Some(id), json!(data), now)
        .await
        .map_err(internal)?;
    Ok(Json(expense))
}

/// DELETE /api/expenses/{id}
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let user = &actor.user;
    let expense = load(&state, user, id).await?;

    let now = now_millis();
    let deleted = db::expenses::soft_delete(&state.pool, user.tenant_id, id, now)
        .await
        .map_err(internal)?;
    if deleted {
        actor
            .audit(
                &state.pool,
                "expense.delete",
                "expense",
                Some(id),
                json!({ "category": expense.category, "amount": expense.amount }),
                now,
            )
            .await
            .map_err(internal)?;
    }
    Ok(Json(deleted))
}
