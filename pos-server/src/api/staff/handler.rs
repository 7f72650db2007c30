//! Staff API Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{Role, Staff, StaffCreate, StaffFilter, StaffUpdate};
use shared::pagination::{PageQuery, PaginatedResponse};
use shared::util::{now_millis, sanitize_inline_text};

use crate::api::ApiResult;
use crate::api::extract::ValidatedJson;
use crate::auth::CurrentUser;
use crate::auth::password::hash_password;
use crate::db;
use crate::db::users::{NewStaff, StaffChanges};
use crate::error::{conflict_or_internal, internal};
use crate::security_log;
use crate::services::Actor;
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::new(ErrorCode::StaffNotFound)
}

/// Managers may not touch owner accounts or hand out the owner role
fn ensure_can_manage(user: &CurrentUser, role: Role) -> Result<(), AppError> {
    if user.role.can_manage(role) {
        return Ok(());
    }
    security_log!(
        "WARN",
        "staff_manage_denied",
        user_id = user.id,
        target_role = role.as_str()
    );
    Err(AppError::new(ErrorCode::CannotModifyOwner))
}

/// Staff rows are visible to owners, and to managers for their own branch
fn visible(user: &CurrentUser, staff: &Staff) -> bool {
    user.is_owner() || (staff.branch_id.is_some() && staff.branch_id == user.branch_id)
}

/// Only owners may be left without a branch after an update
fn ensure_branch_for_role(role: Role, requested: Option<i64>, current: Option<i64>) -> Result<(), AppError> {
    if role == Role::Owner || requested.or(current).is_some() {
        return Ok(());
    }
    Err(AppError::validation(format!("branch_id is required for the {} role", role.as_str()))
        .with_detail("field", "branch_id"))
}

/// Resolve the branch an account is attached to. Owner accounts may float.
async fn resolve_branch(
    state: &AppState,
    user: &CurrentUser,
    role: Role,
    requested: Option<i64>,
) -> Result<Option<i64>, AppError> {
    let branch_id = if role == Role::Owner {
        requested
    } else {
        Some(user.target_branch(requested)?)
    };
    if let Some(branch_id) = branch_id {
        db::branches::find(&state.pool, user.tenant_id, branch_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| AppError::new(ErrorCode::BranchNotFound))?;
    }
    Ok(branch_id)
}

async fn load(state: &AppState, user: &CurrentUser, id: i64) -> Result<Staff, AppError> {
    db::users::find(&state.pool, user.tenant_id, id)
        .await
        .map_err(internal)?
        .filter(|s| visible(user, s))
        .ok_or_else(not_found)
}

/// GET /api/staff
pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Query(page): Query<PageQuery>,
    Query(mut filter): Query<StaffFilter>,
) -> ApiResult<PaginatedResponse<Staff>> {
    filter.branch_id = actor.user.list_scope(filter.branch_id)?;
    let search = db::search_pattern(filter.search.as_deref());
    let (rows, total) = db::users::list(
        &state.pool,
        actor.user.tenant_id,
        &filter,
        search.as_deref(),
        i64::from(page.limit()),
        page.offset(),
    )
    .await
    .map_err(internal)?;
    Ok(Json(PaginatedResponse::from_query(rows, total, &page)))
}

/// GET /api/staff/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<Staff> {
    Ok(Json(load(&state, &actor.user, id).await?))
}

/// POST /api/staff
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(data): ValidatedJson<StaffCreate>,
) -> ApiResult<Staff> {
    let user = &actor.user;
    ensure_can_manage(user, data.role)?;
    let branch_id = resolve_branch(&state, user, data.role, data.branch_id).await?;

    let email = data.email.trim().to_lowercase();
    let full_name = sanitize_inline_text(&data.full_name);
    let password_hash = hash_password(&data.password).map_err(internal)?;
    let now = now_millis();

    let staff = db::users::create(
        &state.pool,
        &NewStaff {
            tenant_id: user.tenant_id,
            branch_id,
            email: &email,
            password_hash: &password_hash,
            full_name: &full_name,
            role: data.role,
        },
        now,
    )
    .await
    .map_err(conflict_or_internal(ErrorCode::StaffEmailExists))?;

    actor
        .audit(
            &state.pool,
            "staff.create",
            "user",
            Some(staff.id),
            json!({ "email": staff.email, "role": staff.role, "branch_id": staff.branch_id }),
            now,
        )
        .await
        .map_err(internal)?;
    Ok(Json(staff))
}

/// PUT /api/staff/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    ValidatedJson(data): ValidatedJson<StaffUpdate>,
) -> ApiResult<Staff> {
    let user = &actor.user;
    let target = load(&state, user, id).await?;
    ensure_can_manage(user, target.role)?;
    if let Some(role) = data.role {
        ensure_can_manage(user, role)?;
    }
    if target.id == user.id && (data.role.is_some() || data.is_active == Some(false)) {
        return Err(AppError::validation("You cannot change your own role or deactivate yourself"));
    }

    let role = data.role.unwrap_or(target.role);
    ensure_branch_for_role(role, data.branch_id, target.branch_id)?;
    let branch_id = match data.branch_id {
        Some(requested) => Some(resolve_branch(&state, user, role, Some(requested)).await?),
        None => None,
    };
    let full_name = data.full_name.as_deref().map(sanitize_inline_text);
    let password_hash = data
        .password
        .as_deref()
        .map(hash_password)
        .transpose()
        .map_err(internal)?;

    let now = now_millis();
    let staff = db::users::update(
        &state.pool,
        user.tenant_id,
        id,
        &StaffChanges {
            full_name: full_name.as_deref(),
            role: data.role,
            branch_id,
            is_active: data.is_active,
            password_hash: password_hash.as_deref(),
        },
        now,
    )
    .await
    .map_err(internal)?
    .ok_or_else(not_found)?;

    actor
        .audit(
            &state.pool,
            "staff.update",
            "user",
            Some(staff.id),
            json!({
                "role": data.role,
                "branch_id": data.branch_id,
                "is_active": data.is_active,
                "password_changed": password_hash.is_some(),
            }),
            now,
        )
        .await
        .map_err(internal)?;
    Ok(Json(staff))
}

/// DELETE /api/staff/{id}
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let user = &actor.user;
    let target = load(&state, user, id).await?;
    ensure_can_manage(user, target.role)?;
    if target.id == user.id {
        return Err(AppError::validation("You cannot deactivate yourself"));
    }

    let now = now_millis();
    let deleted = db::users::deactivate(&state.pool, user.tenant_id, id, now)
        .await
        .map_err(internal)?;
    if deleted {
        actor
            .audit(&state.pool, "staff.deactivate", "user", Some(id), json!({ "email": target.email }), now)
            .await
            .map_err(internal)?;
    }
    Ok(Json(deleted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, branch_id: Option<i64>) -> CurrentUser {
        CurrentUser {
            id: 1,
            tenant_id: 1,
            branch_id,
            role,
            email: "boss@example.com".into(),
        }
    }

    fn staff(role: Role, branch_id: Option<i64>) -> Staff {
        Staff {
            id: 2,
            tenant_id: 1,
            branch_id,
            email: "s@example.com".into(),
            full_name: "S".into(),
            role,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_manager_cannot_manage_owner() {
        let manager = user(Role::Manager, Some(1));
        assert!(ensure_can_manage(&manager, Role::Cashier).is_ok());
        assert_eq!(
            ensure_can_manage(&manager, Role::Owner).unwrap_err().code,
            ErrorCode::CannotModifyOwner
        );
        assert!(ensure_can_manage(&user(Role::Owner, None), Role::Owner).is_ok());
    }

    #[test]
    fn test_demoted_owner_needs_a_branch() {
        let err = ensure_branch_for_role(Role::Cashier, None, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(ensure_branch_for_role(Role::Manager, Some(3), None).is_ok());
        assert!(ensure_branch_for_role(Role::Waiter, None, Some(2)).is_ok());
        assert!(ensure_branch_for_role(Role::Owner, None, None).is_ok());
    }

    #[test]
    fn test_manager_sees_own_branch_only() {
        let manager = user(Role::Manager, Some(1));
        assert!(visible(&manager, &staff(Role::Cashier, Some(1))));
        assert!(!visible(&manager, &staff(Role::Cashier, Some(2))));
        assert!(!visible(&manager, &staff(Role::Owner, None)));
        assert!(visible(&user(Role::Owner, None), &staff(Role::Cashier, Some(2))));
    }
}
