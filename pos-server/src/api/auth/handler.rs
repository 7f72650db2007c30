//! Auth API Handlers

use axum::Json;
use axum::extract::State;
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{BranchCreate, LoginRequest, LoginResponse, RegisterRequest, Role, Staff};
use shared::util::{now_millis, sanitize_inline_text};

use crate::api::ApiResult;
use crate::api::extract::{ClientIp, ValidatedJson};
use crate::auth::CurrentUser;
use crate::auth::password::{hash_password, verify_password};
use crate::db;
use crate::db::audit::AuditRecord;
use crate::db::users::NewStaff;
use crate::error::{conflict_or_internal, internal};
use crate::security_log;
use crate::state::AppState;

fn login_response(state: &AppState, user: Staff) -> ApiResult<LoginResponse> {
    let token = state.jwt.issue(&user).map_err(internal)?;
    Ok(Json(LoginResponse {
        token,
        expires_in: state.jwt.expires_in(),
        user,
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let email = req.email.trim();
    let credentials = db::users::find_credentials(&state.pool, email)
        .await
        .map_err(internal)?;

    let Some(credentials) = credentials.filter(|c| verify_password(&req.password, &c.password_hash)) else {
        security_log!("WARN", "login_failed", email = email, ip = ip.as_str());
        return Err(AppError::new(ErrorCode::InvalidCredentials));
    };
    let user = credentials.staff;
    if !user.is_active {
        security_log!("WARN", "login_disabled_account", user_id = user.id, ip = ip.as_str());
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let now = now_millis();
    db::audit::log(
        &state.pool,
        &AuditRecord {
            tenant_id: user.tenant_id,
            user_id: Some(user.id),
            action: "auth.login",
            entity: "user",
            entity_id: Some(user.id),
            detail: None,
            ip_address: Some(&ip),
        },
        now,
    )
    .await
    .map_err(internal)?;

    tracing::info!(user_id = user.id, tenant_id = user.tenant_id, "Staff logged in");
    login_response(&state, user)
}

/// POST /api/auth/register
///
/// New tenant, its first branch and the owner account in one transaction
pub async fn register(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<LoginResponse> {
    let email = req.email.trim().to_lowercase();
    let business_name = sanitize_inline_text(&req.business_name);
    let branch_name = req
        .branch_name
        .as_deref()
        .map(sanitize_inline_text)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Main".to_string());
    let full_name = sanitize_inline_text(&req.full_name);
    let password_hash = hash_password(&req.password).map_err(internal)?;
    let now = now_millis();

    let mut tx = state.pool.begin().await.map_err(internal)?;
    let tenant_id = db::tenants::create(&mut tx, &business_name, now)
        .await
        .map_err(internal)?;
    let branch = db::branches::create(
        &mut *tx,
        tenant_id,
        &BranchCreate {
            name: branch_name,
            address: None,
            phone: None,
        },
        now,
    )
    .await
    .map_err(internal)?;
    let owner = db::users::create(
        &mut *tx,
        &NewStaff {
            tenant_id,
            branch_id: Some(branch.id),
            email: &email,
            password_hash: &password_hash,
            full_name: &full_name,
            role: Role::Owner,
        },
        now,
    )
    .await
    .map_err(conflict_or_internal(ErrorCode::StaffEmailExists))?;

    db::audit::log(
        &mut *tx,
        &AuditRecord {
            tenant_id,
            user_id: Some(owner.id),
            action: "tenant.register",
            entity: "tenant",
            entity_id: Some(tenant_id),
            detail: Some(json!({ "branch_id": branch.id })),
            ip_address: Some(&ip),
        },
        now,
    )
    .await
    .map_err(internal)?;
    tx.commit().await.map_err(internal)?;

    tracing::info!(tenant_id, owner_id = owner.id, "Tenant registered");
    login_response(&state, owner)
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Staff> {
    let staff = db::users::find(&state.pool, user.tenant_id, user.id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::StaffNotFound))?;
    Ok(Json(staff))
}
