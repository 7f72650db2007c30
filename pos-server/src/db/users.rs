//! Staff account operations

use shared::models::{Role, Staff, StaffFilter};
use sqlx::{PgExecutor, PgPool};

const COLUMNS: &str =
    "id, tenant_id, branch_id, email, full_name, role, is_active, created_at, updated_at";

/// Staff row plus its password hash, only used for login
#[derive(sqlx::FromRow)]
pub struct Credentials {
    #[sqlx(flatten)]
    pub staff: Staff,
    pub password_hash: String,
}

/// Login lookup: emails are unique platform-wide among live accounts
pub async fn find_credentials(
    pool: &PgPool,
    email: &str,
) -> Result<Option<Credentials>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS}, password_hash FROM users
         WHERE lower(email) = lower($1) AND deleted_at IS NULL"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn find<'e>(
    conn: impl PgExecutor<'e>,
    tenant_id: i64,
    id: i64,
) -> Result<Option<Staff>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM users WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL"
    ))
    .bind(id)
    .bind(tenant_id)
    .fetch_optional(conn)
    .await
}

pub async fn list(
    pool: &PgPool,
    tenant_id: i64,
    filter: &StaffFilter,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Staff>, i64), sqlx::Error> {
    const WHERE: &str = r#"
        WHERE tenant_id = $1 AND deleted_at IS NULL
          AND ($2::user_role IS NULL OR role = $2)
          AND ($3::BIGINT IS NULL OR branch_id = $3)
          AND ($4::TEXT IS NULL OR full_name ILIKE $4 OR email ILIKE $4)
    "#;

    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM users {WHERE}"))
        .bind(tenant_id)
        .bind(filter.role)
        .bind(filter.branch_id)
        .bind(search)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM users {WHERE} ORDER BY full_name, id LIMIT $5 OFFSET $6"
    ))
    .bind(tenant_id)
    .bind(filter.role)
    .bind(filter.branch_id)
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}

/// New account fields, already validated and hashed
pub struct NewStaff<'a> {
    pub tenant_id: i64,
    pub branch_id: Option<i64>,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub role: Role,
}

pub async fn create<'e>(
    conn: impl PgExecutor<'e>,
    data: &NewStaff<'_>,
    now: i64,
) -> Result<Staff, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        INSERT INTO users (tenant_id, branch_id, email, password_hash, full_name, role, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(data.tenant_id)
    .bind(data.branch_id)
    .bind(data.email)
    .bind(data.password_hash)
    .bind(data.full_name)
    .bind(data.role)
    .bind(now)
    .fetch_one(conn)
    .await
}

/// Field changes for an existing account; `None` keeps the stored value
#[derive(Default)]
pub struct StaffChanges<'a> {
    pub full_name: Option<&'a str>,
    pub role: Option<Role>,
    /// `Some(None)` moves the account off any branch (owners)
    pub branch_id: Option<Option<i64>>,
    pub is_active: Option<bool>,
    pub password_hash: Option<&'a str>,
}

pub async fn update(
    pool: &PgPool,
    tenant_id: i64,
    id: i64,
    changes: &StaffChanges<'_>,
    now: i64,
) -> Result<Option<Staff>, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        UPDATE users SET
            full_name = COALESCE($3, full_name),
            role = COALESCE($4, role),
            branch_id = CASE WHEN $5 THEN $6 ELSE branch_id END,
            is_active = COALESCE($7, is_active),
            password_hash = COALESCE($8, password_hash),
            updated_at = $9
        WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(tenant_id)
    .bind(changes.full_name)
    .bind(changes.role)
    .bind(changes.branch_id.is_some())
    .bind(changes.branch_id.flatten())
    .bind(changes.is_active)
    .bind(changes.password_hash)
    .bind(now)
    .fetch_optional(pool)
    .await
}

/// Deactivate and soft delete
pub async fn deactivate(
    pool: &PgPool,
    tenant_id: i64,
    id: i64,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET is_active = FALSE, deleted_at = $3, updated_at = $3
         WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
