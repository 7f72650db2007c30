//! Audit log operations

use serde_json::Value;
use shared::models::{AuditEntry, AuditFilter};
use sqlx::{PgExecutor, PgPool};

/// A mutation about to be recorded
#[derive(Debug, Clone)]
pub struct AuditRecord<'a> {
    pub tenant_id: i64,
    pub user_id: Option<i64>,
    pub action: &'a str,
    pub entity: &'a str,
    pub entity_id: Option<i64>,
    pub detail: Option<Value>,
    pub ip_address: Option<&'a str>,
}

/// Write an audit log entry (inside the caller's transaction when given one)
pub async fn log<'e>(
    conn: impl PgExecutor<'e>,
    record: &AuditRecord<'_>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (tenant_id, user_id, action, entity, entity_id, detail, ip_address, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(record.tenant_id)
    .bind(record.user_id)
    .bind(record.action)
    .bind(record.entity)
    .bind(record.entity_id)
    .bind(&record.detail)
    .bind(record.ip_address)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Query audit log entries for a tenant (newest first), with the total count
pub async fn query(
    pool: &PgPool,
    tenant_id: i64,
    filter: &AuditFilter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<AuditEntry>, i64), sqlx::Error> {
    const WHERE: &str = r#"
        WHERE tenant_id = $1
          AND ($2::TEXT IS NULL OR entity = $2)
          AND ($3::BIGINT IS NULL OR user_id = $3)
    "#;

    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM audit_logs {WHERE}"))
        .bind(tenant_id)
        .bind(filter.entity.as_deref())
        .bind(filter.user_id)
        .fetch_one(pool)
        .await?;

    let entries: Vec<AuditEntry> = sqlx::query_as(&format!(
        "SELECT id, user_id, action, entity, entity_id, detail, ip_address, created_at
         FROM audit_logs {WHERE}
         ORDER BY created_at DESC, id DESC
         LIMIT $4 OFFSET $5"
    ))
    .bind(tenant_id)
    .bind(filter.entity.as_deref())
    .bind(filter.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((entries, total))
}
