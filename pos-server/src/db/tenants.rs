//! Tenant accounts

use sqlx::PgConnection;

pub async fn create(conn: &mut PgConnection, name: &str, now: i64) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO tenants (name, created_at) VALUES ($1, $2) RETURNING id")
            .bind(name)
            .bind(now)
            .fetch_one(conn)
            .await?;
    Ok(id)
}
