//! Redis read-through cache
//!
//! Thin JSON get/set/invalidate helpers over a [`ConnectionManager`]. The
//! cache is optional: without `REDIS_URL` every call is a no-op miss, and any
//! Redis error is logged and treated as a miss so requests never fail on it.

use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use serde::{Serialize, de::DeserializeOwned};

use crate::BoxError;

/// Product list/detail entries live this long
pub const PRODUCT_TTL_SECS: u64 = 300;
/// Branch list entries live this long
pub const BRANCH_TTL_SECS: u64 = 600;

#[derive(Clone, Default)]
pub struct Cache {
    conn: Option<ConnectionManager>,
}

impl Cache {
    /// Cache that never stores anything
    pub fn disabled() -> Self {
        Self::default()
    }

    pub async fn connect(redis_url: &str) -> Result<Self, BoxError> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_millis(500));
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager_with_config(config).await?;
        Ok(Self { conn: Some(conn) })
    }

    pub fn is_enabled(&self) -> bool {
        self.conn.is_some()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone()?;
        let raw: Option<String> = match conn.get(key).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw?) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache entry is not valid JSON");
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache value serialization failed");
                return;
            }
        };
        let res: redis::RedisResult<()> = conn.set_ex(key, raw, ttl_secs).await;
        if let Err(e) = res {
            tracing::warn!(key, error = %e, "Cache write failed");
        }
    }

    pub async fn invalidate(&self, key: &str) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        let res: redis::RedisResult<()> = conn.del(key).await;
        if let Err(e) = res {
            tracing::warn!(key, error = %e, "Cache invalidate failed");
        }
    }

    /// Delete every key starting with `prefix` (SCAN + DEL, never KEYS)
    pub async fn invalidate_prefix(&self, prefix: &str) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        let pattern = format!("{prefix}*");
        let mut cursor: u64 = 0;
        loop {
            let scanned: redis::RedisResult<(u64, Vec<String>)> = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(200)
                .query_async(&mut conn)
                .await;
            let (next, keys) = match scanned {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(prefix, error = %e, "Cache scan failed");
                    return;
                }
            };
            if !keys.is_empty() {
                let res: redis::RedisResult<()> = conn.del(&keys).await;
                if let Err(e) = res {
                    tracing::warn!(prefix, error = %e, "Cache prefix delete failed");
                    return;
                }
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
    }

    /// `None` when the cache is disabled
    pub async fn ping(&self) -> Option<bool> {
        let mut conn = self.conn.clone()?;
        let pong: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        Some(pong.is_ok())
    }
}

/// Prefix shared by every product entry of a tenant
pub fn product_prefix(tenant_id: i64) -> String {
    format!("pos:t{tenant_id}:products:")
}

pub fn product_key(tenant_id: i64, suffix: &str) -> String {
    format!("{}{suffix}", product_prefix(tenant_id))
}

/// The whole branch list of a tenant sits under one key
pub fn branches_key(tenant_id: i64) -> String {
    format!("pos:t{tenant_id}:branches")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_keys_are_tenant_scoped() {
        assert_eq!(product_key(7, "id:3"), "pos:t7:products:id:3");
        assert!(product_key(7, "list").starts_with(&product_prefix(7)));
        assert!(!product_key(70, "list").starts_with(&product_prefix(7)));
        assert!(!branches_key(7).starts_with(&product_prefix(7)));
    }

    #[tokio::test]
    async fn test_disabled_cache_is_a_miss() {
        let cache = Cache::disabled();
        assert!(!cache.is_enabled());
        cache.set_json("k", &42u32, 10).await;
        assert_eq!(cache.get_json::<u32>("k").await, None);
        cache.invalidate("k").await;
        cache.invalidate_prefix("k").await;
        assert_eq!(cache.ping().await, None);
    }
}
