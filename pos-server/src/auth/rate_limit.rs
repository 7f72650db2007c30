//! Application-layer rate limiting for login and registration routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::security_log;
use crate::state::AppState;

/// Length of every rate limit window, also sent back as `retry_after`
const WINDOW_SECS: u64 = 60;

struct IpEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    pub async fn check(
        &self,
        route: &'static str,
        ip: &str,
        max_requests: u32,
        window_secs: u64,
    ) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        // Reset window if expired
        if now.duration_since(entry.window_start).as_secs() >= window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Remove entries older than 5 minutes
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let cutoff = std::time::Duration::from_secs(300);
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < cutoff);
        }

        map.retain(|_, route_map| !route_map.is_empty());
    }

    #[cfg(test)]
    async fn tracked_ips(&self, route: &'static str) -> usize {
        self.inner.lock().await.get(route).map_or(0, HashMap::len)
    }
}

/// Extract client IP: X-Forwarded-For header first (load balancer), then peer address.
pub fn extract_ip(headers: &http::HeaderMap, extensions: &http::Extensions) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
    {
        // X-Forwarded-For can be comma-separated; first entry is the original client
        if let Some(first) = val.split(',').next() {
            let ip = first.trim();
            if !ip.is_empty() {
                return ip.to_owned();
            }
        }
    }

    extensions
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

async fn limit(
    state: &AppState,
    route: &'static str,
    max_requests: u32,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = extract_ip(request.headers(), request.extensions());
    if !state.rate_limiter.check(route, &ip, max_requests, WINDOW_SECS).await {
        security_log!("WARN", "rate_limited", route = route, ip = ip);
        return Err(AppError::rate_limited(WINDOW_SECS));
    }
    Ok(next.run(request).await)
}

/// Rate limit middleware for login: 5 requests/minute per IP
pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit(&state, "login", 5, request, next).await
}

/// Rate limit middleware for tenant registration: 3 requests/minute per IP
pub async fn register_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit(&state, "register", 3, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[tokio::test]
    async fn test_allows_up_to_limit_then_blocks() {
        let limiter = RateLimiter::new();
        for _ in 0..5 {
            assert!(limiter.check("login", "10.0.0.1", 5, 60).await);
        }
        assert!(!limiter.check("login", "10.0.0.1", 5, 60).await);
        // Other IPs and routes have their own budget
        assert!(limiter.check("login", "10.0.0.2", 5, 60).await);
        assert!(limiter.check("register", "10.0.0.1", 3, 60).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = RateLimiter::new();
        assert!(limiter.check("login", "ip", 1, 60).await);
        assert!(!limiter.check("login", "ip", 1, 60).await);

        tokio::time::advance(std::time::Duration::from_secs(61)).await;
        assert!(limiter.check("login", "ip", 1, 60).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_drops_stale_entries() {
        let limiter = RateLimiter::new();
        limiter.check("login", "old", 5, 60).await;
        tokio::time::advance(std::time::Duration::from_secs(301)).await;
        limiter.check("login", "fresh", 5, 60).await;

        limiter.cleanup().await;
        assert_eq!(limiter.tracked_ips("login").await, 1);
    }

    #[test]
    fn test_extract_ip_prefers_forwarded_for() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_ip(req.headers(), req.extensions()), "203.0.113.9");

        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_ip(req.headers(), req.extensions()), "unknown");
    }
}
