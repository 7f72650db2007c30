//! Server configuration

use crate::BoxError;

/// POS server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Maximum pooled PostgreSQL connections
    pub db_max_connections: u32,
    /// HTTP port (REST API and Socket.IO)
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for staff authentication
    pub jwt_secret: String,
    /// JWT lifetime
    pub jwt_expiry_hours: i64,
    /// Redis URL; the cache is disabled when unset
    pub redis_url: Option<String>,
    /// Allowed CORS origins (empty allows any origin outside production)
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            jwt_expiry_hours: std::env::var("JWT_EXPIRY_HOURS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(12),
            redis_url: std::env::var("REDIS_URL").ok().filter(|s| !s.is_empty()),
            cors_origins: parse_origins(std::env::var("CORS_ORIGINS").ok().as_deref()),
            environment,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_origins(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_secret_dev_fallback() {
        let secret =
            Config::require_secret("POS_TEST_SECRET_THAT_IS_NEVER_SET", "development").unwrap();
        assert_eq!(secret, "dev-POS_TEST_SECRET_THAT_IS_NEVER_SET-not-for-production");
    }

    #[test]
    fn test_require_secret_missing_in_production() {
        let err = Config::require_secret("POS_TEST_SECRET_THAT_IS_NEVER_SET", "production")
            .unwrap_err();
        assert!(err.to_string().contains("must be set in production"));
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(Some("https://a.example, https://b.example,")),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_origins(None).is_empty());
        assert!(parse_origins(Some("  ")).is_empty());
    }
}
