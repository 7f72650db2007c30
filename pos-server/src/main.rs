//! pos-server — multi-tenant point of sale backend
//!
//! Long-running service that:
//! - Serves the staff REST API (JWT authenticated, tenant and branch scoped)
//! - Runs the restaurant order lifecycle and closes tabs into sales
//! - Records retail checkouts, expenses and hotel bookings
//! - Pushes kitchen events over Socket.IO

mod api;
mod auth;
mod cache;
mod config;
mod db;
mod error;
mod kitchen;
mod security;
mod services;
mod state;

use std::net::SocketAddr;
use std::time::Duration;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

// Security logging macro - structured events under the `security` target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pos_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    error::set_expose_details(!config.is_production());

    tracing::info!("Starting pos-server (env: {})", config.environment);

    // Initialize application state
    let (state, socket_layer) = AppState::new(&config).await?;
    let app = api::build_app(state.clone(), socket_layer, &config.cors_origins);

    // Periodic rate limiter cleanup (every 5 minutes)
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup().await;
        }
    });

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("pos-server HTTP listening on {http_addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
