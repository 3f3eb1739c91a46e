// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Portfolio Contact API Service
//!
//! Serves the contact form, stats, admin listing and resume download for a
//! portfolio site.
//!
//! ## Configuration
//!
//! Defaults can be overridden by a config file (`PORTFOLIO_CONFIG`, default
//! `portfolio.toml`) and by environment variables:
//!
//! - `PORTFOLIO__SERVER__BIND_ADDR`: Server bind address (default: 0.0.0.0:8001)
//! - `PORTFOLIO__RATE_LIMIT__MAX_REQUESTS`: Submissions per IP per window (default: 5)
//! - `PORTFOLIO__RATE_LIMIT__WINDOW_HOURS`: Window length (default: 1)
//! - `PORTFOLIO__RATE_LIMIT__RETENTION_DAYS`: Purge age (default: 7)
//! - `PORTFOLIO__STORE__PATH`: RocksDB directory, with the `rocksdb` feature (default: in-memory)

use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use portfolio_contact_api::{config::Config, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::load()?;
    info!(
        bind_addr = %config.server.bind_addr,
        max_requests = config.rate_limit.max_requests,
        window_hours = config.rate_limit.window_hours,
        retention_days = config.rate_limit.retention_days,
        "Starting portfolio contact API"
    );

    // Create application state
    let state = handlers::AppState::open(&config).await?;

    // Spawn cleanup task
    let cleanup_state = state.clone();
    let cleanup_interval = config.rate_limit.cleanup_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            cleanup_state.service.purge_expired().await;
        }
    });

    // Build router with CORS restricted to the configured origins
    let origins: Vec<HeaderValue> = config
        .server
        .allowed_origins
        .iter()
        .filter_map(|o| match o.trim().parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let app = handlers::router(state).layer(cors);

    // Start server
    let addr: SocketAddr = config.server.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
