// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the portfolio contact API.
//!
//! `/api/admin/contacts` has no access control. Protect it at the proxy
//! until an authentication scheme is added.

use crate::config::{Config, MetricsConfig, ResumeConfig};
use crate::error::{AppError, Result, StartupError};
use crate::limiter::RateLimiter;
use crate::metrics::Metrics;
use crate::models::{ContactForm, ContactPage, ContactReceipt, PortfolioStats};
use crate::resume;
use crate::service::{ClientInfo, ContactService, DEFAULT_PAGE_LIMIT};
use crate::store::{self, ContactStore};
use crate::validator::ContactValidator;
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Paths served by [`router`] besides the metrics endpoint.
const API_ROUTES: [&str; 6] = [
    "/api/",
    "/health",
    "/api/contact",
    "/api/stats",
    "/api/admin/contacts",
    "/api/resume/download",
];

/// Shared application state.
pub struct AppState {
    pub service: ContactService,
    pub resume: ResumeConfig,
    pub metrics: MetricsConfig,
}

impl AppState {
    /// Open the configured store and assemble the service around it.
    pub async fn open(config: &Config) -> std::result::Result<Arc<Self>, StartupError> {
        let store = store::open(&config.store).await?;
        Self::build(config, store)
    }

    /// Assemble the service from configuration around an opened store.
    pub fn build(
        config: &Config,
        store: Arc<dyn ContactStore>,
    ) -> std::result::Result<Arc<Self>, StartupError> {
        if config.metrics.enabled {
            validate_metrics_path(&config.metrics.path)?;
        }

        let limiter = RateLimiter::new(config.rate_limit.clone(), store.clone());
        let validator = ContactValidator::new(&config.spam)?;
        let service = ContactService::new(
            store,
            limiter,
            validator,
            config.stats.clone(),
            Metrics::new()?,
        );

        Ok(Arc::new(Self {
            service,
            resume: config.resume.clone(),
            metrics: config.metrics.clone(),
        }))
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Pagination for the admin listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_LIMIT
}

fn validate_metrics_path(path: &str) -> std::result::Result<(), StartupError> {
    if !path.starts_with('/') || API_ROUTES.contains(&path) {
        return Err(StartupError::MetricsPath(path.to_string()));
    }
    Ok(())
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let [root, health_path, contact, stats_path, admin, resume_path] = API_ROUTES;
    let mut app = Router::new()
        .route(root, get(health))
        .route(health_path, get(health))
        .route(contact, post(submit_contact))
        .route(stats_path, get(stats))
        .route(admin, get(list_contacts))
        .route(resume_path, get(download_resume));

    if state.metrics.enabled {
        app = app.route(&state.metrics.path, get(metrics));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Rate-limit identifier for a request.
///
/// First `X-Forwarded-For` entry, then `X-Real-IP`, then the peer address,
/// then `"unknown"`.
pub fn client_identifier(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    };

    if let Some(forwarded) = header_value(X_FORWARDED_FOR) {
        return forwarded.split(',').next().unwrap_or_default().trim().to_string();
    }

    if let Some(real_ip) = header_value(X_REAL_IP) {
        return real_ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "portfolio-contact-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Accept a contact form submission.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: std::result::Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<ContactReceipt>> {
    let peer = connect_info.map(|ConnectInfo(addr)| addr);
    let client = ClientInfo {
        identifier: client_identifier(&headers, peer),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    let Json(form) = payload.map_err(|rejection| {
        debug!(
            identifier = %client.identifier,
            error = %rejection.body_text(),
            "Malformed contact payload"
        );
        AppError::Malformed(rejection.body_text())
    })?;

    let receipt = state.service.submit(form, client).await?;
    Ok(Json(receipt))
}

/// Portfolio statistics.
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<PortfolioStats>> {
    Ok(Json(state.service.stats().await?))
}

/// Stored messages, newest first.
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ContactPage>> {
    Ok(Json(state.service.list(params.skip, params.limit).await?))
}

/// Resume download as an attachment.
pub async fn download_resume(State(state): State<Arc<AppState>>) -> Result<Response> {
    let bytes = resume::load_or_create(&state.resume).await.map_err(|e| {
        error!(path = %state.resume.path.display(), error = %e, "Failed to load resume");
        AppError::Internal("Failed to download resume".to_string())
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", state.resume.download_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.service.metrics().render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
