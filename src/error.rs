// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for the contact API

use crate::store::StoreError;
use crate::validator::ValidationError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid request body: {0}")]
    Malformed(String),

    #[error("Invalid contact message data")]
    Rejected,

    #[error("Too many requests. Please try again later.")]
    RateLimited { retry_after: Duration },

    /// Store failure; `context` is the only part shown to callers
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    /// Failure whose cause was logged where it happened; the message is
    /// returned to the caller as-is
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn store(context: &'static str, source: StoreError) -> Self {
        Self::Store { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Malformed(_) | AppError::Rejected => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Store { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::Malformed(_) | AppError::Rejected => "INVALID_DATA",
            AppError::RateLimited { .. } => "RATE_LIMITED",
            AppError::Store { .. } | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return to the caller.
    fn detail(&self) -> String {
        match self {
            AppError::Store { context, .. } => (*context).to_string(),
            AppError::Internal(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            detail: self.detail(),
            code: self.code(),
            retry_after_secs: None,
        };

        match self {
            AppError::RateLimited { retry_after } => {
                let retry_secs = retry_after.as_secs();
                (
                    status,
                    [(header::RETRY_AFTER, retry_secs.to_string())],
                    Json(ErrorResponse {
                        retry_after_secs: Some(retry_secs),
                        ..body
                    }),
                )
                    .into_response()
            }
            _ => (status, Json(body)).into_response(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;

/// Failures while assembling the service at startup
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid spam pattern: {0}")]
    SpamPattern(#[from] regex::Error),

    #[error("Metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Invalid metrics path {0:?}: must start with '/' and not shadow an API route")]
    MetricsPath(String),

    #[error("Failed to open store: {0}")]
    Store(#[from] StoreError),
}
