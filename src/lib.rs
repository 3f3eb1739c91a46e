// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Portfolio Contact API
//!
//! Backend for a portfolio site:
//!
//! - Contact form submissions, validated and stored
//! - Per-IP rate limiting counted over stored submissions (5 per hour default)
//! - Spam heuristics: banned patterns and word repetition
//! - Portfolio statistics and a paginated admin listing
//! - Resume download with a generated placeholder

pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod models;
pub mod resume;
pub mod service;
pub mod store;
pub mod validator;

pub use config::Config;
pub use error::{AppError, StartupError};
pub use limiter::{RateLimitResult, RateLimiter};
pub use service::{ClientInfo, ContactService};
pub use store::{ContactStore, SurrealStore};
pub use validator::{ContactValidator, ValidationResult};
