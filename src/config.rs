// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the portfolio contact backend.
//!
//! Values are layered: built-in defaults, then an optional config file
//! (`PORTFOLIO_CONFIG`, default `portfolio.toml`), then environment
//! variables of the form `PORTFOLIO__SECTION__KEY`.

use crate::error::StartupError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Configuration for the whole service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Per-IP submission limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Spam heuristics applied to message bodies
    #[serde(default)]
    pub spam: SpamConfig,

    /// Display constants reported by the stats endpoint
    #[serde(default)]
    pub stats: StatsConfig,

    /// Resume download configuration
    #[serde(default)]
    pub resume: ResumeConfig,

    /// Record store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (default: 0.0.0.0:8001)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Origins allowed by CORS (default: http://localhost:3000)
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

/// Sliding-window limits counted over stored submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum submissions per identifier inside the window (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u64,

    /// Trailing window length in hours (default: 1)
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,

    /// Records older than this are purged by maintenance (default: 7)
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// How often the purge task runs, in seconds (default: 3600)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamConfig {
    /// Regular expressions matched case-insensitively against the message
    #[serde(default = "default_spam_patterns")]
    pub patterns: Vec<String>,

    /// Repetition check only applies above this many tokens (default: 5)
    #[serde(default = "default_repetition_min_tokens")]
    pub repetition_min_tokens: usize,

    /// Minimum distinct/total token ratio (default: 0.3)
    #[serde(default = "default_min_unique_ratio")]
    pub min_unique_ratio: f64,
}

/// Static figures shown next to the live contact count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_total_projects")]
    pub total_projects: u32,

    #[serde(default = "default_technologies")]
    pub technologies: u32,

    #[serde(default = "default_years_experience")]
    pub years_experience: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeConfig {
    /// Location of the resume on disk (default: static/resume.pdf)
    #[serde(default = "default_resume_path")]
    pub path: PathBuf,

    /// Filename offered to the browser (default: Resume.pdf)
    #[serde(default = "default_download_name")]
    pub download_name: String,

    /// Name printed on the generated placeholder
    #[serde(default = "default_owner_name")]
    pub owner_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// RocksDB directory (needs the `rocksdb` feature); in-memory engine when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8001".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_max_requests() -> u64 {
    5
}

fn default_window_hours() -> u32 {
    1
}

fn default_retention_days() -> u32 {
    7
}

fn default_cleanup_interval_secs() -> u64 {
    3600
}

/// Default spam patterns: a URL-like pattern followed by banned phrases.
pub fn default_spam_patterns() -> Vec<String> {
    [
        r"https?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\(\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+",
        "buy now",
        "click here",
        "limited time",
        "free money",
        "make money fast",
        "casino",
        "viagra",
        "pills",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

fn default_repetition_min_tokens() -> usize {
    5
}

fn default_min_unique_ratio() -> f64 {
    0.3
}

fn default_total_projects() -> u32 {
    15
}

fn default_technologies() -> u32 {
    20
}

fn default_years_experience() -> u32 {
    3
}

fn default_resume_path() -> PathBuf {
    PathBuf::from("static/resume.pdf")
}

fn default_download_name() -> String {
    "Resume.pdf".to_string()
}

fn default_owner_name() -> String {
    "Portfolio Owner".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_hours: default_window_hours(),
            retention_days: default_retention_days(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Default for SpamConfig {
    fn default() -> Self {
        Self {
            patterns: default_spam_patterns(),
            repetition_min_tokens: default_repetition_min_tokens(),
            min_unique_ratio: default_min_unique_ratio(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            total_projects: default_total_projects(),
            technologies: default_technologies(),
            years_experience: default_years_experience(),
        }
    }
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            path: default_resume_path(),
            download_name: default_download_name(),
            owner_name: default_owner_name(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl Config {
    /// Load configuration from `.env`, the optional config file and the
    /// environment, in that order of increasing precedence.
    pub fn load() -> Result<Self, StartupError> {
        dotenvy::dotenv().ok();

        let file = std::env::var("PORTFOLIO_CONFIG").unwrap_or_else(|_| "portfolio".to_string());
        debug!(file = %file, "Loading configuration");

        let config = ::config::Config::builder()
            .add_source(::config::File::with_name(&file).required(false))
            .add_source(
                ::config::Environment::with_prefix("PORTFOLIO")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .with_list_parse_key("spam.patterns")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }
}

impl RateLimitConfig {
    /// Get the trailing window length
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.window_hours))
    }

    /// Get the retention period for stored submissions
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.retention_days))
    }

    /// Get the purge task interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window(), chrono::Duration::hours(1));
        assert_eq!(config.rate_limit.retention(), chrono::Duration::days(7));
        assert_eq!(config.spam.patterns.len(), 9);
        assert_eq!(config.stats.total_projects, 15);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"rate_limit": {"max_requests": 10}}"#).unwrap();
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.window_hours, 1);
        assert_eq!(config.server.bind_addr, "0.0.0.0:8001");
    }
}
