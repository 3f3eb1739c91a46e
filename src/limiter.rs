// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding-window rate limiter over stored submissions.
//!
//! The limiter keeps no state of its own: each decision counts the records
//! stored for an identifier inside the trailing window. When the store
//! cannot answer, the request is allowed.

use crate::config::RateLimitConfig;
use crate::store::{self, ContactFilter, ContactStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Submissions left in the current window, this one included
        remaining: u64,
    },
    /// The store could not be queried; request allowed without a count
    Unchecked,
    /// Request is rate limited
    Limited {
        /// Submissions already stored in the window
        count: u64,
        /// Suggested wait before retrying
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, RateLimitResult::Limited { .. })
    }
}

/// Store-backed rate limiter.
#[derive(Clone)]
pub struct RateLimiter {
    /// Configuration
    config: RateLimitConfig,
    store: Arc<dyn ContactStore>,
}

impl RateLimiter {
    /// Create a new rate limiter counting against `store`.
    pub fn new(config: RateLimitConfig, store: Arc<dyn ContactStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check the limit for `identifier` as of `now`.
    pub async fn check(&self, identifier: &str, now: DateTime<Utc>) -> RateLimitResult {
        let since = now - self.config.window();
        let filter = ContactFilter::from_ip_since(identifier, since);

        let count = match self.store.count_matching(&filter).await {
            Ok(count) => count,
            Err(e) => {
                warn!(identifier, error = %e, "Rate limit count failed, allowing request");
                return RateLimitResult::Unchecked;
            }
        };

        if count >= self.config.max_requests {
            warn!(identifier, count, "Rate limit exceeded");
            RateLimitResult::Limited {
                count,
                retry_after: self.retry_after(),
            }
        } else {
            let remaining = self.config.max_requests - count;
            debug!(identifier, count, remaining, "Within rate limit");
            RateLimitResult::Allowed { remaining }
        }
    }

    /// Whether `identifier` may submit as of `now`.
    pub async fn allow(&self, identifier: &str, now: DateTime<Utc>) -> bool {
        self.check(identifier, now).await.is_allowed()
    }

    /// Delete records older than the retention period.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> store::Result<u64> {
        let cutoff = now - self.config.retention();
        let deleted = self
            .store
            .delete_matching(&ContactFilter::older_than(cutoff))
            .await?;
        info!(deleted, cutoff = %cutoff, "Purged expired contact messages");
        Ok(deleted)
    }

    fn retry_after(&self) -> Duration {
        Duration::from_secs(u64::from(self.config.window_hours) * 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactForm, ContactRecord};
    use crate::store::{SortSpec, StoreError, SurrealStore};
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl ContactStore for BrokenStore {
        async fn insert(&self, _record: ContactRecord) -> store::Result<String> {
            Err(StoreError::Unavailable("down".to_string()))
        }

        async fn count_matching(&self, _filter: &ContactFilter) -> store::Result<u64> {
            Err(StoreError::Unavailable("down".to_string()))
        }

        async fn find_matching(
            &self,
            _filter: &ContactFilter,
            _sort: SortSpec,
            _skip: u64,
            _limit: u64,
        ) -> store::Result<Vec<ContactRecord>> {
            Err(StoreError::Unavailable("down".to_string()))
        }

        async fn delete_matching(&self, _filter: &ContactFilter) -> store::Result<u64> {
            Err(StoreError::Unavailable("down".to_string()))
        }
    }

    fn record(ip: &str, timestamp: DateTime<Utc>) -> ContactRecord {
        let form = ContactForm {
            name: "Tester".to_string(),
            email: "tester@example.com".to_string(),
            subject: "Subject".to_string(),
            message: "Message body".to_string(),
        };
        ContactRecord::new(&form, Some(ip.to_string()), None, timestamp)
    }

    #[tokio::test]
    async fn test_denies_at_threshold() {
        let store = Arc::new(SurrealStore::memory().await.unwrap());
        let limiter = RateLimiter::new(RateLimitConfig::default(), store.clone());
        let now = Utc::now();

        for i in 0..5 {
            assert!(limiter.allow("10.0.0.1", now).await, "submission {} should pass", i + 1);
            store.insert(record("10.0.0.1", now)).await.unwrap();
        }

        match limiter.check("10.0.0.1", now).await {
            RateLimitResult::Limited { count, retry_after } => {
                assert_eq!(count, 5);
                assert_eq!(retry_after, Duration::from_secs(3600));
            }
            other => panic!("Should be limited, got {:?}", other),
        }

        // Other identifiers are unaffected
        assert!(limiter.allow("10.0.0.2", now).await);
    }

    #[tokio::test]
    async fn test_window_slides() {
        let store = Arc::new(SurrealStore::memory().await.unwrap());
        let limiter = RateLimiter::new(
            RateLimitConfig {
                max_requests: 2,
                ..Default::default()
            },
            store.clone(),
        );
        let start = Utc::now();

        store.insert(record("10.0.0.1", start)).await.unwrap();
        store.insert(record("10.0.0.1", start)).await.unwrap();
        assert!(!limiter.allow("10.0.0.1", start + chrono::Duration::minutes(59)).await);
        assert!(limiter.allow("10.0.0.1", start + chrono::Duration::minutes(61)).await);
    }

    #[tokio::test]
    async fn test_remaining_counts_down() {
        let store = Arc::new(SurrealStore::memory().await.unwrap());
        let limiter = RateLimiter::new(RateLimitConfig::default(), store.clone());
        let now = Utc::now();

        assert_eq!(
            limiter.check("10.0.0.1", now).await,
            RateLimitResult::Allowed { remaining: 5 }
        );
        store.insert(record("10.0.0.1", now)).await.unwrap();
        assert_eq!(
            limiter.check("10.0.0.1", now).await,
            RateLimitResult::Allowed { remaining: 4 }
        );
    }

    #[tokio::test]
    async fn test_fails_open_when_store_errors() {
        let limiter = RateLimiter::new(RateLimitConfig::default(), Arc::new(BrokenStore));

        assert_eq!(
            limiter.check("10.0.0.1", Utc::now()).await,
            RateLimitResult::Unchecked
        );
        assert!(limiter.allow("10.0.0.1", Utc::now()).await);
    }

    #[tokio::test]
    async fn test_purge_expired_uses_retention() {
        let store = Arc::new(SurrealStore::memory().await.unwrap());
        let limiter = RateLimiter::new(RateLimitConfig::default(), store.clone());
        let now = Utc::now();

        store.insert(record("10.0.0.1", now - chrono::Duration::days(8))).await.unwrap();
        store.insert(record("10.0.0.1", now - chrono::Duration::days(6))).await.unwrap();

        assert_eq!(limiter.purge_expired(now).await.unwrap(), 1);
        assert_eq!(store.count_matching(&ContactFilter::all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_purge_propagates_store_errors() {
        let limiter = RateLimiter::new(RateLimitConfig::default(), Arc::new(BrokenStore));
        assert!(limiter.purge_expired(Utc::now()).await.is_err());
    }
}
