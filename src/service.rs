// SPDX-License-Identifier: PMPL-1.0-or-later
//! Contact submission pipeline and read-only views
//!
//! A submission passes form validation, the rate limiter and the spam
//! checker before exactly one record is inserted. Every rejection path
//! leaves the store untouched.
//!
//! The count-then-insert sequence is not atomic: two concurrent submissions
//! from one identifier can both pass the limiter, overrunning the limit by
//! a small margin.

use crate::{
    config::StatsConfig,
    error::{AppError, Result},
    limiter::{RateLimitResult, RateLimiter},
    metrics::{Metrics, Outcome},
    models::{ContactForm, ContactPage, ContactReceipt, ContactRecord, PortfolioStats},
    store::{ContactFilter, ContactStore, SortSpec, StoreError},
    validator::{ContactValidator, ValidationResult},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_PAGE_LIMIT: u64 = 50;

/// Provenance of a submission, captured from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Rate-limit key, normally the client IP
    pub identifier: String,
    pub user_agent: Option<String>,
}

/// Contact service shared by all handlers.
#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn ContactStore>,
    limiter: RateLimiter,
    validator: Arc<ContactValidator>,
    stats: StatsConfig,
    metrics: Metrics,
}

impl ContactService {
    pub fn new(
        store: Arc<dyn ContactStore>,
        limiter: RateLimiter,
        validator: ContactValidator,
        stats: StatsConfig,
        metrics: Metrics,
    ) -> Self {
        Self {
            store,
            limiter,
            validator: Arc::new(validator),
            stats,
            metrics,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Submit a contact form as of the current time.
    pub async fn submit(&self, form: ContactForm, client: ClientInfo) -> Result<ContactReceipt> {
        self.submit_at(form, client, Utc::now()).await
    }

    /// Submit a contact form as of `now`.
    pub async fn submit_at(
        &self,
        form: ContactForm,
        client: ClientInfo,
        now: DateTime<Utc>,
    ) -> Result<ContactReceipt> {
        debug!(identifier = %client.identifier, "Processing contact submission");

        if let ValidationResult::Invalid(err) = self.validator.validate_form(&form) {
            info!(identifier = %client.identifier, error = %err, "Contact form invalid");
            self.metrics.record(Outcome::Invalid);
            return Err(err.into());
        }

        match self.limiter.check(&client.identifier, now).await {
            RateLimitResult::Limited { retry_after, .. } => {
                self.metrics.record(Outcome::RateLimited);
                return Err(AppError::RateLimited { retry_after });
            }
            RateLimitResult::Unchecked => self.metrics.record_limiter_failure(),
            RateLimitResult::Allowed { .. } => {}
        }

        if !self
            .validator
            .is_acceptable(&form.name, &form.subject, &form.message)
        {
            info!(identifier = %client.identifier, "Contact message rejected as unacceptable");
            self.metrics.record(Outcome::Spam);
            return Err(AppError::Rejected);
        }

        let record = ContactRecord::new(
            &form,
            Some(client.identifier.clone()),
            client.user_agent,
            now,
        );
        let receipt = ContactReceipt::for_record(&record);

        match self.store.insert(record).await {
            Ok(id) if !id.is_empty() => {
                info!(id = %id, identifier = %client.identifier, "Contact message saved");
                self.metrics.record(Outcome::Accepted);
                Ok(receipt)
            }
            Ok(_) => {
                self.metrics.record(Outcome::StoreError);
                Err(AppError::store(
                    "Failed to save contact message",
                    StoreError::Unavailable("insert returned no identifier".to_string()),
                ))
            }
            Err(e) => {
                self.metrics.record(Outcome::StoreError);
                Err(AppError::store("Failed to save contact message", e))
            }
        }
    }

    /// Live contact count plus the configured display figures.
    pub async fn stats(&self) -> Result<PortfolioStats> {
        let total_contacts = self
            .store
            .count_matching(&ContactFilter::all())
            .await
            .map_err(|e| AppError::store("Failed to get portfolio statistics", e))?;

        Ok(PortfolioStats {
            total_projects: self.stats.total_projects,
            total_contacts,
            technologies: self.stats.technologies,
            years_experience: self.stats.years_experience,
        })
    }

    /// A page of stored messages, newest first.
    pub async fn list(&self, skip: u64, limit: u64) -> Result<ContactPage> {
        let filter = ContactFilter::all();
        let total = self
            .store
            .count_matching(&filter)
            .await
            .map_err(|e| AppError::store("Failed to get contact messages", e))?;

        let messages = self
            .store
            .find_matching(&filter, SortSpec::newest_first(), skip, limit)
            .await
            .map_err(|e| AppError::store("Failed to get contact messages", e))?;

        Ok(ContactPage {
            messages,
            total,
            skip,
            limit,
        })
    }

    /// Run one retention purge, logging instead of failing.
    pub async fn purge_expired(&self) {
        if let Err(e) = self.limiter.purge_expired(Utc::now()).await {
            warn!(error = %e, "Failed to purge expired contact messages");
        }
    }
}
