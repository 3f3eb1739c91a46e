// SPDX-License-Identifier: PMPL-1.0-or-later
//! Data models for contact submissions and read-only views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Confirmation text returned with every accepted submission.
pub const RECEIPT_MESSAGE: &str =
    "Thank you for reaching out! I'll get back to you within 24 hours.";

/// Processing state of a stored message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    New,
    Read,
    Replied,
}

/// One persisted contact message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Unique record identifier
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    /// Creation time, used for windowing and ordering
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub status: ContactStatus,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ContactRecord {
    /// Build a new record from a form that has already been validated.
    pub fn new(
        form: &ContactForm,
        ip_address: Option<String>,
        user_agent: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            subject: form.subject.trim().to_string(),
            message: form.message.trim().to_string(),
            timestamp,
            status: ContactStatus::New,
            ip_address,
            user_agent,
        }
    }
}

/// Inbound contact form body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Acknowledgment for an accepted submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactReceipt {
    pub success: bool,
    pub message: String,
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

impl ContactReceipt {
    pub fn for_record(record: &ContactRecord) -> Self {
        Self {
            success: true,
            message: RECEIPT_MESSAGE.to_string(),
            id: record.id.clone(),
            timestamp: record.timestamp,
        }
    }
}

/// Figures for the portfolio stats panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioStats {
    pub total_projects: u32,
    pub total_contacts: u64,
    pub technologies: u32,
    pub years_experience: u32,
}

/// A page of stored messages, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPage {
    pub messages: Vec<ContactRecord>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}
