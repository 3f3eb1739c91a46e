// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form validator.
//!
//! Two layers of checks:
//! - Field shape: present, within length bounds, well-formed email. Runs
//!   before rate limiting.
//! - Acceptability: text left after trimming, no banned patterns, no
//!   excessive word repetition. Runs after rate limiting.

use crate::config::SpamConfig;
use crate::models::ContactForm;
use regex::{Regex, RegexSet, RegexSetBuilder};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_SUBJECT_CHARS: usize = 200;
pub const MAX_MESSAGE_CHARS: usize = 2000;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
}

/// Result of validation.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Form is well-formed
    Valid,
    /// Form is malformed
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(e) => Some(e),
        }
    }
}

/// Contact form validator and spam checker.
pub struct ContactValidator {
    email: Regex,
    spam_patterns: RegexSet,
    repetition_min_tokens: usize,
    min_unique_ratio: f64,
}

impl ContactValidator {
    /// Create a validator, compiling the configured spam patterns.
    pub fn new(config: &SpamConfig) -> Result<Self, regex::Error> {
        let spam_patterns = RegexSetBuilder::new(&config.patterns)
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            email: Regex::new(EMAIL_PATTERN)?,
            spam_patterns,
            repetition_min_tokens: config.repetition_min_tokens,
            min_unique_ratio: config.min_unique_ratio,
        })
    }

    /// Validate field shapes of a submitted form.
    pub fn validate_form(&self, form: &ContactForm) -> ValidationResult {
        let checks = [
            ("name", form.name.as_str(), MAX_NAME_CHARS),
            ("subject", form.subject.as_str(), MAX_SUBJECT_CHARS),
            ("message", form.message.as_str(), MAX_MESSAGE_CHARS),
        ];

        for (field, value, max) in checks {
            let result = validate_text(field, value, max);
            if !result.is_valid() {
                debug!(field, "Field validation failed");
                return result;
            }
        }

        self.validate_email(&form.email)
    }

    /// Validate an email address against the accepted address grammar.
    pub fn validate_email(&self, email: &str) -> ValidationResult {
        let email = email.trim();
        if self.email.is_match(email) {
            ValidationResult::Valid
        } else {
            debug!(email = %email, "Invalid email format");
            ValidationResult::Invalid(ValidationError::InvalidEmail(email.to_string()))
        }
    }

    /// Whether the submission's text is acceptable for storage.
    pub fn is_acceptable(&self, name: &str, subject: &str, message: &str) -> bool {
        if name.trim().is_empty() || subject.trim().is_empty() || message.trim().is_empty() {
            return false;
        }

        !self.is_spam(message)
    }

    /// Banned pattern or excessive repetition in the message body.
    pub fn is_spam(&self, message: &str) -> bool {
        let lowered = message.to_lowercase();

        if self.spam_patterns.is_match(&lowered) {
            debug!(
                patterns = ?self.spam_patterns.matches(&lowered).into_iter().collect::<Vec<_>>(),
                "Message matched spam pattern"
            );
            return true;
        }

        let words: Vec<&str> = lowered.split_whitespace().collect();
        if words.len() > self.repetition_min_tokens {
            let unique: HashSet<&str> = words.iter().copied().collect();
            if (unique.len() as f64) < words.len() as f64 * self.min_unique_ratio {
                debug!(
                    total = words.len(),
                    unique = unique.len(),
                    "Message is mostly repeated words"
                );
                return true;
            }
        }

        false
    }
}

fn validate_text(field: &'static str, value: &str, max: usize) -> ValidationResult {
    // Whitespace-only values pass here and are rejected by `is_acceptable`
    if value.is_empty() {
        return ValidationResult::Invalid(ValidationError::EmptyField(field));
    }
    if value.chars().count() > max {
        return ValidationResult::Invalid(ValidationError::TooLong { field, max });
    }
    ValidationResult::Valid
}
