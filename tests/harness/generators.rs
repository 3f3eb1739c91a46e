// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for contact submissions.

use portfolio_contact_api::{models::ContactForm, ClientInfo};

/// The well-formed submission used throughout the tests.
pub fn valid_form() -> ContactForm {
    ContactForm {
        name: "John Smith".to_string(),
        email: "john@x.com".to_string(),
        subject: "Hi".to_string(),
        message: "Interested in working together on a project, let's talk".to_string(),
    }
}

/// A valid form with a distinct name so records can be told apart.
pub fn numbered_form(i: usize) -> ContactForm {
    ContactForm {
        name: format!("Sender {}", i),
        ..valid_form()
    }
}

pub fn client(ip: &str) -> ClientInfo {
    ClientInfo {
        identifier: ip.to_string(),
        user_agent: Some("integration-test/1.0".to_string()),
    }
}

/// A pool of distinct client identifiers in 10.x.x.x.
pub fn generate_ips(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let a = (i >> 16) & 0xFF;
            let b = (i >> 8) & 0xFF;
            let c = i & 0xFF;
            format!("10.{}.{}.{}", a, b, c)
        })
        .collect()
}

/// Messages that must be rejected by the spam checker.
pub fn spam_messages() -> Vec<&'static str> {
    vec![
        "Visit https://cheap-deals.example.com today",
        "BUY NOW while stocks last",
        "Please Click Here to claim",
        "Limited Time offer on everything",
        "Get FREE MONEY instantly",
        "Learn to make money fast from home",
        "Best online casino bonuses",
        "Discount VIAGRA available",
        "Order your pills today",
        "spam spam spam spam spam spam spam spam spam spam",
    ]
}

/// Messages that must pass the spam checker.
pub fn clean_messages() -> Vec<&'static str> {
    vec![
        "Interested in working together on a project, let's talk",
        "I enjoyed your article about Rust error handling.",
        "Could we schedule a call next week to discuss a contract role?",
        "ok ok ok ok ok",
        "Thanks!",
    ]
}
