// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Shared fixtures for contact API integration tests.

#![allow(dead_code)]

pub mod doubles;
pub mod generators;

use portfolio_contact_api::{
    config::Config,
    handlers::AppState,
    store::{ContactStore, SurrealStore},
    ContactService,
};
use std::sync::Arc;

/// A fresh store on the in-memory engine.
pub async fn memory_store() -> Arc<SurrealStore> {
    Arc::new(SurrealStore::memory().await.unwrap())
}

/// Application state around `store` using default configuration.
pub fn state_with(store: Arc<dyn ContactStore>) -> Arc<AppState> {
    AppState::build(&Config::default(), store).unwrap()
}

/// Contact service around `store` using default configuration.
pub fn service_with(store: Arc<dyn ContactStore>) -> ContactService {
    state_with(store).service.clone()
}
