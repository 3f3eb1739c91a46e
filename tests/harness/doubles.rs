// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Store doubles with switchable failures.

use async_trait::async_trait;
use portfolio_contact_api::{
    models::ContactRecord,
    store::{self, ContactFilter, ContactStore, SortSpec, StoreError, SurrealStore},
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// An in-memory [`SurrealStore`] whose operations can be made to fail.
pub struct FlakyStore {
    inner: SurrealStore,
    pub fail_count: AtomicBool,
    pub fail_insert: AtomicBool,
    pub fail_find: AtomicBool,
    /// Return an empty identifier from successful inserts
    pub blank_ids: AtomicBool,
    pub inserts: AtomicUsize,
}

impl FlakyStore {
    pub async fn new() -> Self {
        Self {
            inner: SurrealStore::memory().await.unwrap(),
            fail_count: AtomicBool::new(false),
            fail_insert: AtomicBool::new(false),
            fail_find: AtomicBool::new(false),
            blank_ids: AtomicBool::new(false),
            inserts: AtomicUsize::new(0),
        }
    }

    pub async fn failing_counts() -> Self {
        let store = Self::new().await;
        store.fail_count.store(true, Ordering::SeqCst);
        store
    }

    pub async fn failing_inserts() -> Self {
        let store = Self::new().await;
        store.fail_insert.store(true, Ordering::SeqCst);
        store
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    fn unavailable() -> StoreError {
        StoreError::Unavailable("simulated outage".to_string())
    }
}

#[async_trait]
impl ContactStore for FlakyStore {
    async fn insert(&self, record: ContactRecord) -> store::Result<String> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let id = self.inner.insert(record).await?;
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.blank_ids.load(Ordering::SeqCst) {
            return Ok(String::new());
        }
        Ok(id)
    }

    async fn count_matching(&self, filter: &ContactFilter) -> store::Result<u64> {
        if self.fail_count.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.count_matching(filter).await
    }

    async fn find_matching(
        &self,
        filter: &ContactFilter,
        sort: SortSpec,
        skip: u64,
        limit: u64,
    ) -> store::Result<Vec<ContactRecord>> {
        if self.fail_find.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.find_matching(filter, sort, skip, limit).await
    }

    async fn delete_matching(&self, filter: &ContactFilter) -> store::Result<u64> {
        self.inner.delete_matching(filter).await
    }
}
