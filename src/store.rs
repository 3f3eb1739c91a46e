// SPDX-License-Identifier: PMPL-1.0-or-later
//! SurrealDB record store for contact submissions
//!
//! The service only talks to [`ContactStore`]; the concrete store is chosen
//! at startup and injected. [`SurrealStore`] runs on the in-memory engine
//! by default, or on RocksDB when built with the `rocksdb` feature and a
//! `store.path` is configured.

use crate::config::StoreConfig;
use crate::models::{ContactRecord, ContactStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use surrealdb::{
    engine::local::{Db, Mem},
    method::Query,
    Surreal,
};
use thiserror::Error;
use tracing::{debug, info};

#[cfg(feature = "rocksdb")]
use surrealdb::engine::local::RocksDb;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] surrealdb::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, StoreError>;

/// Conditions a record must satisfy. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    pub ip_address: Option<String>,
    /// Inclusive lower bound on `timestamp`
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `timestamp`
    pub before: Option<DateTime<Utc>>,
}

impl ContactFilter {
    /// Filter matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Records from `ip_address` at or after `since`.
    pub fn from_ip_since(ip_address: &str, since: DateTime<Utc>) -> Self {
        Self {
            ip_address: Some(ip_address.to_string()),
            since: Some(since),
            before: None,
        }
    }

    /// Records strictly older than `cutoff`.
    pub fn older_than(cutoff: DateTime<Utc>) -> Self {
        Self {
            before: Some(cutoff),
            ..Self::default()
        }
    }

    /// `WHERE` clause over bound parameters, empty when nothing is set.
    fn where_clause(&self) -> String {
        let mut conditions = Vec::new();

        if self.ip_address.is_some() {
            conditions.push("ip_address = $ip_address");
        }
        if self.since.is_some() {
            conditions.push("timestamp >= <datetime> $since");
        }
        if self.before.is_some() {
            conditions.push("timestamp < <datetime> $before");
        }

        if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        }
    }

    fn bind<'r>(&self, mut query: Query<'r, Db>) -> Query<'r, Db> {
        if let Some(ip) = &self.ip_address {
            query = query.bind(("ip_address", ip.clone()));
        }
        if let Some(since) = self.since {
            query = query.bind(("since", since));
        }
        if let Some(before) = self.before {
            query = query.bind(("before", before));
        }
        query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Timestamp,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordering applied by [`ContactStore::find_matching`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn newest_first() -> Self {
        Self {
            field: SortField::Timestamp,
            direction: SortDirection::Descending,
        }
    }

    fn order_clause(&self) -> String {
        let field = match self.field {
            SortField::Timestamp => "timestamp",
            SortField::Name => "name",
        };
        let direction = match self.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        format!(" ORDER BY {} {}", field, direction)
    }
}

/// Persistence operations over contact records.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Insert a record, returning the confirmed identifier.
    async fn insert(&self, record: ContactRecord) -> Result<String>;

    async fn count_matching(&self, filter: &ContactFilter) -> Result<u64>;

    async fn find_matching(
        &self,
        filter: &ContactFilter,
        sort: SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<ContactRecord>>;

    /// Delete matching records, returning how many were removed.
    async fn delete_matching(&self, filter: &ContactFilter) -> Result<u64>;
}

/// Row shape of the `contact` table. The record uuid lives in
/// `contact_id`; the table's own `id` is left to the database.
#[derive(Debug, Deserialize)]
struct ContactRow {
    contact_id: String,
    name: String,
    email: String,
    subject: String,
    message: String,
    timestamp: DateTime<Utc>,
    status: ContactStatus,
    ip_address: Option<String>,
    user_agent: Option<String>,
}

impl From<ContactRow> for ContactRecord {
    fn from(row: ContactRow) -> Self {
        Self {
            id: row.contact_id,
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            timestamp: row.timestamp,
            status: row.status,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
        }
    }
}

/// SurrealDB-backed store
#[derive(Clone)]
pub struct SurrealStore {
    db: Surreal<Db>,
}

impl SurrealStore {
    /// In-memory engine; contents last as long as the process.
    pub async fn memory() -> Result<Self> {
        let db = Surreal::new::<Mem>(()).await?;
        Self::init(db).await
    }

    /// RocksDB engine rooted at `path`.
    #[cfg(feature = "rocksdb")]
    pub async fn persistent(path: &Path) -> Result<Self> {
        let db = Surreal::new::<RocksDb>(&*path.to_string_lossy()).await?;
        Self::init(db).await
    }

    #[cfg(not(feature = "rocksdb"))]
    pub async fn persistent(path: &Path) -> Result<Self> {
        Err(StoreError::Unavailable(format!(
            "{} requires building with the `rocksdb` feature",
            path.display()
        )))
    }

    async fn init(db: Surreal<Db>) -> Result<Self> {
        db.use_ns("portfolio").use_db("contacts").await?;

        db.query(
            r#"
            DEFINE TABLE IF NOT EXISTS contact SCHEMAFULL;
            DEFINE FIELD IF NOT EXISTS contact_id ON contact TYPE string;
            DEFINE FIELD IF NOT EXISTS name ON contact TYPE string;
            DEFINE FIELD IF NOT EXISTS email ON contact TYPE string;
            DEFINE FIELD IF NOT EXISTS subject ON contact TYPE string;
            DEFINE FIELD IF NOT EXISTS message ON contact TYPE string;
            DEFINE FIELD IF NOT EXISTS timestamp ON contact TYPE datetime;
            DEFINE FIELD IF NOT EXISTS status ON contact TYPE string;
            DEFINE FIELD IF NOT EXISTS ip_address ON contact TYPE option<string>;
            DEFINE FIELD IF NOT EXISTS user_agent ON contact TYPE option<string>;

            DEFINE INDEX IF NOT EXISTS contact_id_idx ON contact COLUMNS contact_id UNIQUE;
            DEFINE INDEX IF NOT EXISTS ip_time_idx ON contact COLUMNS ip_address, timestamp;
        "#,
        )
        .await?
        .check()?;

        Ok(Self { db })
    }
}

#[async_trait]
impl ContactStore for SurrealStore {
    async fn insert(&self, record: ContactRecord) -> Result<String> {
        let mut result = self
            .db
            .query(
                r#"
                CREATE contact CONTENT {
                    contact_id: $contact_id,
                    name: $name,
                    email: $email,
                    subject: $subject,
                    message: $message,
                    timestamp: <datetime> $timestamp,
                    status: $status,
                    ip_address: $ip_address,
                    user_agent: $user_agent
                } RETURN contact_id
            "#,
            )
            .bind(("contact_id", record.id))
            .bind(("name", record.name))
            .bind(("email", record.email))
            .bind(("subject", record.subject))
            .bind(("message", record.message))
            .bind(("timestamp", record.timestamp))
            .bind(("status", record.status))
            .bind(("ip_address", record.ip_address))
            .bind(("user_agent", record.user_agent))
            .await?;

        let created: Option<String> = result.take((0, "contact_id"))?;
        Ok(created.unwrap_or_default())
    }

    async fn count_matching(&self, filter: &ContactFilter) -> Result<u64> {
        let sql = format!(
            "SELECT count() FROM contact{} GROUP ALL",
            filter.where_clause()
        );
        let mut result = filter.bind(self.db.query(sql)).await?;
        let count: Option<u64> = result.take("count")?;
        Ok(count.unwrap_or(0))
    }

    async fn find_matching(
        &self,
        filter: &ContactFilter,
        sort: SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<ContactRecord>> {
        let sql = format!(
            "SELECT * FROM contact{}{} LIMIT {} START {}",
            filter.where_clause(),
            sort.order_clause(),
            limit,
            skip
        );
        let mut result = filter.bind(self.db.query(sql)).await?;
        let rows: Vec<ContactRow> = result.take(0)?;
        Ok(rows.into_iter().map(ContactRecord::from).collect())
    }

    async fn delete_matching(&self, filter: &ContactFilter) -> Result<u64> {
        let sql = format!("DELETE contact{} RETURN BEFORE", filter.where_clause());
        let mut result = filter.bind(self.db.query(sql)).await?;
        let deleted: Vec<ContactRow> = result.take(0)?;
        debug!(deleted = deleted.len(), "Deleted contact records");
        Ok(deleted.len() as u64)
    }
}

/// Open the store described by `config`.
pub async fn open(config: &StoreConfig) -> Result<Arc<dyn ContactStore>> {
    let store = match &config.path {
        Some(path) => {
            info!(path = %path.display(), "Opening persistent contact store");
            SurrealStore::persistent(path).await?
        }
        None => {
            info!("Using in-memory contact store");
            SurrealStore::memory().await?
        }
    };
    Ok(Arc::new(store))
}
