// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Record Storage
//!
//! Handlers talk to persistence only through [`RecordStore`], which exposes
//! the three primitives the API needs from a key-value store: single-item
//! get, single-item put (upsert) and a range query within one partition.
//!
//! ## Table Layout
//!
//! ```text
//! {USERS_TABLE}
//!   email                   -> UserRecord (JSON)
//! {METRICS_TABLE}
//!   (metricId, datetime)    -> MetricRecord (JSON)
//! ```
//!
//! `datetime` orders byte-wise, so "latest" means the lexicographically
//! greatest sort key, whatever format callers chose.
//!
//! ## Implementations
//!
//! - [`RedbStore`] - embedded ACID database file (default)
//! - [`InMemoryStore`] - process-local maps, used by tests and `STORE_BACKEND=memory`

pub mod memory;
pub mod redb_store;

pub use memory::InMemoryStore;
pub use redb_store::{RedbStore, DATABASE_FILE};

use crate::models::{MetricRecord, UserRecord};

/// Error type for record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value persistence for users and metrics.
///
/// Methods are synchronous and must not be called while holding any other
/// in-process lock. Implementations provide per-item atomicity; nothing
/// spans more than one item.
pub trait RecordStore: Send + Sync {
    /// Look up a user by email.
    fn get_user(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Insert or overwrite a user keyed by `user.email`.
    fn put_user(&self, user: &UserRecord) -> StoreResult<()>;

    /// Insert or overwrite a metric keyed by `(metric_id, datetime)`.
    fn put_metric(&self, metric: &MetricRecord) -> StoreResult<()>;

    /// The metric with the greatest `datetime` in the partition, if any.
    fn latest_metric(&self, metric_id: &str) -> StoreResult<Option<MetricRecord>>;

    /// All metrics in the partition with `from <= datetime <= to`, ascending.
    ///
    /// An inverted range (`from > to`) yields an empty list.
    fn metrics_between(&self, metric_id: &str, from: &str, to: &str)
        -> StoreResult<Vec<MetricRecord>>;

    /// Verify the store can serve requests.
    fn health_check(&self) -> StoreResult<()>;
}
