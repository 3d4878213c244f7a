// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Record store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - users table: `email` → serialized [`UserRecord`]
//! - metrics table: `(metricId, datetime)` → serialized [`MetricRecord`]
//!
//! Table names come from configuration, so two deployments can share one
//! database file without colliding. Tuple keys compare element-wise, which
//! keeps every partition contiguous and sorted by `datetime`.

use std::path::Path;

use redb::backends::InMemoryBackend;
use redb::{Database, ReadableDatabase, TableDefinition};

use super::{RecordStore, StoreResult};
use crate::models::{MetricRecord, UserRecord};

/// File name of the database inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "antibiotic.redb";

type UsersTable<'a> = TableDefinition<'a, &'static str, &'static [u8]>;
type MetricsTable<'a> = TableDefinition<'a, (&'static str, &'static str), &'static [u8]>;

/// Smallest partition key that sorts after every key of `metric_id`'s
/// partition.
///
/// `(metric_id, _) < (metric_id + "\0", "")` for any sort key, and no other
/// partition falls in between.
fn partition_end(metric_id: &str) -> String {
    format!("{metric_id}\0")
}

/// Embedded ACID record store.
pub struct RedbStore {
    db: Database,
    users_table: String,
    metrics_table: String,
}

impl RedbStore {
    /// Open (or create) the database at the given path.
    ///
    /// Table names must be non-empty and distinct.
    pub fn open(
        path: &Path,
        users_table: impl Into<String>,
        metrics_table: impl Into<String>,
    ) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Self::with_database(db, users_table.into(), metrics_table.into())
    }

    /// Create a database that lives only in memory.
    pub fn in_memory(
        users_table: impl Into<String>,
        metrics_table: impl Into<String>,
    ) -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::with_database(db, users_table.into(), metrics_table.into())
    }

    fn with_database(db: Database, users_table: String, metrics_table: String) -> StoreResult<Self> {
        let store = Self {
            db,
            users_table,
            metrics_table,
        };

        // Pre-create both tables so later read transactions don't fail
        let write_txn = store.db.begin_write()?;
        {
            let _ = write_txn.open_table(store.users())?;
            let _ = write_txn.open_table(store.metrics())?;
        }
        write_txn.commit()?;

        Ok(store)
    }

    fn users(&self) -> UsersTable<'_> {
        TableDefinition::new(&self.users_table)
    }

    fn metrics(&self) -> MetricsTable<'_> {
        TableDefinition::new(&self.metrics_table)
    }
}

impl RecordStore for RedbStore {
    fn get_user(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(self.users())?;
        match table.get(email)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn put_user(&self, user: &UserRecord) -> StoreResult<()> {
        let json = serde_json::to_vec(user)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(self.users())?;
            table.insert(user.email.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn put_metric(&self, metric: &MetricRecord) -> StoreResult<()> {
        let json = serde_json::to_vec(metric)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(self.metrics())?;
            table.insert(
                (metric.metric_id.as_str(), metric.datetime.as_str()),
                json.as_slice(),
            )?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn latest_metric(&self, metric_id: &str) -> StoreResult<Option<MetricRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(self.metrics())?;

        let end = partition_end(metric_id);
        let mut range = table.range((metric_id, "")..(end.as_str(), ""))?;

        match range.next_back() {
            Some(entry) => {
                let (_, value) = entry?;
                Ok(Some(serde_json::from_slice(value.value())?))
            }
            None => Ok(None),
        }
    }

    fn metrics_between(
        &self,
        metric_id: &str,
        from: &str,
        to: &str,
    ) -> StoreResult<Vec<MetricRecord>> {
        if from > to {
            return Ok(Vec::new());
        }

        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(self.metrics())?;

        table
            .range((metric_id, from)..=(metric_id, to))?
            .map(|entry| -> StoreResult<MetricRecord> {
                let (_, value) = entry?;
                Ok(serde_json::from_slice(value.value())?)
            })
            .collect()
    }

    fn health_check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        read_txn.open_table(self.users())?;
        read_txn.open_table(self.metrics())?;
        Ok(())
    }
}
