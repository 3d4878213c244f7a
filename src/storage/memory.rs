// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-local record store.
//!
//! Mirrors the ordering of [`RedbStore`](super::RedbStore): metrics live in a
//! `BTreeMap` keyed by `(metricId, datetime)`, so partition scans and range
//! queries behave identically. Nothing survives a restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use super::{RecordStore, StoreError, StoreResult};
use crate::models::{MetricRecord, UserRecord};

#[derive(Default)]
struct Tables {
    users: HashMap<String, UserRecord>,
    metrics: BTreeMap<(String, String), MetricRecord>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }
}

impl RecordStore for InMemoryStore {
    fn get_user(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.read()?.users.get(email).cloned())
    }

    fn put_user(&self, user: &UserRecord) -> StoreResult<()> {
        self.write()?.users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    fn put_metric(&self, metric: &MetricRecord) -> StoreResult<()> {
        let key = (metric.metric_id.clone(), metric.datetime.clone());
        self.write()?.metrics.insert(key, metric.clone());
        Ok(())
    }

    fn latest_metric(&self, metric_id: &str) -> StoreResult<Option<MetricRecord>> {
        let start = (metric_id.to_string(), String::new());
        let end = (format!("{metric_id}\0"), String::new());

        Ok(self
            .read()?
            .metrics
            .range(start..end)
            .next_back()
            .map(|(_, metric)| metric.clone()))
    }

    fn metrics_between(
        &self,
        metric_id: &str,
        from: &str,
        to: &str,
    ) -> StoreResult<Vec<MetricRecord>> {
        // BTreeMap::range panics on an inverted range
        if from > to {
            return Ok(Vec::new());
        }

        let start = (metric_id.to_string(), from.to_string());
        let end = (metric_id.to_string(), to.to_string());

        Ok(self
            .read()?
            .metrics
            .range(start..=end)
            .map(|(_, metric)| metric.clone())
            .collect())
    }

    fn health_check(&self) -> StoreResult<()> {
        self.read().map(|_| ())
    }
}
