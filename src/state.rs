// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::AuthConfig;
use crate::storage::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, auth: AuthConfig) -> Self {
        Self { store, auth }
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory store and the fixed test signing key.
    pub fn for_tests() -> Self {
        Self::new(
            Arc::new(crate::storage::InMemoryStore::new()),
            crate::auth::test_keys::auth_config(),
        )
    }
}
