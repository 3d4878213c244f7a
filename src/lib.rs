// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Antibiotic backend - user profiles and heart-rate metrics over HTTP
//!
//! Records live in a key-value store; every record endpoint requires an
//! RS256 bearer token issued by the configured identity provider.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Bearer-token authentication (JWKS-verified JWT)
//! - `config` - Environment configuration
//! - `storage` - Record store trait with redb and in-memory backends

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
