// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication for the record endpoints.
//!
//! ## Auth Flow
//!
//! 1. Client obtains an RS256 access token from the identity provider
//! 2. Client sends `Authorization: Bearer <token>`
//! 3. Server:
//!    - Fetches the provider JWKS via HTTPS
//!    - Verifies signature, expiry, issuer, audience
//!    - Attaches the verified claims to the request
//!
//! ## Security
//!
//! - All record endpoints require authentication
//! - JWKS is cached with TTL
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod jwks;
pub mod middleware;

#[cfg(test)]
pub(crate) mod test_keys;

pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use jwks::JwksManager;
pub use middleware::{require_auth, AuthConfig};
