// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::Deserialize;

/// Claims read from a verified access token.
///
/// `exp`, `iss` and `aud` are checked by the validator against the raw
/// payload and not kept here; `aud` may be a string or an array.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (the provider's user ID)
    pub sub: String,
}

/// Authenticated caller, attached to request extensions by the auth guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Token subject
    pub subject: String,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: AccessTokenClaims) -> Self {
        Self {
            subject: claims.sub,
        }
    }
}
