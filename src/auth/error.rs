// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// Every guard failure ends up here and is rendered exactly once, by
/// [`IntoResponse`], as `{"code": ..., "description": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header present
    AuthorizationHeaderMissing,
    /// Header or token could not be used; carries the description
    InvalidHeader(&'static str),
    /// Token `exp` is in the past
    TokenExpired,
    /// Issuer, audience or another registered claim did not validate
    InvalidClaims,
    /// Signing keys could not be fetched
    KeySetUnavailable(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    code: &'static str,
    description: String,
}

impl AuthError {
    pub const MUST_START_WITH_BEARER: &'static str = "Authorization header must start with Bearer";
    pub const TOKEN_NOT_FOUND: &'static str = "Token not found";
    pub const MUST_BE_BEARER_TOKEN: &'static str = "Authorization header must be Bearer token";
    pub const UNPARSEABLE_TOKEN: &'static str = "Unable to parse authentication token.";
    pub const UNSUPPORTED_ALGORITHM: &'static str =
        "Invalid header. Use an RS256 signed JWT Access Token";
    pub const NO_MATCHING_KEY: &'static str = "Unable to find appropriate key";

    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::AuthorizationHeaderMissing => "authorization_header_missing",
            AuthError::InvalidHeader(_) => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::KeySetUnavailable(_) => "jwks_unavailable",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AuthorizationHeaderMissing
            | AuthError::InvalidHeader(_)
            | AuthError::TokenExpired
            | AuthError::InvalidClaims => StatusCode::UNAUTHORIZED,
            AuthError::KeySetUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::AuthorizationHeaderMissing => write!(f, "Authorization header is expected"),
            AuthError::InvalidHeader(description) => write!(f, "{description}"),
            AuthError::TokenExpired => write!(f, "token is expired"),
            AuthError::InvalidClaims => {
                write!(f, "incorrect claims, please check the audience and issuer")
            }
            AuthError::KeySetUnavailable(msg) => write!(f, "Unable to fetch signing keys: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            code: self.code(),
            description: self.to_string(),
        });
        (status, body).into_response()
    }
}
