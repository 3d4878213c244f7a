// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied with `route_layer` to the protected routes only, so unmatched
//! paths and CORS preflights never reach it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         auth_config.clone(),
//!         require_auth,
//!     ));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, Validation};
use tracing::warn;

use super::claims::{AccessTokenClaims, AuthenticatedUser};
use super::error::AuthError;
use super::jwks::JwksManager;
use crate::config::AuthSettings;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Claims a token must carry to be considered at all.
const REQUIRED_CLAIMS: [&str; 3] = ["exp", "iss", "aud"];

/// Authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// JWKS manager for key fetching
    pub jwks: Arc<JwksManager>,
    /// Expected issuer (tenant URL, with trailing slash)
    pub issuer: String,
    /// Expected audience
    pub audience: String,
}

impl AuthConfig {
    pub fn new(jwks: JwksManager, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            jwks: Arc::new(jwks),
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Build from settings, fetching keys from the configured JWKS URL.
    pub fn from_settings(settings: &AuthSettings) -> Result<Self, reqwest::Error> {
        let jwks = JwksManager::new(&settings.jwks_url)?.with_cache_ttl(settings.jwks_cache_ttl);
        Ok(Self::new(jwks, &settings.issuer, &settings.audience))
    }
}

/// Authentication middleware function.
///
/// On success the verified [`AuthenticatedUser`] is inserted into the
/// request extensions before the handler runs.
pub async fn require_auth(
    State(config): State<AuthConfig>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &config).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            warn!(
                code = e.code(),
                description = %e,
                path = %request.uri().path(),
                "Rejected request"
            );
            e.into_response()
        }
    }
}

async fn authenticate(
    headers: &HeaderMap,
    config: &AuthConfig,
) -> Result<AuthenticatedUser, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::AuthorizationHeaderMissing)?;

    let value = header
        .to_str()
        .map_err(|_| AuthError::InvalidHeader(AuthError::MUST_BE_BEARER_TOKEN))?;

    let token = parse_bearer(value)?;
    validate_token(token, config).await
}

/// Split an `Authorization` value into its bearer token.
///
/// The scheme is matched exactly; the value must be two whitespace-separated
/// parts.
pub fn parse_bearer(value: &str) -> Result<&str, AuthError> {
    let mut parts = value.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        (Some("Bearer"), None, _) => Err(AuthError::InvalidHeader(AuthError::TOKEN_NOT_FOUND)),
        (Some("Bearer"), Some(_), Some(_)) => {
            Err(AuthError::InvalidHeader(AuthError::MUST_BE_BEARER_TOKEN))
        }
        _ => Err(AuthError::InvalidHeader(AuthError::MUST_START_WITH_BEARER)),
    }
}

/// Validate a JWT token and return the authenticated user.
pub async fn validate_token(
    token: &str,
    config: &AuthConfig,
) -> Result<AuthenticatedUser, AuthError> {
    let header =
        decode_header(token).map_err(|_| AuthError::InvalidHeader(AuthError::UNPARSEABLE_TOKEN))?;

    if header.alg != Algorithm::RS256 {
        return Err(AuthError::InvalidHeader(AuthError::UNSUPPORTED_ALGORITHM));
    }

    let decoding_key = match &header.kid {
        Some(kid) => config.jwks.get_decoding_key(kid).await?,
        None => config.jwks.get_any_decoding_key().await?,
    };

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&[&config.issuer]);
    validation.set_audience(&[&config.audience]);
    validation.set_required_spec_claims(&REQUIRED_CLAIMS);
    validation.validate_nbf = true;
    validation.leeway = CLOCK_SKEW_LEEWAY;

    let token_data = decode::<AccessTokenClaims>(token, &decoding_key, &validation).map_err(
        |e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::ImmatureSignature => AuthError::InvalidClaims,
            _ => AuthError::InvalidHeader(AuthError::UNPARSEABLE_TOKEN),
        },
    )?;

    Ok(AuthenticatedUser::from_claims(token_data.claims))
}
