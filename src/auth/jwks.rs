// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Behaviour
//!
//! - Keys are fetched from the identity provider's well-known endpoint
//! - Keys are cached with a configurable TTL
//! - Only RSA keys are usable; tokens must be RS256-signed
//!
//! A manager can also be built over a fixed key set, which never touches
//! the network.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::DecodingKey;
use tokio::sync::RwLock;

use super::error::AuthError;
use crate::config::DEFAULT_JWKS_CACHE_TTL_SECS;

/// Timeout for a single JWKS request.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// JWKS cache entry.
struct CacheEntry {
    jwks: JwkSet,
    fetched_at: Instant,
}

#[derive(Clone)]
enum KeySource {
    Remote { url: String, client: reqwest::Client },
    Fixed(JwkSet),
}

/// JWKS manager with caching.
#[derive(Clone)]
pub struct JwksManager {
    source: KeySource,
    /// Cache TTL
    cache_ttl: Duration,
    /// Cached JWKS
    cache: Arc<RwLock<Option<CacheEntry>>>,
}

impl JwksManager {
    /// Create a manager that fetches keys from `jwks_url`.
    ///
    /// # Arguments
    /// - `jwks_url`: The JWKS endpoint URL (e.g., `https://tenant.auth0.com/.well-known/jwks.json`)
    pub fn new(jwks_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;

        Ok(Self {
            source: KeySource::Remote {
                url: jwks_url.into(),
                client,
            },
            cache_ttl: Duration::from_secs(DEFAULT_JWKS_CACHE_TTL_SECS),
            cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Create a manager over a fixed key set.
    pub fn from_key_set(jwks: JwkSet) -> Self {
        Self {
            source: KeySource::Fixed(jwks),
            cache_ttl: Duration::from_secs(DEFAULT_JWKS_CACHE_TTL_SECS),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// The JWKS URL, if keys are fetched remotely.
    pub fn jwks_url(&self) -> Option<&str> {
        match &self.source {
            KeySource::Remote { url, .. } => Some(url),
            KeySource::Fixed(_) => None,
        }
    }

    /// Fetch JWKS (with caching).
    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        let (url, client) = match &self.source {
            KeySource::Fixed(jwks) => return Ok(jwks.clone()),
            KeySource::Remote { url, client } => (url, client),
        };

        // Check cache first
        {
            let cache = self.cache.read().await;
            if let Some(entry) = &*cache {
                if entry.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(entry.jwks.clone());
                }
            }
        }

        let jwks = fetch_jwks(client, url).await?;

        {
            let mut cache = self.cache.write().await;
            *cache = Some(CacheEntry {
                jwks: jwks.clone(),
                fetched_at: Instant::now(),
            });
        }

        Ok(jwks)
    }

    /// Get a decoding key for the given key ID.
    pub async fn get_decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let jwks = self.get_jwks().await?;

        let jwk = jwks
            .find(kid)
            .ok_or(AuthError::InvalidHeader(AuthError::NO_MATCHING_KEY))?;

        rsa_decoding_key(jwk).ok_or(AuthError::InvalidHeader(AuthError::NO_MATCHING_KEY))
    }

    /// Get the first usable decoding key (for tokens without kid).
    pub async fn get_any_decoding_key(&self) -> Result<DecodingKey, AuthError> {
        let jwks = self.get_jwks().await?;

        jwks.keys
            .iter()
            .find_map(rsa_decoding_key)
            .ok_or(AuthError::InvalidHeader(AuthError::NO_MATCHING_KEY))
    }

    /// Force refresh the JWKS cache.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let KeySource::Remote { url, client } = &self.source else {
            return Ok(());
        };

        let jwks = fetch_jwks(client, url).await?;
        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            jwks,
            fetched_at: Instant::now(),
        });
        Ok(())
    }

    /// Check if usable keys are available without a network round trip.
    pub async fn is_cached(&self) -> bool {
        if matches!(self.source, KeySource::Fixed(_)) {
            return true;
        }

        let cache = self.cache.read().await;
        if let Some(entry) = &*cache {
            entry.fetched_at.elapsed() < self.cache_ttl
        } else {
            false
        }
    }
}

/// Fetch JWKS from the endpoint.
async fn fetch_jwks(client: &reqwest::Client, url: &str) -> Result<JwkSet, AuthError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(AuthError::KeySetUnavailable(format!(
            "HTTP {} from JWKS endpoint",
            response.status()
        )));
    }

    let jwks: JwkSet = response
        .json()
        .await
        .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

    tracing::debug!(keys = jwks.keys.len(), "Fetched JWKS");
    Ok(jwks)
}

/// Convert an RSA JWK to a DecodingKey; other key types are skipped.
fn rsa_decoding_key(jwk: &Jwk) -> Option<DecodingKey> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => DecodingKey::from_rsa_components(&rsa.n, &rsa.e).ok(),
        _ => None,
    }
}
