// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`AppConfig`] built from them once at startup. The process refuses to
//! start if a required variable is missing.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `USERS_TABLE` | Name of the users table | Required |
//! | `METRICS_TABLE` | Name of the metrics table | Required |
//! | `AUTH0_DOMAIN` | Identity provider domain (issuer host) | Required |
//! | `API_AUDIENCE` | Expected JWT audience claim | Required |
//! | `STORE_BACKEND` | `redb` or `memory` | `redb` |
//! | `DATA_DIR` | Directory holding the redb file | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWKS_CACHE_TTL_SECS` | JWKS cache lifetime in seconds | `300` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const USERS_TABLE_ENV: &str = "USERS_TABLE";
pub const METRICS_TABLE_ENV: &str = "METRICS_TABLE";

/// Identity provider domain, e.g. `example.eu.auth0.com`.
///
/// The expected issuer is `https://{domain}/` and signing keys are fetched
/// from `https://{domain}/.well-known/jwks.json`.
pub const AUTH0_DOMAIN_ENV: &str = "AUTH0_DOMAIN";
pub const API_AUDIENCE_ENV: &str = "API_AUDIENCE";

pub const STORE_BACKEND_ENV: &str = "STORE_BACKEND";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors raised while reading the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Which [`RecordStore`](crate::storage::RecordStore) implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redb,
    Memory,
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value, falling back to pretty output.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Settings for bearer-token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    /// Expected `iss` claim, with trailing slash.
    pub issuer: String,
    /// Expected `aud` claim.
    pub audience: String,
    /// Where to fetch the signing keys.
    pub jwks_url: String,
    pub jwks_cache_ttl: Duration,
}

/// Process-wide configuration, constructed once in `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub users_table: String,
    pub metrics_table: String,
    pub store_backend: StoreBackend,
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub auth: AuthSettings,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &'static str, default: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let users_table = required(USERS_TABLE_ENV)?;
        let metrics_table = required(METRICS_TABLE_ENV)?;
        if users_table == metrics_table {
            return Err(ConfigError::Invalid {
                name: METRICS_TABLE_ENV,
                value: metrics_table,
                reason: format!("must differ from {USERS_TABLE_ENV}"),
            });
        }

        let store_backend = match optional(STORE_BACKEND_ENV, "redb").to_ascii_lowercase().as_str() {
            "redb" => StoreBackend::Redb,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: STORE_BACKEND_ENV,
                    value: other.to_string(),
                    reason: "expected `redb` or `memory`".to_string(),
                })
            }
        };

        let host = optional(HOST_ENV, DEFAULT_HOST);
        let port = optional(PORT_ENV, &DEFAULT_PORT.to_string());
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: PORT_ENV,
                    value: format!("{host}:{port}"),
                    reason: e.to_string(),
                })?;

        let ttl_raw = optional(JWKS_CACHE_TTL_ENV, &DEFAULT_JWKS_CACHE_TTL_SECS.to_string());
        let ttl_secs: u64 = ttl_raw.parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::Invalid {
                name: JWKS_CACHE_TTL_ENV,
                value: ttl_raw.clone(),
                reason: e.to_string(),
            }
        })?;

        let domain = required(AUTH0_DOMAIN_ENV)?;
        let (issuer, jwks_url) = identity_urls(&domain)?;

        Ok(Self {
            users_table,
            metrics_table,
            store_backend,
            data_dir: PathBuf::from(optional(DATA_DIR_ENV, DEFAULT_DATA_DIR)),
            bind_addr,
            auth: AuthSettings {
                issuer,
                audience: required(API_AUDIENCE_ENV)?,
                jwks_url,
                jwks_cache_ttl: Duration::from_secs(ttl_secs),
            },
        })
    }
}

/// Derive the issuer and JWKS URLs from a provider domain.
///
/// Accepts a bare host (`tenant.auth0.com`) or a URL with scheme.
fn identity_urls(domain: &str) -> Result<(String, String), ConfigError> {
    let with_scheme = if domain.contains("://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    };

    let invalid = |reason: String| ConfigError::Invalid {
        name: AUTH0_DOMAIN_ENV,
        value: domain.to_string(),
        reason,
    };

    let mut issuer = Url::parse(&with_scheme).map_err(|e| invalid(e.to_string()))?;
    if issuer.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    issuer.set_path("/");

    let jwks = issuer
        .join(".well-known/jwks.json")
        .map_err(|e| invalid(e.to_string()))?;

    Ok((issuer.to_string(), jwks.to_string()))
}
