// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tracing subscriber setup.
//!
//! `RUST_LOG` controls filtering; `LOG_FORMAT=json` switches to one JSON
//! object per line for log shippers.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LOG_FORMAT_ENV};

/// Filter used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Read `LOG_FORMAT` from the environment.
pub fn log_format_from_env() -> LogFormat {
    LogFormat::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
}

/// Install the global tracing subscriber.
///
/// Must be called once, before anything logs. A second call is a no-op.
pub fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match format {
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
        LogFormat::Pretty => builder.try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {e}");
    }
}
