// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, sync::Arc};

use antibiotic_backend::{
    api::router,
    auth::AuthConfig,
    config::{AppConfig, StoreBackend},
    logging::{init_tracing, log_format_from_env},
    state::AppState,
    storage::{InMemoryStore, RecordStore, RedbStore, DATABASE_FILE},
};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing(log_format_from_env());

    let config =
        AppConfig::from_env().inspect_err(|e| error!(error = %e, "Invalid configuration"))?;

    let store: Arc<dyn RecordStore> = match config.store_backend {
        StoreBackend::Redb => {
            let path = config.data_dir.join(DATABASE_FILE);
            info!(path = %path.display(), "Opening redb record store");
            Arc::new(
                RedbStore::open(&path, &config.users_table, &config.metrics_table)
                    .inspect_err(|e| error!(error = %e, "Failed to open record store"))?,
            )
        }
        StoreBackend::Memory => {
            info!("Using in-memory record store; data is lost on exit");
            Arc::new(InMemoryStore::new())
        }
    };

    let auth = AuthConfig::from_settings(&config.auth)?;
    info!(
        issuer = %config.auth.issuer,
        jwks_url = %config.auth.jwks_url,
        "Verifying bearer tokens"
    );

    let app = router(AppState::new(store, auth));

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Antibiotic backend listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
