//! record-gate - authenticated JSON records and file uploads over HTTP.
//!
//! This binary loads configuration, indexes the storage directory, and starts
//! the HTTP server.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use record_gate::{
    config::Config,
    server::create_router,
    store::{FileCatalog, IdGenerator, ResourceStore},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("record-gate v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Storage dir: {}", config.storage_dir.display());
    info!("  Max body: {} bytes", config.max_body_bytes);

    if config.auth_enabled {
        info!("  Auth: enabled");
    } else {
        warn!("  Auth: DISABLED - all endpoints are publicly accessible");
        warn!("        Only use this for local testing");
    }

    // Index files already on disk; an unreadable directory is fatal.
    let ids = Arc::new(IdGenerator::new());
    let files = match FileCatalog::load(&config.storage_dir, Arc::clone(&ids)).await {
        Ok(files) => files,
        Err(e) => {
            error!("Failed to load file catalog: {}", e);
            error!("  Create the directory or point --storage-dir at an existing one");
            return ExitCode::FAILURE;
        }
    };
    let records = ResourceStore::new(ids);

    let router = create_router(records, files, config.router_config());

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on: http://{}", addr);
    info!("  curl -X POST http://{}/login -d '{{\"username\":\"...\",\"password\":\"...\"}}'", addr);

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "record_gate=debug,tower_http=debug"
    } else {
        "record_gate=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolve when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
