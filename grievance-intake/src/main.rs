//! grievance-intake - Hostel grievance intake and triage service
//!
//! Accepts complaint submissions over HTTP, stores them in SQLite and
//! classifies them through the external analysis service (direct path first,
//! batch CSV path as fallback).

use anyhow::{Context, Result};
use clap::Parser;
use grievance_common::config::DEFAULT_LOG_LEVEL;
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use grievance_intake::cli::Args;
use grievance_intake::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Subscriber goes in first so config loading is logged; the filter is
    // swapped for the configured level once the TOML file is read
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter_layer, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| default_filter(DEFAULT_LOG_LEVEL)));
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting grievance-intake v{}",
        env!("CARGO_PKG_VERSION")
    );

    let settings = args.load_settings()?;

    if !from_env {
        filter_handle
            .reload(default_filter(&settings.log_level))
            .context("Failed to apply configured log level")?;
    }

    info!("Database: {}", settings.database_path.display());
    let db_pool = grievance_common::db::init_database(&settings.database_path)
        .await
        .context("Failed to initialize database")?;
    info!("Database connection established");

    info!(
        base_url = %settings.analysis_base_url,
        timeout = ?settings.analysis_timeout,
        "Analysis service configured"
    );
    let state = AppState::from_settings(db_pool, &settings)
        .context("Failed to create analysis clients")?;

    let app = build_router(state);

    let host: std::net::IpAddr = settings
        .host
        .parse()
        .with_context(|| format!("Invalid host address: {}", settings.host))?;
    let addr = SocketAddr::new(host, settings.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Filter used when `RUST_LOG` is unset
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "grievance_intake={level},grievance_common={level},tower_http={level}"
    ))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
