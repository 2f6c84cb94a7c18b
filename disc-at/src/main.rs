//! disc-at (Assessment Test) - DISC questionnaire service
//!
//! Issues test links, administers the 28-item questionnaire and serves
//! scored results as JSON over HTTP.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use disc_common::config::{ServiceConfig, TomlConfig};
use disc_common::db::init_database;
use disc_at::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for disc-at
#[derive(Parser, Debug)]
#[command(name = "disc-at")]
#[command(about = "DISC assessment test service")]
#[command(version)]
struct Args {
    /// Root folder holding the database
    #[arg(short, long, env = "DISC_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "DISC_AT_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "DISC_AT_PORT")]
    port: Option<u16>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "disc_at=info,disc_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting DISC Assessment Test (disc-at) v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let file = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration file")?;
    let config = ServiceConfig::resolve(
        args.root_folder.as_deref(),
        args.host.as_deref(),
        args.port,
        &file,
    );

    config
        .ensure_root_folder()
        .context("Failed to initialize root folder")?;
    info!("Database: {}", config.database.path.display());

    let pool = init_database(&config.database)
        .await
        .context("Failed to open database")?;

    let app = build_router(AppState::new(pool.clone()));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("disc-at listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
