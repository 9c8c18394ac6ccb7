//! `intaked` serves the intake submission API.
//!
//! Usage:
//!   intaked [--config <file.toml>] [--listen <addr>] [--data-dir <dir>] ...
//!
//! Every flag also reads an `INTAKE_*` environment variable.

mod config;
mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use intake_core::Module;
use tokio::signal;
use tracing::info;

/// Intake submission server.
#[derive(Parser, Debug)]
#[command(name = "intaked", about = "Intake submission server")]
struct Cli {
    /// Optional TOML config file.
    #[arg(short = 'c', long = "config", env = "INTAKE_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: config::Overrides,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Some(path) = &cli.config {
        info!("Loading configuration from {}", path.display());
    }
    let config = config::resolve(cli.config.as_deref(), cli.overrides)?;

    if let Some(dir) = &config.data_dir {
        std::fs::create_dir_all(dir)?;
    }
    let db_path = config.resolve_db_path();
    let kv: Arc<dyn intake_kv::KVStore> = Arc::new(
        intake_kv::RedbStore::open(&db_path)
            .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?,
    );
    info!("Database at {}", db_path.display());

    let submission_module = submission::SubmissionModule::new(kv, config.product_lines.clone())
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    if !config.product_lines.is_empty() {
        info!("Product line catalog: {}", config.product_lines.join(", "));
    }
    info!("{} module initialized", submission_module.name());

    let app = routes::build_router(&config, &[&submission_module])?;

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("Intake server listening on {}", config.listen);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
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
    info!("Shutting down");
}
