//! docent-server - REST API server binary.

use std::net::SocketAddr;

use docent_core::DocentConfig;
use docent_server::{create_server, AppState};
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    let server_directive: Directive = "docent_server=debug".parse()?;
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive(server_directive),
        )
        .init();

    // DOCENT_CONFIG points at a file; otherwise DOCENT_* variables apply
    let config = match std::env::var("DOCENT_CONFIG") {
        Ok(path) => {
            info!(path = %path, "Loading configuration file");
            DocentConfig::from_file(path)?
        }
        Err(_) => DocentConfig::from_env()?,
    };

    tokio::fs::create_dir_all(&config.storage.blob_dir).await?;

    let state = AppState::from_config(&config)?;
    let seeded = state.seed_providers(&config).await?;
    if seeded > 0 {
        info!(count = seeded, "Seeded providers from configuration");
    }

    let app = create_server(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(
        blob_dir = %config.storage.blob_dir.display(),
        "Starting docent-server on {}", addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server stopped cleanly");
    Ok(())
}
