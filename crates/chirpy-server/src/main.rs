mod cleanup;
mod config;

use std::net::SocketAddr;

use tracing::{info, warn};

use chirpy_api::AppStateInner;
use chirpy_auth::TokenIssuer;
use chirpy_db::{ContentFilter, Database};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirpy_server=debug,chirpy_api=debug,chirpy_db=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let filter = ContentFilter::new(&config.banned_words);
    let db = Database::open(&config.db_path, filter)?;

    let state = AppStateInner::new(db, TokenIssuer::new(&config.jwt_secret));

    tokio::spawn(cleanup::run_session_sweep(
        state.clone(),
        config.session_sweep_secs,
    ));

    let app = chirpy_api::router(state, &config.fileserver_root);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Chirpy listening on {}", addr);
    info!("Serving files from {}", config.fileserver_root.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Chirpy stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
