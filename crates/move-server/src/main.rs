//! Move Server
//!
//! Serves skill-calibrated chess moves over HTTP, backed by one shared UCI
//! engine process, plus the static front-end.

use clap::Parser;
use move_arbiter::{Arbiter, UciEngine};
use move_server::config::ServerConfig;
use move_server::{app, AppState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;

/// Move Server - chess moves at a requested playing strength.
#[derive(Parser)]
#[command(name = "move-server")]
#[command(about = "Serves chess moves at a requested playing strength")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Path to the UCI engine executable
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Directory with static front-end files
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

impl Args {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(engine) = self.engine {
            config.engine.path = engine;
        }
        if let Some(static_dir) = self.static_dir {
            config.server.static_dir = static_dir;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(ServerConfig::default_path);
    let mut config = ServerConfig::load(&config_path)?;
    args.apply(&mut config);

    tracing::info!("Config: {:?}", config_path);
    tracing::info!("Engine: {:?}", config.engine.path);
    tracing::info!("Static files: {:?}", config.server.static_dir);

    let engine = Arc::new(UciEngine::start(&config.engine).await);
    let arbiter = Arbiter::new(Arc::clone(&engine), StdRng::from_entropy());
    let state = AppState::new(arbiter, config.server.default_skill_rating);

    let router = app(state, &config.server);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    engine.shutdown().await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl+c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
    tracing::info!("Shutdown signal received");
}
