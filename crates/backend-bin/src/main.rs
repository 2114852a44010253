use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use backend_lib::{
    config::{Settings, DEFAULT_CONFIG_FILE},
    router::create_router,
    telemetry::init_tracing,
    AppState,
};
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tracing::info;

const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Complaint desk web server
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Address to listen on, overrides the config file
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Directory holding the JSON collections
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Settings::load_from(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    config.validate()?;

    init_tracing(&config)?;

    let state = Arc::new(AppState::from_settings(&config)?);
    let _session_sweeper = state.sessions.spawn_cleanup(SWEEP_INTERVAL);
    let _throttle_sweeper = state.throttle.spawn_cleanup(SWEEP_INTERVAL);

    let app = create_router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, data_dir = %config.data_dir.display(), "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(err) => tracing::error!(error = %err, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
