use anyhow::Result;
use clap::Parser;
use drowsy_guard::adapters::outbound::{flush_file_logger, init_buffered_logger, init_combined_logger};
use drowsy_guard::application::{GeoBackend, PresenceService};
use drowsy_guard::Config;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "drowsy-guard")]
#[command(about = "Driver presence tracking and drowsiness alert fan-out")]
struct Cli {
    /// Path to the TOML configuration file (defaults are used if it is missing)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Host to bind to (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides the config file and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Position index backend: memory or redis
    #[arg(long, default_value_t = GeoBackend::Memory)]
    backend: GeoBackend,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config).await?;
    config.apply_env()?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;
    info!("Configuration loaded (backend: {}, radius: {} m)", cli.backend, config.presence.nearby_distance_m);

    let logger = init_buffered_logger(
        init_combined_logger(&config.logging.file),
        config.logging.buffer_capacity,
    );

    let service = PresenceService::from_config(&config, cli.backend, logger).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Driver Safety Backend running on {}", addr);

    service.serve(listener, shutdown_signal()).await?;

    info!("Server closed");
    flush_file_logger();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl-C received. Shutting down gracefully..."),
        _ = terminate => info!("SIGTERM received. Shutting down gracefully..."),
    }
}
