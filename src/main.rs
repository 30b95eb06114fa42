//! HTTP RPC server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client POST ──▶ HttpServer ──▶ RpcServer ──▶ AccessFilter
//!                    (axum layers)       │
//!                                        ├──▶ CodecRegistry (Content-Type)
//!                                        ├──▶ ServiceRegistry (Service.Method)
//!                                        └──▶ method(receiver, ctx, args, &mut reply)
//!     Client ◀────── codec response ◀────┘
//! ```
//!
//! Serves the `Arith` demo service over the JSON codec.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use thiserror::Error;
use tokio::net::TcpListener;

use httprpc::codec::json::JsonCodec;
use httprpc::config::{load_config, ConfigError, RpcConfig};
use httprpc::demo::Arith;
use httprpc::lifecycle::{shutdown_on_signal, Shutdown};
use httprpc::observability::{logging, metrics};
use httprpc::{AccessError, HttpServer, RegistryError, RpcServer};

#[derive(Parser)]
#[command(name = "httprpc")]
#[command(about = "HTTP RPC server", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to install logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RpcConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level)?;
    tracing::info!("httprpc v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| ServerError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let mut rpc = RpcServer::new();
    rpc.configure(&config)?;
    rpc.register_codec(JsonCodec, "application/json");
    rpc.register_service(Arc::new(Arith), "")?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        allow = ?rpc.filter().allowed(),
        max_body_bytes = config.limits.max_body_bytes,
        request_timeout_secs = config.limits.request_timeout_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| ServerError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let stopped = shutdown.signal();
    tokio::spawn(shutdown_on_signal(shutdown));

    HttpServer::new(Arc::new(rpc))
        .run(listener, stopped)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
