//! IX peering configuration generator.
//!
//! # Architecture Overview
//!
//! ```text
//!     GET /api/...            ┌──────────┐     ┌───────────────┐     ┌──────────────┐
//!     ───────────────────────▶│   http   │────▶│   registry    │────▶│ cache/{ix,   │
//!                             │ handlers │     │ QueryEngine   │     │ ixlan,...}   │
//!                             └──────────┘     └───────────────┘     └──────────────┘
//!                                                      ▲
//!     POST /ixgen/{v}/{s}     ┌──────────┐     ┌───────┴───────┐
//!     ───────────────────────▶│  submit  │────▶│   peering     │  RegistryClient
//!                             └────┬─────┘     │  MergeWorker  │  (HTTP or local)
//!                                  │           └───────────────┘
//!                                  ▼
//!                             ┌──────────┐
//!     ◀───────────────────────│  render  │  templates/{vendor}/{style}/router.hbs
//!       router configuration  └──────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use ixgen::config::{load_config, validate_config, ServerConfig};
use ixgen::lifecycle::{wait_for_signal, Shutdown};
use ixgen::observability::{logging, metrics};
use ixgen::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "ixgen", version, about = "IX peering configuration generator")]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overrides `listener.bind_address`.
    #[arg(short, long)]
    listen: Option<String>,

    /// Snapshot directory, overrides `cache.directory`.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Template root, overrides `templates.directory`.
    #[arg(long)]
    template_dir: Option<PathBuf>,
}

impl Args {
    fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(listen) = self.listen {
            config.listener.bind_address = listen;
        }
        if let Some(dir) = self.cache_dir {
            config.cache.directory = dir;
        }
        if let Some(dir) = self.template_dir {
            config.templates.directory = dir;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    let config = args.apply(config);
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("invalid configuration: {}", error);
        }
        return Err("configuration rejected".into());
    }

    logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ixgen starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        cache_directory = %config.cache.directory.display(),
        template_directory = %config.templates.directory.display(),
        registry = config.registry.url.as_deref().unwrap_or("loopback"),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await;
    shutdown.trigger();

    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
