//! pgBackRest Exporter Binary Entry Point
//!
//! This binary runs the complete exporter. Core functionality is provided
//! by the `pgbackrest_exporter` library crate.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use pgbackrest_exporter::{
    collector::{BackrestCollector, PgBackRestExecutor},
    config::AppConfig,
    metrics::MetricSet,
    server::{AppState, create_router},
};
use prometheus::Registry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// pgBackRest backup status exporter for Prometheus.
#[derive(Parser, Debug)]
#[command(name = "pgbackrest-exporter", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "PGBACKREST_EXPORTER_CONFIG")]
    config: Option<String>,

    /// Listen port (overrides config file)
    #[arg(long, env = "PGBACKREST_EXPORTER_PORT")]
    port: Option<u16>,

    /// Metrics endpoint path (overrides config file)
    #[arg(long, env = "PGBACKREST_EXPORTER_PATH")]
    path: Option<String>,

    /// TLS config file for the scrape listener (overrides config file)
    #[arg(long)]
    tls_config: Option<String>,

    /// pgBackRest configuration file passed to the tool
    #[arg(long)]
    backrest_config: Option<String>,

    /// pgBackRest configuration include directory passed to the tool
    #[arg(long)]
    backrest_config_include_path: Option<String>,

    /// Collect only this stanza (repeatable)
    #[arg(long = "stanza-include")]
    stanza_include: Vec<String>,

    /// Skip this stanza (repeatable)
    #[arg(long = "stanza-exclude")]
    stanza_exclude: Vec<String>,

    /// Publish WAL min/max labels on archive metrics
    #[arg(long)]
    verbose_wal: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            AppConfig::load(path)?
        }
        None => AppConfig::default(),
    };

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(port) = cli.port {
        config.exporter.port = port;
    }
    if let Some(path) = cli.path {
        config.exporter.path = path;
    }
    if let Some(tls_config) = cli.tls_config {
        config.exporter.tls_config_path = Some(tls_config);
    }
    if let Some(backrest_config) = cli.backrest_config {
        config.backrest.config = Some(backrest_config);
    }
    if let Some(include_path) = cli.backrest_config_include_path {
        config.backrest.config_include_path = Some(include_path);
    }
    if !cli.stanza_include.is_empty() {
        config.backrest.stanzas_include = cli.stanza_include;
    }
    if !cli.stanza_exclude.is_empty() {
        config.backrest.stanzas_exclude = cli.stanza_exclude;
    }
    if cli.verbose_wal {
        config.backrest.verbose_wal = true;
    }
    config.validate()?;

    if let Some(ref tls_path) = config.exporter.tls_config_path {
        tracing::warn!(
            tls_config = %tls_path,
            "TLS termination is not handled in-process; serving plaintext"
        );
    }

    let registry = Registry::new();
    let metrics = Arc::new(MetricSet::new(&registry)?);
    metrics.set_exporter_info(env!("CARGO_PKG_VERSION"));

    let collector = BackrestCollector::new(
        Arc::new(PgBackRestExecutor),
        Arc::clone(&metrics),
        config.backrest.clone(),
    );

    let state = Arc::new(AppState {
        collector,
        registry,
        collect_lock: tokio::sync::Mutex::new(()),
    });
    let app = create_router(state, &config.exporter.path);

    let addr: SocketAddr = format!("{}:{}", config.exporter.bind, config.exporter.port).parse()?;
    tracing::info!(
        "Metrics endpoint: http://{}{}",
        addr,
        config.exporter.path
    );
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
