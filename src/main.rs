//! steam-exporter - Prometheus exporter for Steam game servers
//!
//! Queries each configured server with A2S_INFO on every scrape.

mod collector;
mod config;
mod metrics;
mod probe;
mod web;

use crate::collector::Collector;
use crate::config::{Args, Config};
use crate::web::Server;

use clap::Parser;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(format!("steam_exporter={}", level).parse()?))
        .init();

    // Load configuration
    let cfg = Config::load(&args.config_file).map_err(|e| {
        tracing::error!("Error reading configuration: {}", e);
        e
    })?;
    tracing::info!(
        "Loaded {} servers from {}, timeout {:?}",
        cfg.servers.len(),
        args.config_file.display(),
        cfg.data_timeout
    );

    let collector = Collector::new(cfg.servers.clone(), cfg.data_timeout).map_err(|e| {
        tracing::error!("Can not create collector: {}", e);
        e
    })?;
    for target in collector.targets() {
        tracing::debug!("Probing {}", target.address);
    }

    // Start web server
    let server = Server::new(Arc::new(collector));
    server.start(&cfg.bind_address()).await?;

    Ok(())
}
