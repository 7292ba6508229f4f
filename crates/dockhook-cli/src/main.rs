//! # dockhook — container event hooks
//!
//! Watches a container runtime's lifecycle event stream and notifies every
//! configured plugin process of each event over JSON-RPC, logging the
//! outcomes. Exits non-zero only on unrecoverable startup failure or when
//! the event stream dies.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use dockhook_common::config::Config;
use dockhook_dispatch::{EventDispatcher, Runner};
use dockhook_plugin::PluginRegistry;
use dockhook_runtime::{ContainerInspector, DockerClient};

/// Container runtime event hook daemon.
#[derive(Debug, Parser)]
#[command(name = dockhook_common::constants::APP_NAME, version, about)]
struct Cli {
    /// Path to an overriding config.yml file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    tracing::debug!(?config, "configuration resolved");

    let client = DockerClient::new(&config.docker.endpoint, config.docker.version.clone())
        .context("parsing runtime endpoint")?;
    client
        .ping()
        .await
        .with_context(|| format!("runtime unreachable at {}", config.docker.endpoint))?;

    let registry = PluginRegistry::build(
        &config.plugins,
        Duration::from_secs(config.call_timeout_secs),
    )
    .context("starting plugins")?;
    tracing::info!(plugins = registry.len(), "all plugins started");

    let dispatcher = Arc::new(EventDispatcher::new(
        ContainerInspector::new(client.clone()),
        Arc::new(registry),
    ));

    let feed = client
        .events()
        .await
        .context("subscribing to the event stream")?;
    tracing::info!(endpoint = %config.docker.endpoint, "watching runtime events");

    Runner::new(dispatcher)
        .run(feed)
        .await
        .context("event stream failed")?;
    Ok(())
}
