//! Bazaar - a peer-to-peer auction house on the command line.

use anyhow::Context;
use bazaar_node::{observability, InteractionLoop, Node, NodeConfig, StdConsole};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;

/// Bazaar - peer-to-peer auctions
#[derive(Parser, Debug)]
#[command(name = "bazaar")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// P2P listen address
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Peer to connect to on startup (repeatable)
    #[arg(long)]
    bootstrap: Vec<SocketAddr>,

    /// Topic shared by the auction house's peers
    #[arg(long, env = "BAZAAR_TOPIC")]
    topic: Option<String>,

    /// Hex-encoded ed25519 secret key
    #[arg(long, env = "BAZAAR_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    /// Loads the config file, if any, and applies command line overrides.
    fn into_config(self) -> anyhow::Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_yaml_file(path)?,
            None => NodeConfig::default(),
        };

        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if !self.bootstrap.is_empty() {
            config.bootstrap = self.bootstrap;
        }
        if let Some(topic) = self.topic {
            config.topic = topic;
        }
        if self.secret_key.is_some() {
            config.secret_key = self.secret_key;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        config.log_json |= self.log_json;

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Args::parse().into_config()?;
    observability::init_logging(&config.log_level, config.log_json);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Bazaar node");

    let identity = config.identity()?;
    let node = Node::start(&config, identity)
        .await
        .context("failed to start node")?;

    for addr in &config.bootstrap {
        if let Err(e) = node.connect(*addr).await {
            tracing::warn!(addr = %addr, error = %e, "Failed to connect to bootstrap peer");
        }
    }

    println!("Peer {} listening on {}", node.peer_key(), node.listen_addr());

    let house = node.house();
    println!("List of auctions");
    for auction in house.list().await? {
        println!("{auction}");
    }

    let mut notices = node.subscribe_notices();
    tokio::spawn(async move {
        loop {
            match notices.recv().await {
                Ok(received) => println!("[{}] {}", received.from.short(), received.notice),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Dropped notices");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut interaction = InteractionLoop::new(StdConsole::new(), house, node.peer_key().clone());
    interaction.run().await?;

    tracing::info!("Input closed, shutting down");
    Ok(())
}
