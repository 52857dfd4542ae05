//! VeilNet CLI
//!
//! Launches the directory, individual relays and users, or a whole local
//! network in one process.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use veilnet_core::NetworkConfig;
use veilnet_directory::Registry;

/// VeilNet - layered-encryption message circuits over local relays
#[derive(Parser)]
#[command(name = "veilnet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host services bind to and dial
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Directory port
    #[arg(long, default_value = "8080")]
    registry_port: u16,

    /// Base port for relays (relay n listens on base + n)
    #[arg(long, default_value = "4000")]
    base_relay_port: u16,

    /// Base port for users (user n listens on base + n)
    #[arg(long, default_value = "8000")]
    base_user_port: u16,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the node directory
    Registry,

    /// Run one onion relay (registers itself with the directory)
    Relay {
        /// Relay identifier; determines its listen port
        #[arg(short, long)]
        node_id: u32,
    },

    /// Run one user service
    User {
        /// User identifier; determines its listen port
        #[arg(short, long)]
        user_id: u32,
    },

    /// Run a whole local network in one process
    Network {
        /// Number of relays to launch
        #[arg(short, long, default_value = "3")]
        relays: u32,

        /// Number of users to launch
        #[arg(short, long, default_value = "2")]
        users: u32,
    },
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,veilnet=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = NetworkConfig {
        host: cli.host,
        registry_port: cli.registry_port,
        base_relay_port: cli.base_relay_port,
        base_user_port: cli.base_user_port,
    };

    match cli.command {
        Commands::Registry => {
            veilnet_directory::serve(Arc::new(Registry::new()), &config).await?;
        }
        Commands::Relay { node_id } => {
            veilnet_relay::serve(node_id, config).await?;
        }
        Commands::User { user_id } => {
            veilnet_client::serve(user_id, config).await?;
        }
        Commands::Network { relays, users } => {
            launch_network(config, relays, users).await?;
        }
    }

    Ok(())
}

/// Launch directory, relays, and users as tasks in this process.
async fn launch_network(config: NetworkConfig, relays: u32, users: u32) -> Result<()> {
    let mut tasks = tokio::task::JoinSet::new();

    let registry_config = config.clone();
    tasks.spawn(async move {
        if let Err(e) = veilnet_directory::serve(Arc::new(Registry::new()), &registry_config).await
        {
            error!("Directory exited: {e}");
        }
    });

    // Relays register at startup; give the directory a moment to bind.
    tokio::time::sleep(Duration::from_millis(200)).await;

    for node_id in 0..relays {
        let relay_config = config.clone();
        tasks.spawn(async move {
            if let Err(e) = veilnet_relay::serve(node_id, relay_config).await {
                error!("Relay {node_id} exited: {e}");
            }
        });
    }

    for user_id in 0..users {
        let user_config = config.clone();
        tasks.spawn(async move {
            if let Err(e) = veilnet_client::serve(user_id, user_config).await {
                error!("User {user_id} exited: {e}");
            }
        });
    }

    // Services run until the process is interrupted.
    while tasks.join_next().await.is_some() {}
    Ok(())
}
