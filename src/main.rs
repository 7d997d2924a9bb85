use anyhow::Context;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use war::{play_game, run_clients, ClientConfig, HandPolicy, Server, ServerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "War card game server and load generator")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve games until interrupted
    Server {
        host: String,
        port: u16,

        /// Seconds to wait on a silent player before aborting its game (0 waits forever)
        #[arg(long, default_value = "30")]
        read_timeout_secs: u64,

        /// Require every played card to be the next card of the player's dealt hand
        #[arg(long)]
        strict_hands: bool,
    },
    /// Play a single game
    Client {
        host: String,
        port: u16,

        /// Seconds to wait for each server reply (0 waits forever)
        #[arg(long, default_value = "30")]
        read_timeout_secs: u64,
    },
    /// Play many games at once and report how many completed
    Clients {
        host: String,
        port: u16,
        count: usize,

        /// Clients in flight at once (at least 2)
        #[arg(long, default_value = "1000")]
        max_outstanding: usize,

        /// Seconds to wait for each server reply (0 waits forever)
        #[arg(long, default_value = "30")]
        read_timeout_secs: u64,
    },
}

/// Zero means no bound
fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "war=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    match args.command {
        Command::Server {
            host,
            port,
            read_timeout_secs,
            strict_hands,
        } => {
            let config = ServerConfig {
                read_timeout: seconds(read_timeout_secs),
                hand_policy: if strict_hands {
                    HandPolicy::InOrder
                } else {
                    HandPolicy::Unchecked
                },
            };
            let server = Server::bind((host.as_str(), port), config)
                .await
                .with_context(|| format!("failed to bind {host}:{port}"))?;

            info!("Starting war game server");
            server.run().await;
        }
        Command::Client {
            host,
            port,
            read_timeout_secs,
        } => {
            let config = ClientConfig {
                read_timeout: seconds(read_timeout_secs),
                ..ClientConfig::default()
            };
            let outcome = play_game(&format!("{host}:{port}"), &config).await?;
            info!(
                result = outcome.describe(),
                wins = outcome.wins(),
                draws = outcome.draws(),
                losses = outcome.losses(),
                "Game complete"
            );
        }
        Command::Clients {
            host,
            port,
            count,
            max_outstanding,
            read_timeout_secs,
        } => {
            let config = ClientConfig {
                max_outstanding,
                read_timeout: seconds(read_timeout_secs),
            };
            let completed = run_clients(&format!("{host}:{port}"), count, &config).await;
            info!("{} completed clients", completed);
        }
    }

    Ok(())
}
