use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{debug, error, info, instrument};

use crate::config::ServerConfig;
use crate::lobby::SessionPairer;
use crate::protocol::PlayerConnection;
use crate::supervisor::GameSupervisor;

/// Pause after a failed accept
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Accepts players over TCP and feeds them to the lobby
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    pairer: SessionPairer,
}

impl Server {
    pub async fn bind(addr: impl ToSocketAddrs, config: ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let pairer = SessionPairer::new(GameSupervisor::new(&config));
        Ok(Self {
            listener,
            config,
            pairer,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn supervisor(&self) -> GameSupervisor {
        self.pairer.supervisor().clone()
    }

    /// Accepts connections until `shutdown` resolves. Accept errors are logged and skipped.
    /// Games already running are left to finish on their own.
    #[instrument(skip_all)]
    pub async fn run_until(mut self, shutdown: impl Future<Output = ()>) {
        info!(addr = ?self.listener.local_addr().ok(), "Accepting players");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(waiting = self.pairer.waiting(), "Shutting down");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            debug!(peer = %peer, "Connection accepted");
                            let conn = PlayerConnection::new(peer.to_string(), Box::new(stream))
                                .with_read_timeout(self.config.read_timeout);
                            self.pairer.on_connect(conn);
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                            tokio::time::sleep(ACCEPT_BACKOFF).await;
                        }
                    }
                }
            }
        }
    }

    /// Serves until the process is interrupted
    pub async fn run(self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for interrupt");
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}
