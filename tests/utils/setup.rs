use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use war::{GameSupervisor, HandPolicy, Server, ServerConfig};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestServer {
    pub addr: String,
    pub supervisor: GameSupervisor,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Stops accepting and waits for the accept loop to exit
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let _ = (&mut self.handle).await;
    }
}

pub struct TestServerBuilder {
    config: ServerConfig,
}

impl TestServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = Some(timeout);
        self
    }

    pub fn with_strict_hands(mut self) -> Self {
        self.config.hand_policy = HandPolicy::InOrder;
        self
    }

    pub async fn build(self) -> TestServer {
        let server = Server::bind("127.0.0.1:0", self.config).await.unwrap();
        let addr = server.local_addr().unwrap().to_string();
        let supervisor = server.supervisor();

        let (shutdown, stop) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.run_until(async {
            let _ = stop.await;
        }));

        TestServer {
            addr,
            supervisor,
            shutdown: Some(shutdown),
            handle,
        }
    }
}
