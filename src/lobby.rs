use tracing::info;

use crate::game::{Game, GameId};
use crate::protocol::PlayerConnection;
use crate::supervisor::GameSupervisor;

/// Holds at most one connection waiting for an opponent
#[derive(Debug, Default)]
pub struct PendingQueue {
    waiting: Option<PlayerConnection>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `conn`, or pairs it with the connection already waiting.
    /// The earlier arrival is always player 1.
    pub fn admit(&mut self, conn: PlayerConnection) -> Option<(PlayerConnection, PlayerConnection)> {
        match self.waiting.take() {
            Some(first) => Some((first, conn)),
            None => {
                self.waiting = Some(conn);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        usize::from(self.waiting.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_none()
    }
}

/// Pairs connections in arrival order and hands each pair to the supervisor.
///
/// Owned by the accept loop, so pairing decisions never interleave. Nothing is
/// checked here: a peer that leaves while queued is found out by its session.
pub struct SessionPairer {
    queue: PendingQueue,
    supervisor: GameSupervisor,
}

impl SessionPairer {
    pub fn new(supervisor: GameSupervisor) -> Self {
        Self {
            queue: PendingQueue::new(),
            supervisor,
        }
    }

    /// Returns the id of the game started by this arrival, if any. Never waits on play.
    pub fn on_connect(&mut self, conn: PlayerConnection) -> Option<GameId> {
        let peer = conn.peer().to_string();
        let (p1, p2) = match self.queue.admit(conn) {
            Some(pair) => pair,
            None => {
                info!(peer = %peer, "Player waiting for an opponent");
                return None;
            }
        };

        let game = Game::new(p1, p2);
        let game_id = game.id;
        info!(
            game_id = %game_id,
            p1 = %game.players.p1.peer(),
            p2 = %game.players.p2.peer(),
            "Players paired"
        );

        // Detached: the session owns its connections from here on
        drop(self.supervisor.launch(game));
        Some(game_id)
    }

    pub fn waiting(&self) -> usize {
        self.queue.len()
    }

    pub fn supervisor(&self) -> &GameSupervisor {
        &self.supervisor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::play_session;
    use crate::config::ServerConfig;
    use tokio::io::{duplex, DuplexStream};

    fn connection(peer: &str) -> (PlayerConnection, DuplexStream) {
        let (server, client) = duplex(256);
        (PlayerConnection::new(peer, Box::new(server)), client)
    }

    #[test]
    fn test_queue_holds_one_connection() {
        let mut queue = PendingQueue::new();
        let (first, _c1) = connection("first");
        let (second, _c2) = connection("second");

        assert!(queue.admit(first).is_none());
        assert_eq!(queue.len(), 1);

        let (p1, p2) = queue.admit(second).expect("second arrival pairs");
        assert_eq!(p1.peer(), "first");
        assert_eq!(p2.peer(), "second");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_pairs_in_arrival_order() {
        let mut queue = PendingQueue::new();
        let mut pairs = Vec::new();
        let mut clients = Vec::new();

        for peer in ["a", "b", "c", "d", "e"] {
            let (conn, client) = connection(peer);
            clients.push(client);
            if let Some((p1, p2)) = queue.admit(conn) {
                pairs.push((p1.peer().to_string(), p2.peer().to_string()));
            }
        }

        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "b".to_string()),
                ("c".to_string(), "d".to_string())
            ]
        );
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn test_pairer_launches_game_on_second_arrival() {
        let supervisor = GameSupervisor::new(&ServerConfig::default());
        let mut pairer = SessionPairer::new(supervisor.clone());

        let (conn1, client1) = connection("one");
        let (conn2, client2) = connection("two");

        assert!(pairer.on_connect(conn1).is_none());
        assert_eq!(pairer.waiting(), 1);
        assert_eq!(supervisor.stats().active, 0);

        assert!(pairer.on_connect(conn2).is_some());
        assert_eq!(pairer.waiting(), 0);
        assert_eq!(supervisor.stats().active, 1);

        let (outcome1, outcome2) = tokio::join!(play_session(client1, None), play_session(client2, None));
        assert!(outcome1.is_ok());
        assert!(outcome2.is_ok());

        pairer.supervisor().wait_idle().await;
        assert_eq!(supervisor.stats().completed, 1);
    }

    #[tokio::test]
    async fn test_departed_peer_still_pairs() {
        let supervisor = GameSupervisor::new(&ServerConfig::default());
        let mut pairer = SessionPairer::new(supervisor.clone());

        let (conn1, client1) = connection("gone");
        let (conn2, client2) = connection("stays");
        drop(client1);

        pairer.on_connect(conn1);
        assert!(pairer.on_connect(conn2).is_some());

        assert!(play_session(client2, None).await.is_err());
        supervisor.wait_idle().await;
        assert_eq!(supervisor.stats().aborted, 1);
    }
}
