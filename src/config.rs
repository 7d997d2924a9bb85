use std::time::Duration;

use crate::game::HandPolicy;

/// Configuration for the game server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// How long a session waits on a silent player before aborting. `None` waits forever.
    pub read_timeout: Option<Duration>,
    /// Whether played cards are checked against the dealt hands
    pub hand_policy: HandPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            read_timeout: Some(Duration::from_secs(30)),
            hand_policy: HandPolicy::Unchecked,
        }
    }
}

/// Configuration for the load-generating client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound on clients in flight at once. Values below 2 are raised to 2
    /// so that every client holding a slot can be paired.
    pub max_outstanding: usize,
    /// How long a client waits for GAMESTART or a PLAYRESULT. `None` waits forever.
    pub read_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_outstanding: 1000,
            read_timeout: Some(Duration::from_secs(30)),
        }
    }
}
