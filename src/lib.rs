// Library crate for the war game server
// This file exposes the public API for the binary and integration tests

pub mod client;
pub mod config;
pub mod game;
pub mod lobby;
pub mod protocol;
pub mod server;
pub mod supervisor;

// Re-export commonly used types for easier access in tests
pub use client::{play_game, run_clients, ClientOutcome};
pub use config::{ClientConfig, ServerConfig};
pub use game::{compare, deal_cards, HandPolicy, RoundOutcome, SessionError};
pub use server::Server;
pub use supervisor::{GameSupervisor, SupervisorStats};
