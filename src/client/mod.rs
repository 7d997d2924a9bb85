// Load-generating client: plays the player side of the war protocol.
//
// A client sends WANTGAME, reads its hand, then plays the hand in dealt order,
// one PLAYCARD per PLAYRESULT. `run_clients` drives many of these at once to
// exercise a server.

// Public API
pub use driver::{play_game, play_session, run_clients, ClientError, ClientOutcome};

// Internal modules
mod driver;
