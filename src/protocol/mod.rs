// Wire protocol: raw byte framing and the connections it travels over

// Public API
pub use connection::{ConnectionPair, PlayerConnection, PlayerSocket, Seat};
pub use messages::{
    ClientMessage, Command, DecodeError, PlayResult, ServerMessage, FRAME_LEN, GAME_START_LEN,
};

// Internal modules
mod connection;
mod messages;
