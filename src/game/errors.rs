use std::io;
use std::time::Duration;

use thiserror::Error;

/// Reasons a game session aborts. None of them are retried: a round is not
/// idempotent once its cards are consumed.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Illegal card: {0}")]
    IllegalCard(String),

    #[error("Peer disconnected")]
    PeerDisconnected,

    #[error("Peer silent for {0:?}")]
    Timeout(Duration),

    #[error("Transient I/O error: {0}")]
    TransientIo(#[from] io::Error),
}

impl SessionError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        SessionError::MalformedMessage(msg.into())
    }

    pub fn illegal_card(msg: impl Into<String>) -> Self {
        SessionError::IllegalCard(msg.into())
    }

    /// Whether the peer went away rather than misbehaving
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            SessionError::PeerDisconnected | SessionError::TransientIo(_)
        )
    }

    /// Whether the peer sent something the protocol does not allow
    pub fn is_violation(&self) -> bool {
        matches!(
            self,
            SessionError::MalformedMessage(_) | SessionError::IllegalCard(_)
        )
    }

    /// Maps a failed read. A short read, EOF included, is a disconnect.
    pub fn from_read(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => SessionError::PeerDisconnected,
            _ => SessionError::TransientIo(err),
        }
    }
}
