use async_trait::async_trait;
use std::fmt;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::messages::{ClientMessage, ServerMessage, FRAME_LEN};
use crate::game::SessionError;

/// Byte stream abstraction - all a game needs is exact reads, full writes and shutdown
#[async_trait]
pub trait PlayerSocket: Send {
    /// Fill `buf` completely or fail (EOF before the end is `UnexpectedEof`)
    async fn read_exact_bytes(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Write all of `buf` and flush it
    async fn write_all_bytes(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Close the write half so the peer sees EOF
    async fn shutdown(&mut self) -> io::Result<()>;
}

/// Any tokio stream works: TCP sockets in production, in-memory duplex pipes in tests
#[async_trait]
impl<S> PlayerSocket for S
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn read_exact_bytes(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.read_exact(buf).await.map(|_| ())
    }

    async fn write_all_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        self.write_all(buf).await?;
        self.flush().await
    }

    async fn shutdown(&mut self) -> io::Result<()> {
        AsyncWriteExt::shutdown(self).await
    }
}

/// Which side of a game a connection plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    One,
    Two,
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::One => write!(f, "p1"),
            Seat::Two => write!(f, "p2"),
        }
    }
}

/// One player's connection. Closing is idempotent; dropping also releases the socket.
pub struct PlayerConnection {
    peer: String,
    socket: Option<Box<dyn PlayerSocket>>,
    read_timeout: Option<Duration>,
}

impl PlayerConnection {
    pub fn new(peer: impl Into<String>, socket: Box<dyn PlayerSocket>) -> Self {
        Self {
            peer: peer.into(),
            socket: Some(socket),
            read_timeout: None,
        }
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.socket.is_none()
    }

    fn socket(&mut self) -> Result<&mut Box<dyn PlayerSocket>, SessionError> {
        self.socket.as_mut().ok_or(SessionError::PeerDisconnected)
    }

    /// Reads one two-byte client message, bounded by the read timeout
    pub async fn receive(&mut self) -> Result<ClientMessage, SessionError> {
        let read_timeout = self.read_timeout;
        let socket = self.socket()?;
        let mut frame = [0u8; FRAME_LEN];

        let read = socket.read_exact_bytes(&mut frame);
        let result = match read_timeout {
            Some(limit) => tokio::time::timeout(limit, read)
                .await
                .map_err(|_| SessionError::Timeout(limit))?,
            None => read.await,
        };
        result.map_err(SessionError::from_read)?;

        Ok(ClientMessage::decode(frame)?)
    }

    pub async fn send(&mut self, message: &ServerMessage) -> Result<(), SessionError> {
        let bytes = message.encode();
        self.socket()?.write_all_bytes(&bytes).await?;
        Ok(())
    }

    /// Shuts the socket down and releases it. Later calls do nothing.
    pub async fn close(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            if let Err(e) = PlayerSocket::shutdown(socket.as_mut()).await {
                debug!(peer = %self.peer, error = %e, "Shutdown failed, dropping socket");
            }
        }
    }
}

impl fmt::Debug for PlayerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerConnection")
            .field("peer", &self.peer)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// The two connections of one game, owned together and closed together
#[derive(Debug)]
pub struct ConnectionPair {
    pub p1: PlayerConnection,
    pub p2: PlayerConnection,
}

impl ConnectionPair {
    pub fn new(p1: PlayerConnection, p2: PlayerConnection) -> Self {
        Self { p1, p2 }
    }

    /// Reads one message from each player, concurrently
    pub async fn receive_both(&mut self) -> Result<(ClientMessage, ClientMessage), SessionError> {
        let (p1, p2) = (&mut self.p1, &mut self.p2);
        tokio::try_join!(
            async move { p1.receive().await.inspect_err(|e| log_failure(Seat::One, e)) },
            async move { p2.receive().await.inspect_err(|e| log_failure(Seat::Two, e)) },
        )
    }

    pub async fn send_both(
        &mut self,
        to_p1: &ServerMessage,
        to_p2: &ServerMessage,
    ) -> Result<(), SessionError> {
        tokio::try_join!(self.p1.send(to_p1), self.p2.send(to_p2))?;
        Ok(())
    }

    pub async fn close(&mut self) {
        tokio::join!(self.p1.close(), self.p2.close());
    }
}

fn log_failure(seat: Seat, error: &SessionError) {
    debug!(seat = %seat, error = %error, "Read failed");
}
