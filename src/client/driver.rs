use futures::stream::{FuturesUnordered, StreamExt};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::protocol::{
    ClientMessage, DecodeError, PlayResult, ServerMessage, FRAME_LEN, GAME_START_LEN,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] DecodeError),

    #[error("No reply from the server within {0:?}")]
    Timeout(Duration),
}

/// What one client saw over a full game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOutcome {
    /// Card values as dealt, in play order
    pub hand: Vec<u8>,
    /// One result per round, from this client's side
    pub results: Vec<PlayResult>,
}

impl ClientOutcome {
    fn count(&self, wanted: PlayResult) -> usize {
        self.results.iter().filter(|r| **r == wanted).count()
    }

    pub fn wins(&self) -> usize {
        self.count(PlayResult::Win)
    }

    pub fn draws(&self) -> usize {
        self.count(PlayResult::Draw)
    }

    pub fn losses(&self) -> usize {
        self.count(PlayResult::Lose)
    }

    /// Wins minus losses
    pub fn net(&self) -> i32 {
        self.results.iter().map(PlayResult::score).sum()
    }

    pub fn describe(&self) -> &'static str {
        match self.net() {
            n if n > 0 => "won",
            n if n < 0 => "lost",
            _ => "drew",
        }
    }
}

/// Smallest cap that lets every client holding a slot find an opponent
const MIN_OUTSTANDING: usize = 2;

async fn read_frame<S>(
    stream: &mut S,
    buf: &mut [u8],
    read_timeout: Option<Duration>,
) -> Result<(), ClientError>
where
    S: AsyncRead + Unpin,
{
    match read_timeout {
        Some(limit) => tokio::time::timeout(limit, stream.read_exact(buf))
            .await
            .map_err(|_| ClientError::Timeout(limit))??,
        None => stream.read_exact(buf).await?,
    };
    Ok(())
}

/// Plays one full game over an already connected stream. Each server reply is
/// awaited for at most `read_timeout`.
pub async fn play_session<S>(
    mut stream: S,
    read_timeout: Option<Duration>,
) -> Result<ClientOutcome, ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(&ClientMessage::WantGame.encode()).await?;

    let mut start = [0u8; GAME_START_LEN];
    read_frame(&mut stream, &mut start, read_timeout).await?;
    let hand = ServerMessage::decode_game_start(&start)?;

    let mut results = Vec::with_capacity(hand.len());
    for &card in &hand {
        stream.write_all(&ClientMessage::PlayCard(card).encode()).await?;

        let mut frame = [0u8; FRAME_LEN];
        read_frame(&mut stream, &mut frame, read_timeout).await?;
        results.push(ServerMessage::decode_play_result(frame)?);
    }

    // The server closes first; a failed shutdown changes nothing for the tally
    let _ = stream.shutdown().await;

    Ok(ClientOutcome { hand, results })
}

/// Connects to `addr` and plays one game
pub async fn play_game(addr: &str, config: &ClientConfig) -> Result<ClientOutcome, ClientError> {
    let stream = TcpStream::connect(addr).await?;
    let outcome = play_session(stream, config.read_timeout).await?;
    debug!(result = outcome.describe(), net = outcome.net(), "Game complete");
    Ok(outcome)
}

/// Runs `count` clients against `addr`, at most `config.max_outstanding` at a time.
/// Returns how many clients played a full game. With an odd `count` the last client
/// has no opponent and gives up after `config.read_timeout`.
pub async fn run_clients(addr: &str, count: usize, config: &ClientConfig) -> usize {
    let outstanding = Arc::new(Semaphore::new(config.max_outstanding.max(MIN_OUTSTANDING)));

    let mut games: FuturesUnordered<_> = (0..count)
        .map(|client| {
            let outstanding = outstanding.clone();
            async move {
                let Ok(_permit) = outstanding.acquire_owned().await else {
                    return 0;
                };
                match play_game(addr, config).await {
                    Ok(_) => 1,
                    Err(e) => {
                        error!(client, error = %e, "Client failed");
                        0
                    }
                }
            }
        })
        .collect();

    let mut completed = 0;
    while let Some(done) = games.next().await {
        completed += done;
    }

    info!(completed, requested = count, "Clients finished");
    completed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(results: Vec<PlayResult>) -> ClientOutcome {
        ClientOutcome {
            hand: Vec::new(),
            results,
        }
    }

    #[test]
    fn test_tally() {
        let seen = outcome(vec![
            PlayResult::Win,
            PlayResult::Win,
            PlayResult::Draw,
            PlayResult::Lose,
        ]);

        assert_eq!(seen.wins(), 2);
        assert_eq!(seen.draws(), 1);
        assert_eq!(seen.losses(), 1);
        assert_eq!(seen.net(), 1);
        assert_eq!(seen.describe(), "won");
    }

    #[test]
    fn test_describe() {
        assert_eq!(outcome(vec![PlayResult::Lose]).describe(), "lost");
        assert_eq!(outcome(vec![PlayResult::Draw]).describe(), "drew");
        assert_eq!(outcome(vec![]).describe(), "drew");
    }

    #[tokio::test]
    async fn test_session_fails_when_server_closes_early() {
        let (client, server) = tokio::io::duplex(64);
        drop(server);

        let err = play_session(client, None).await.unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[tokio::test]
    async fn test_session_rejects_bad_deal() {
        let (client, mut server) = tokio::io::duplex(64);
        let serve = async move {
            let mut hello = [0u8; FRAME_LEN];
            server.read_exact(&mut hello).await.unwrap();
            let mut reply = vec![3u8];
            reply.extend(0..26u8);
            server.write_all(&reply).await.unwrap();
            server
        };

        let (result, _server) = tokio::join!(play_session(client, None), serve);
        assert!(matches!(result, Err(ClientError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_no_server_completes_nothing() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let config = ClientConfig {
            max_outstanding: 2,
            ..ClientConfig::default()
        };
        assert_eq!(run_clients(&addr, 3, &config).await, 0);
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let (client, _server) = tokio::io::duplex(64);

        let err = play_session(client, Some(Duration::from_millis(50)))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_stalled_result_times_out() {
        let (client, mut server) = tokio::io::duplex(64);
        let serve = async move {
            let mut hello = [0u8; FRAME_LEN];
            server.read_exact(&mut hello).await.unwrap();
            let mut deal = vec![1u8];
            deal.extend(0..26u8);
            server.write_all(&deal).await.unwrap();
            // Take the first card but never answer it
            let mut card = [0u8; FRAME_LEN];
            server.read_exact(&mut card).await.unwrap();
            server
        };

        let (result, _server) = tokio::join!(
            play_session(client, Some(Duration::from_millis(50))),
            serve
        );
        assert!(matches!(result, Err(ClientError::Timeout(_))));
    }
}
