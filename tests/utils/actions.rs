use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// A hand-driven player that speaks raw bytes, for sending what a well-behaved client never would
pub struct RawPlayer {
    stream: TcpStream,
}

impl RawPlayer {
    pub async fn connect(addr: &str) -> Self {
        Self {
            stream: TcpStream::connect(addr).await.unwrap(),
        }
    }

    pub async fn send(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.unwrap();
    }

    pub async fn want_game(&mut self) {
        self.send(&[0, 0]).await;
    }

    pub async fn play(&mut self, card: u8) {
        self.send(&[2, card]).await;
    }

    /// Reads GAMESTART and returns the dealt cards
    pub async fn read_hand(&mut self) -> Vec<u8> {
        let mut start = [0u8; 27];
        self.stream.read_exact(&mut start).await.unwrap();
        assert_eq!(start[0], 1, "expected GAMESTART");
        start[1..].to_vec()
    }

    /// Reads PLAYRESULT and returns its outcome byte
    pub async fn read_result(&mut self) -> u8 {
        let mut frame = [0u8; 2];
        self.stream.read_exact(&mut frame).await.unwrap();
        assert_eq!(frame[0], 3, "expected PLAYRESULT");
        frame[1]
    }

    /// Everything the server sends until it closes the connection. A reset counts as closed.
    pub async fn read_until_closed(&mut self) -> Vec<u8> {
        let mut rest = Vec::new();
        let read = tokio::time::timeout(Duration::from_secs(5), self.stream.read_to_end(&mut rest))
            .await
            .expect("server did not close the connection");
        match read {
            Ok(_) => rest,
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => rest,
            Err(e) => panic!("unexpected read error: {e}"),
        }
    }

    /// Whether nothing arrives within `wait`
    pub async fn is_silent_for(&mut self, wait: Duration) -> bool {
        let mut byte = [0u8; 1];
        tokio::time::timeout(wait, self.stream.read(&mut byte))
            .await
            .is_err()
    }
}
