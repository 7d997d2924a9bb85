use strum_macros::FromRepr;
#[cfg(test)]
use strum_macros::EnumIter;
use thiserror::Error;

use crate::game::{Card, Hand, SessionError, HAND_SIZE};

/// Length of every client message and of PLAYRESULT
pub const FRAME_LEN: usize = 2;
/// Length of GAMESTART: the command byte followed by the hand
pub const GAME_START_LEN: usize = 1 + HAND_SIZE;

/// First byte of every message in the war protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[cfg_attr(test, derive(EnumIter))]
#[repr(u8)]
pub enum Command {
    WantGame = 0,
    GameStart = 1,
    PlayCard = 2,
    PlayResult = 3,
}

/// Payload byte of PLAYRESULT, from the recipient's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[cfg_attr(test, derive(EnumIter))]
#[repr(u8)]
pub enum PlayResult {
    Win = 0,
    Draw = 1,
    Lose = 2,
}

impl PlayResult {
    /// Contribution to a player's running tally: win +1, lose -1, draw 0
    pub fn score(&self) -> i32 {
        match self {
            PlayResult::Win => 1,
            PlayResult::Draw => 0,
            PlayResult::Lose => -1,
        }
    }

    /// The result the opposing player receives for the same round
    pub fn mirrored(&self) -> Self {
        match self {
            PlayResult::Win => PlayResult::Lose,
            PlayResult::Draw => PlayResult::Draw,
            PlayResult::Lose => PlayResult::Win,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown command byte {0}")]
    UnknownCommand(u8),

    #[error("expected {expected:?}, got {actual:?}")]
    UnexpectedCommand { expected: Command, actual: Command },

    #[error("invalid payload {payload} for {command:?}")]
    InvalidPayload { command: Command, payload: u8 },

    #[error("{command:?} needs {expected} bytes, got {actual}")]
    WrongLength {
        command: Command,
        expected: usize,
        actual: usize,
    },
}

impl From<DecodeError> for SessionError {
    fn from(err: DecodeError) -> Self {
        SessionError::malformed(err.to_string())
    }
}

fn command(byte: u8) -> Result<Command, DecodeError> {
    Command::from_repr(byte).ok_or(DecodeError::UnknownCommand(byte))
}

fn expect_command(expected: Command, byte: u8) -> Result<(), DecodeError> {
    let actual = command(byte)?;
    if actual != expected {
        return Err(DecodeError::UnexpectedCommand { expected, actual });
    }
    Ok(())
}

/// Messages a player sends to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    WantGame,
    /// Raw card value; range checking belongs to the round judge
    PlayCard(u8),
}

impl ClientMessage {
    pub fn command(&self) -> Command {
        match self {
            ClientMessage::WantGame => Command::WantGame,
            ClientMessage::PlayCard(_) => Command::PlayCard,
        }
    }

    pub fn decode(frame: [u8; FRAME_LEN]) -> Result<Self, DecodeError> {
        let [cmd, payload] = frame;
        match command(cmd)? {
            Command::WantGame if payload == 0 => Ok(ClientMessage::WantGame),
            Command::WantGame => Err(DecodeError::InvalidPayload {
                command: Command::WantGame,
                payload,
            }),
            Command::PlayCard => Ok(ClientMessage::PlayCard(payload)),
            other => Err(DecodeError::UnexpectedCommand {
                expected: Command::PlayCard,
                actual: other,
            }),
        }
    }

    pub fn encode(&self) -> [u8; FRAME_LEN] {
        match self {
            ClientMessage::WantGame => [Command::WantGame as u8, 0],
            ClientMessage::PlayCard(card) => [Command::PlayCard as u8, *card],
        }
    }
}

/// Messages the server sends to a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    GameStart(Hand),
    PlayResult(PlayResult),
}

impl ServerMessage {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            ServerMessage::GameStart(hand) => {
                let mut bytes = Vec::with_capacity(GAME_START_LEN);
                bytes.push(Command::GameStart as u8);
                bytes.extend(hand.cards().iter().map(Card::value));
                bytes
            }
            ServerMessage::PlayResult(result) => vec![Command::PlayResult as u8, *result as u8],
        }
    }

    /// Returns the dealt card values in play order
    pub fn decode_game_start(frame: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let Some((&cmd, cards)) = frame.split_first() else {
            return Err(DecodeError::WrongLength {
                command: Command::GameStart,
                expected: GAME_START_LEN,
                actual: 0,
            });
        };
        expect_command(Command::GameStart, cmd)?;
        if cards.len() != HAND_SIZE {
            return Err(DecodeError::WrongLength {
                command: Command::GameStart,
                expected: GAME_START_LEN,
                actual: frame.len(),
            });
        }
        Ok(cards.to_vec())
    }

    pub fn decode_play_result(frame: [u8; FRAME_LEN]) -> Result<PlayResult, DecodeError> {
        let [cmd, payload] = frame;
        expect_command(Command::PlayResult, cmd)?;
        PlayResult::from_repr(payload).ok_or(DecodeError::InvalidPayload {
            command: Command::PlayResult,
            payload,
        })
    }
}
