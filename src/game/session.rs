// A game session owns two paired connections for the whole life of one game of war.
//
// It reads a WANTGAME from both players, deals, then plays 26 strictly sequential
// rounds: read both PLAYCARDs, judge, send both PLAYRESULTs. Any bad message, bad
// card, disconnect or timeout aborts the game. Both connections are closed on every
// exit path.

use std::fmt;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::cards::{deal_cards, Hand, HAND_SIZE};
use super::errors::SessionError;
use super::judge::{compare, RoundOutcome};
use crate::protocol::{
    ClientMessage, ConnectionPair, PlayResult, PlayerConnection, Seat, ServerMessage,
};

pub type GameId = Uuid;

/// How strictly played cards are checked against what was dealt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandPolicy {
    /// Only the judge's checks apply: a card must be in range and differ from the opponent's
    #[default]
    Unchecked,
    /// Each round's card must be the next card of the player's dealt hand
    InOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitHandshake,
    Dealt,
    /// One-based round number
    Round(u8),
    Settled,
    Aborted,
    Closed,
}

/// Rounds won by each player. Draws count for neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub p1: u8,
    pub p2: u8,
}

impl Score {
    pub fn record(&mut self, outcome: RoundOutcome) {
        match outcome {
            RoundOutcome::P1Wins => self.p1 += 1,
            RoundOutcome::P2Wins => self.p2 += 1,
            RoundOutcome::Draw | RoundOutcome::Invalid => {}
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self.p1.cmp(&self.p2) {
            std::cmp::Ordering::Greater => Verdict::P1Wins,
            std::cmp::Ordering::Less => Verdict::P2Wins,
            std::cmp::Ordering::Equal => Verdict::Draw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    P1Wins,
    P2Wins,
    Draw,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::P1Wins => write!(f, "player 1 won"),
            Verdict::P2Wins => write!(f, "player 2 won"),
            Verdict::Draw => write!(f, "draw"),
        }
    }
}

/// Outcome of a game that ran all its rounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameReport {
    pub game_id: GameId,
    pub score: Score,
    pub verdict: Verdict,
}

/// Two connections matched by the lobby, not yet played
#[derive(Debug)]
pub struct Game {
    pub id: GameId,
    pub players: ConnectionPair,
}

impl Game {
    pub fn new(p1: PlayerConnection, p2: PlayerConnection) -> Self {
        Self {
            id: Uuid::new_v4(),
            players: ConnectionPair::new(p1, p2),
        }
    }
}

/// Per-round results sent to player 1 and player 2, or `None` for an invalid round
pub fn results_for(outcome: RoundOutcome) -> Option<(PlayResult, PlayResult)> {
    let p1 = match outcome {
        RoundOutcome::P1Wins => PlayResult::Win,
        RoundOutcome::Draw => PlayResult::Draw,
        RoundOutcome::P2Wins => PlayResult::Lose,
        RoundOutcome::Invalid => return None,
    };
    Some((p1, p1.mirrored()))
}

pub struct GameSession {
    id: GameId,
    players: ConnectionPair,
    policy: HandPolicy,
    state: SessionState,
    score: Score,
    hands: Option<(Hand, Hand)>,
}

impl GameSession {
    pub fn new(game: Game, policy: HandPolicy) -> Self {
        Self {
            id: game.id,
            players: game.players,
            policy,
            state: SessionState::AwaitHandshake,
            score: Score::default(),
            hands: None,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    /// Plays the game to the end, then closes both connections whatever happened
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub async fn run(mut self) -> Result<GameReport, SessionError> {
        let result = self.play().await;

        match &result {
            Ok(report) => {
                info!(
                    p1_wins = report.score.p1,
                    p2_wins = report.score.p2,
                    verdict = %report.verdict,
                    "Game settled"
                );
            }
            Err(e) if e.is_violation() => {
                warn!(state = ?self.state, error = %e, "Game aborted on a protocol violation");
                self.state = SessionState::Aborted;
            }
            Err(e) => {
                info!(state = ?self.state, error = %e, "Game aborted");
                self.state = SessionState::Aborted;
            }
        }

        debug!(state = ?self.state, "Closing connections");
        self.players.close().await;
        self.state = SessionState::Closed;
        debug!(state = ?self.state, "Connections closed");
        result
    }

    async fn play(&mut self) -> Result<GameReport, SessionError> {
        self.handshake().await?;
        self.deal().await?;

        for round in 0..HAND_SIZE {
            self.state = SessionState::Round(round as u8 + 1);
            self.play_round(round).await?;
        }

        self.state = SessionState::Settled;
        Ok(GameReport {
            game_id: self.id,
            score: self.score,
            verdict: self.score.verdict(),
        })
    }

    async fn handshake(&mut self) -> Result<(), SessionError> {
        let (m1, m2) = self.players.receive_both().await?;
        expect_want_game(m1)?;
        expect_want_game(m2)?;
        debug!("Handshake complete");
        Ok(())
    }

    async fn deal(&mut self) -> Result<(), SessionError> {
        let (hand1, hand2) = deal_cards();
        self.state = SessionState::Dealt;

        self.players
            .send_both(
                &ServerMessage::GameStart(hand1.clone()),
                &ServerMessage::GameStart(hand2.clone()),
            )
            .await?;
        self.hands = Some((hand1, hand2));
        Ok(())
    }

    async fn play_round(&mut self, round: usize) -> Result<(), SessionError> {
        let (m1, m2) = self.players.receive_both().await?;
        let card1 = expect_card(m1)?;
        let card2 = expect_card(m2)?;

        if self.policy == HandPolicy::InOrder {
            self.check_dealt(Seat::One, round, card1)?;
            self.check_dealt(Seat::Two, round, card2)?;
        }

        let outcome = compare(card1, card2);
        let (result1, result2) = results_for(outcome).ok_or_else(|| {
            SessionError::illegal_card(format!("cannot compare {card1} with {card2}"))
        })?;

        self.players
            .send_both(
                &ServerMessage::PlayResult(result1),
                &ServerMessage::PlayResult(result2),
            )
            .await?;
        self.score.record(outcome);

        debug!(round = round + 1, card1, card2, outcome = ?outcome, "Round played");
        Ok(())
    }

    fn check_dealt(&self, seat: Seat, round: usize, card: u8) -> Result<(), SessionError> {
        let hand = match (&self.hands, seat) {
            (Some((hand, _)), Seat::One) => hand,
            (Some((_, hand)), Seat::Two) => hand,
            (None, _) => return Err(SessionError::illegal_card("no hands dealt")),
        };

        match hand.card_at(round) {
            Some(expected) if expected.value() == card => Ok(()),
            Some(expected) => Err(SessionError::illegal_card(format!(
                "{seat} played {card}, next dealt card is {expected}"
            ))),
            None => Err(SessionError::illegal_card(format!("{seat} has no cards left"))),
        }
    }
}

fn expect_want_game(message: ClientMessage) -> Result<(), SessionError> {
    match message {
        ClientMessage::WantGame => Ok(()),
        other => Err(SessionError::malformed(format!(
            "expected WantGame, got {:?}",
            other.command()
        ))),
    }
}

fn expect_card(message: ClientMessage) -> Result<u8, SessionError> {
    match message {
        ClientMessage::PlayCard(card) => Ok(card),
        other => Err(SessionError::malformed(format!(
            "expected PlayCard, got {:?}",
            other.command()
        ))),
    }
}
