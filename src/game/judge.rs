use super::cards::Card;

/// Result of comparing the two cards played in a round, from player 1's side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    P1Wins,
    Draw,
    P2Wins,
    /// A card is out of range, or both players played the same card
    Invalid,
}

impl RoundOutcome {
    /// The same outcome seen from player 2's side
    pub fn reversed(self) -> Self {
        match self {
            RoundOutcome::P1Wins => RoundOutcome::P2Wins,
            RoundOutcome::P2Wins => RoundOutcome::P1Wins,
            other => other,
        }
    }
}

/// Compares two raw card values by rank.
///
/// Equal values can only come from a bad client since each value is dealt
/// once, so they are `Invalid` rather than a draw. Different cards of the
/// same rank draw.
pub fn compare(card1: u8, card2: u8) -> RoundOutcome {
    let (Some(card1), Some(card2)) = (Card::new(card1), Card::new(card2)) else {
        return RoundOutcome::Invalid;
    };
    if card1 == card2 {
        return RoundOutcome::Invalid;
    }

    match card1.rank().cmp(&card2.rank()) {
        std::cmp::Ordering::Greater => RoundOutcome::P1Wins,
        std::cmp::Ordering::Less => RoundOutcome::P2Wins,
        std::cmp::Ordering::Equal => RoundOutcome::Draw,
    }
}
