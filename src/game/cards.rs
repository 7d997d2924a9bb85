use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use super::errors::SessionError;

/// Number of cards in a full deck
pub const DECK_SIZE: usize = 52;
/// Number of cards dealt to each player
pub const HAND_SIZE: usize = DECK_SIZE / 2;
/// Number of distinct ranks; a card's rank is its value mod this
pub const RANKS: u8 = 13;

/// A single card, identified by its value in `0..52`.
///
/// The rank is `value % 13` and is the only thing that matters when two cards
/// are compared. The suit (`value / 13`) only keeps values distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card(u8);

impl Card {
    pub fn new(value: u8) -> Option<Self> {
        (usize::from(value) < DECK_SIZE).then_some(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn rank(&self) -> Rank {
        Rank(self.0 % RANKS)
    }

    pub fn all_cards() -> Vec<Card> {
        (0..DECK_SIZE as u8).map(Card).collect()
    }
}

impl TryFrom<u8> for Card {
    type Error = SessionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Card::new(value).ok_or_else(|| SessionError::illegal_card(format!("{value} is not a card")))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rank of a card, 0 (lowest) to 12 (highest), suit independent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(u8);

impl Rank {
    pub fn value(&self) -> u8 {
        self.0
    }
}

/// The ordered cards dealt to one player. Play order is index order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// The card expected in the given zero-based round
    pub fn card_at(&self, round: usize) -> Option<Card> {
        self.cards.get(round).copied()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Shuffles a fresh deck and splits it into two hands of 26 cards.
pub fn deal_cards() -> (Hand, Hand) {
    deal_cards_with(&mut rand::rng())
}

/// Same as [`deal_cards`] with a caller-supplied random source.
pub fn deal_cards_with<R: Rng + ?Sized>(rng: &mut R) -> (Hand, Hand) {
    let mut cards = Card::all_cards();
    cards.shuffle(rng);

    let second = cards.split_off(HAND_SIZE);
    (Hand::new(cards), Hand::new(second))
}
