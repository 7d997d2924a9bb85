// Public API
pub use cards::{deal_cards, deal_cards_with, Card, Hand, Rank, DECK_SIZE, HAND_SIZE};
pub use errors::SessionError;
pub use judge::{compare, RoundOutcome};
pub use session::{
    results_for, Game, GameId, GameReport, GameSession, HandPolicy, Score, SessionState, Verdict,
};

// Internal modules
mod cards;
mod errors;
mod judge;
mod session;
