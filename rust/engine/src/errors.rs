use thiserror::Error;

/// Rejections raised by [`crate::state::HandState`].
///
/// A mutation that returns one of these has left the state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid table configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid card code: {0}")]
    InvalidCard(String),
    #[error("Hand already complete")]
    HandComplete,
    #[error("There is no player to act")]
    NoActor,
    #[error("Folding is not allowed when there is nothing to call")]
    CannotFold,
    #[error("Betting or raising is not allowed now")]
    CannotBetOrRaise,
    #[error("Bet or raise to {amount} is below the minimum of {minimum}")]
    AmountBelowMinimum { amount: u32, minimum: u32 },
    #[error("Bet or raise to {amount} exceeds the maximum of {maximum}")]
    AmountAboveMaximum { amount: u32, maximum: u32 },
    #[error("Deck exhausted")]
    DeckExhausted,
}
