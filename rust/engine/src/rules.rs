use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// Largest table the engine deals for.
pub const MAX_SEATS: usize = 10;

/// Forced bets posted before the hole cards are dealt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blinds {
    pub small: u32,
    pub big: u32,
}

impl Blinds {
    pub const fn new(small: u32, big: u32) -> Self {
        Self { small, big }
    }
}

impl Default for Blinds {
    fn default() -> Self {
        Self::new(20, 40)
    }
}

/// Betting rounds of a Hold'em hand in dealing order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    pub const ALL: [Street; 4] = [Street::Preflop, Street::Flop, Street::Turn, Street::River];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Street> {
        Self::ALL.get(index).copied()
    }

    /// Community cards revealed when this street begins.
    pub fn board_cards_dealt(self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn | Street::River => 1,
        }
    }

    pub fn next(self) -> Option<Street> {
        Self::from_index(self.index() + 1)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        }
    }
}

/// Everything needed to start a hand.
///
/// # Examples
///
/// ```
/// use holdem_engine::rules::{Blinds, TableConfig};
///
/// let config = TableConfig::new(vec![1000, 1000], Blinds::new(20, 40), 40);
/// assert!(config.validate().is_ok());
///
/// let lonely = TableConfig::new(vec![1000], Blinds::new(20, 40), 40);
/// assert!(lonely.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub starting_stacks: Vec<u32>,
    pub blinds: Blinds,
    /// Smallest opening bet and smallest raise increment.
    pub min_bet: u32,
}

impl TableConfig {
    pub fn new(starting_stacks: Vec<u32>, blinds: Blinds, min_bet: u32) -> Self {
        Self {
            starting_stacks,
            blinds,
            min_bet,
        }
    }

    pub fn seat_count(&self) -> usize {
        self.starting_stacks.len()
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let seats = self.seat_count();
        if !(2..=MAX_SEATS).contains(&seats) {
            return Err(EngineError::InvalidConfig(format!(
                "seat count must be between 2 and {MAX_SEATS}, got {seats}"
            )));
        }
        if let Some(seat) = self.starting_stacks.iter().position(|&s| s == 0) {
            return Err(EngineError::InvalidConfig(format!(
                "seat {seat} has an empty starting stack"
            )));
        }
        if self.blinds.small == 0 || self.blinds.small > self.blinds.big {
            return Err(EngineError::InvalidConfig(format!(
                "blinds must satisfy 0 < small <= big, got {}/{}",
                self.blinds.small, self.blinds.big
            )));
        }
        if self.min_bet == 0 {
            return Err(EngineError::InvalidConfig(
                "minimum bet must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
