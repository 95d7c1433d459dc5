//! # holdem-engine: No-Limit Texas Hold'em rules
//!
//! A deterministic betting-state machine for one hand of No-Limit Texas
//! Hold'em with 2 to 10 seats. The state posts blinds, deals, closes betting
//! rounds, runs out boards when nobody can act, and pushes chips at showdown.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and two-character codes
//! - [`deck`] - Deterministic deck shuffling with ChaCha20 RNG
//! - [`hand`] - Seven-card hand evaluation and strength comparison
//! - [`pot`] - Main and side pot layering
//! - [`rules`] - Blinds, streets and table configuration
//! - [`state`] - The per-hand betting state and its action primitives
//! - [`errors`] - Error types for rejected actions
//!
//! ## Quick Start
//!
//! ```rust
//! use holdem_engine::rules::{Blinds, TableConfig};
//! use holdem_engine::state::HandState;
//!
//! let config = TableConfig::new(vec![1000; 3], Blinds::new(20, 40), 40);
//! let mut hand = HandState::seeded(config, 42).unwrap();
//!
//! // Seat 0 opens preflop at a three-handed table
//! assert_eq!(hand.actor_index(), Some(0));
//! assert_eq!(hand.min_bet_or_raise_to(), Some(80));
//!
//! hand.bet_or_raise_to(120).unwrap();
//! assert_eq!(hand.actor_index(), Some(1));
//! ```
//!
//! ## Deterministic Gameplay
//!
//! All deals are reproducible using seeded RNG:
//!
//! ```rust
//! use holdem_engine::deck::Deck;
//!
//! // Same seed produces same shuffle
//! let mut deck1 = Deck::new_with_seed(42);
//! let mut deck2 = Deck::new_with_seed(42);
//! deck1.shuffle();
//! deck2.shuffle();
//! assert_eq!(deck1.deal_card(), deck2.deal_card());
//! ```

pub mod cards;
pub mod deck;
pub mod errors;
pub mod hand;
pub mod pot;
pub mod rules;
pub mod state;
