//! The rules-engine capability surface the hand service depends on.
//!
//! Everything the service knows about betting mechanics goes through
//! [`HandEngine`]; [`EngineFactory`] builds one per hand.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use holdem_engine::cards::Card;
use holdem_engine::errors::EngineError;
use holdem_engine::rules::{Blinds, TableConfig};
use holdem_engine::state::HandState;

pub trait HandEngine: Send + fmt::Debug {
    fn seat_count(&self) -> usize;
    fn actor_index(&self) -> Option<usize>;
    fn stacks(&self) -> &[u32];
    fn round_bets(&self) -> &[u32];
    /// Visible hole cards of `seat`; empty once folded.
    fn hole_cards(&self, seat: usize) -> &[Card];
    fn board_cards_by_street(&self) -> &[Vec<Card>];
    fn total_pot(&self) -> u32;
    fn street_index(&self) -> Option<usize>;
    fn in_progress(&self) -> bool;

    fn can_check_or_call(&self) -> bool;
    fn check_or_call_amount(&self) -> u32;
    fn can_fold(&self) -> bool;
    fn can_bet_or_raise(&self) -> bool;
    fn min_bet_or_raise_to(&self) -> Option<u32>;
    fn max_bet_or_raise_to(&self) -> Option<u32>;

    /// Each mutation leaves the engine untouched when it returns an error.
    fn fold(&mut self) -> Result<(), EngineError>;
    fn check_or_call(&mut self) -> Result<(), EngineError>;
    fn bet_or_raise_to(&mut self, amount: u32) -> Result<(), EngineError>;
}

pub trait EngineFactory: Send + Sync + fmt::Debug {
    fn create(
        &self,
        starting_stacks: Vec<u32>,
        blinds: Blinds,
        min_bet: u32,
    ) -> Result<Box<dyn HandEngine>, EngineError>;
}

impl HandEngine for HandState {
    fn seat_count(&self) -> usize {
        HandState::seat_count(self)
    }

    fn actor_index(&self) -> Option<usize> {
        HandState::actor_index(self)
    }

    fn stacks(&self) -> &[u32] {
        HandState::stacks(self)
    }

    fn round_bets(&self) -> &[u32] {
        self.bets()
    }

    fn hole_cards(&self, seat: usize) -> &[Card] {
        HandState::hole_cards(self, seat)
    }

    fn board_cards_by_street(&self) -> &[Vec<Card>] {
        HandState::board_cards_by_street(self)
    }

    fn total_pot(&self) -> u32 {
        HandState::total_pot(self)
    }

    fn street_index(&self) -> Option<usize> {
        HandState::street_index(self)
    }

    fn in_progress(&self) -> bool {
        HandState::in_progress(self)
    }

    fn can_check_or_call(&self) -> bool {
        HandState::can_check_or_call(self)
    }

    fn check_or_call_amount(&self) -> u32 {
        HandState::check_or_call_amount(self)
    }

    fn can_fold(&self) -> bool {
        HandState::can_fold(self)
    }

    fn can_bet_or_raise(&self) -> bool {
        HandState::can_bet_or_raise(self)
    }

    fn min_bet_or_raise_to(&self) -> Option<u32> {
        HandState::min_bet_or_raise_to(self)
    }

    fn max_bet_or_raise_to(&self) -> Option<u32> {
        HandState::max_bet_or_raise_to(self)
    }

    fn fold(&mut self) -> Result<(), EngineError> {
        HandState::fold(self).map(|_| ())
    }

    fn check_or_call(&mut self) -> Result<(), EngineError> {
        HandState::check_or_call(self).map(|_| ())
    }

    fn bet_or_raise_to(&mut self, amount: u32) -> Result<(), EngineError> {
        HandState::bet_or_raise_to(self, amount).map(|_| ())
    }
}

/// Deals every hand with the bundled Hold'em engine.
///
/// With a base seed, the n-th hand created (counting from zero) is shuffled
/// with `seed + n`, so a run of hands replays identically.
#[derive(Debug, Default)]
pub struct StandardEngineFactory {
    seed: Option<u64>,
    dealt: AtomicU64,
}

impl StandardEngineFactory {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            dealt: AtomicU64::new(0),
        }
    }
}

impl EngineFactory for StandardEngineFactory {
    fn create(
        &self,
        starting_stacks: Vec<u32>,
        blinds: Blinds,
        min_bet: u32,
    ) -> Result<Box<dyn HandEngine>, EngineError> {
        let config = TableConfig::new(starting_stacks, blinds, min_bet);
        let state = match self.seed {
            Some(base) => {
                let n = self.dealt.fetch_add(1, Ordering::Relaxed);
                HandState::seeded(config, base.wrapping_add(n))?
            }
            None => HandState::shuffled(config)?,
        };
        Ok(Box::new(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_factory_replays_the_same_deals() {
        let first = StandardEngineFactory::new(Some(99));
        let second = StandardEngineFactory::new(Some(99));
        for _ in 0..3 {
            let a = first.create(vec![1000, 1000], Blinds::new(20, 40), 40).unwrap();
            let b = second.create(vec![1000, 1000], Blinds::new(20, 40), 40).unwrap();
            assert_eq!(a.hole_cards(0), b.hole_cards(0));
            assert_eq!(a.hole_cards(1), b.hole_cards(1));
        }
    }

    #[test]
    fn factory_surfaces_engine_config_errors() {
        let factory = StandardEngineFactory::new(None);
        let err = factory
            .create(vec![1000, 0], Blinds::new(20, 40), 40)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn engine_trait_reports_opening_state() {
        let engine = StandardEngineFactory::new(Some(5))
            .create(vec![500, 500, 500], Blinds::new(20, 40), 40)
            .unwrap();
        assert_eq!(engine.seat_count(), 3);
        assert_eq!(engine.actor_index(), Some(0));
        assert_eq!(engine.round_bets(), &[0, 20, 40]);
        assert_eq!(engine.street_index(), Some(0));
        assert!(engine.in_progress());
        assert_eq!(engine.check_or_call_amount(), 40);
    }
}
