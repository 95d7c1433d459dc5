//! No-Limit Hold'em betting state for a single hand.
//!
//! Seating follows a fixed convention: seat 1 posts the small blind and the
//! big blind sits at seat `2 % n`, so heads-up the small blind (seat 1) opens
//! preflop and seat 0 opens every later street. With three or more players
//! seat 0 holds the button, the seat after the big blind opens preflop and
//! the first live seat after the button opens postflop.
//!
//! Hole cards are dealt one at a time starting from seat 0, two passes. Each
//! street burns one card before the board cards are dealt.

use std::collections::VecDeque;

use serde::Serialize;

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::EngineError;
use crate::hand::{evaluate_hand, HandStrength};
use crate::pot::{split_evenly, PotManager};
use crate::rules::{Blinds, Street, TableConfig};

/// Chips pushed to a seat when the hand ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Award {
    pub seat: usize,
    pub amount: u32,
}

#[derive(Debug)]
pub struct HandState {
    blinds: Blinds,
    min_bet: u32,
    button: usize,
    small_blind_seat: usize,
    big_blind_seat: usize,
    starting_stacks: Vec<u32>,
    stacks: Vec<u32>,
    bets: Vec<u32>,
    contributions: Vec<u32>,
    collected: u32,
    live: Vec<bool>,
    hole_cards: Vec<Vec<Card>>,
    board: Vec<Vec<Card>>,
    street: Street,
    actors: VecDeque<usize>,
    last_raise: u32,
    deck: Deck,
    in_progress: bool,
    awards: Vec<Award>,
}

impl HandState {
    /// Posts blinds, deals hole cards and opens preflop betting using `deck`
    /// in its current order.
    ///
    /// # Examples
    ///
    /// ```
    /// use holdem_engine::rules::{Blinds, TableConfig};
    /// use holdem_engine::state::HandState;
    ///
    /// let config = TableConfig::new(vec![1000, 1000], Blinds::new(20, 40), 40);
    /// let mut hand = HandState::seeded(config, 7).unwrap();
    /// assert_eq!(hand.actor_index(), Some(1));
    /// assert_eq!(hand.total_pot(), 60);
    ///
    /// hand.fold().unwrap();
    /// assert!(!hand.in_progress());
    /// assert_eq!(hand.stacks(), &[1020, 980]);
    /// ```
    pub fn with_deck(config: TableConfig, deck: Deck) -> Result<Self, EngineError> {
        config.validate()?;
        let n = config.seat_count();
        if deck.remaining() < 2 * n + 8 {
            return Err(EngineError::DeckExhausted);
        }
        let heads_up = n == 2;
        let mut state = Self {
            blinds: config.blinds,
            min_bet: config.min_bet,
            button: if heads_up { 1 } else { 0 },
            small_blind_seat: 1,
            big_blind_seat: 2 % n,
            stacks: config.starting_stacks.clone(),
            starting_stacks: config.starting_stacks,
            bets: vec![0; n],
            contributions: vec![0; n],
            collected: 0,
            live: vec![true; n],
            hole_cards: vec![Vec::with_capacity(2); n],
            board: Vec::with_capacity(3),
            street: Street::Preflop,
            actors: VecDeque::with_capacity(n),
            last_raise: 0,
            deck,
            in_progress: true,
            awards: Vec::new(),
        };
        state.post_blinds();
        state.deal_hole_cards()?;
        state.open_round();
        state.advance()?;
        Ok(state)
    }

    /// Shuffles a ChaCha20 deck seeded with `seed` and starts the hand.
    pub fn seeded(config: TableConfig, seed: u64) -> Result<Self, EngineError> {
        let mut deck = Deck::new_with_seed(seed);
        deck.shuffle();
        Self::with_deck(config, deck)
    }

    /// Starts the hand with a deck shuffled from OS entropy.
    pub fn shuffled(config: TableConfig) -> Result<Self, EngineError> {
        let mut deck = Deck::from_entropy();
        deck.shuffle();
        Self::with_deck(config, deck)
    }

    // ----- queries -----

    pub fn seat_count(&self) -> usize {
        self.stacks.len()
    }

    pub fn blinds(&self) -> Blinds {
        self.blinds
    }

    pub fn min_bet(&self) -> u32 {
        self.min_bet
    }

    pub fn button(&self) -> usize {
        self.button
    }

    pub fn small_blind_seat(&self) -> usize {
        self.small_blind_seat
    }

    pub fn big_blind_seat(&self) -> usize {
        self.big_blind_seat
    }

    pub fn starting_stacks(&self) -> &[u32] {
        &self.starting_stacks
    }

    pub fn stacks(&self) -> &[u32] {
        &self.stacks
    }

    /// Chips each seat has put in during the current betting round.
    pub fn bets(&self) -> &[u32] {
        &self.bets
    }

    /// Hole cards still held by `seat`; empty once the seat has folded.
    pub fn hole_cards(&self, seat: usize) -> &[Card] {
        self.hole_cards.get(seat).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Board cards grouped by the street that revealed them.
    pub fn board_cards_by_street(&self) -> &[Vec<Card>] {
        &self.board
    }

    pub fn board_cards(&self) -> Vec<Card> {
        self.board.iter().flatten().copied().collect()
    }

    /// Current street while the hand runs; the last street reached afterwards.
    pub fn street(&self) -> Street {
        self.street
    }

    pub fn street_index(&self) -> Option<usize> {
        Some(self.street.index())
    }

    /// Collected pot plus outstanding bets, or the amount awarded once the
    /// hand has ended.
    pub fn total_pot(&self) -> u32 {
        if self.in_progress {
            self.collected + self.bets.iter().sum::<u32>()
        } else {
            self.awards.iter().map(|a| a.amount).sum()
        }
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn actor_index(&self) -> Option<usize> {
        if self.in_progress {
            self.actors.front().copied()
        } else {
            None
        }
    }

    pub fn awards(&self) -> &[Award] {
        &self.awards
    }

    pub fn is_live(&self, seat: usize) -> bool {
        self.live.get(seat).copied().unwrap_or(false)
    }

    fn max_bet(&self) -> u32 {
        self.bets.iter().copied().max().unwrap_or(0)
    }

    pub fn can_fold(&self) -> bool {
        self.actor_index()
            .is_some_and(|seat| self.bets[seat] < self.max_bet())
    }

    pub fn can_check_or_call(&self) -> bool {
        self.actor_index().is_some()
    }

    /// Chips the actor needs to add to check (0) or call, capped by their stack.
    pub fn check_or_call_amount(&self) -> u32 {
        self.actor_index()
            .map(|seat| self.call_amount(seat))
            .unwrap_or(0)
    }

    pub fn can_bet_or_raise(&self) -> bool {
        let Some(seat) = self.actor_index() else {
            return false;
        };
        let others_can_respond =
            (0..self.seat_count()).any(|i| i != seat && self.live[i] && self.stacks[i] > 0);
        self.stacks[seat] > self.call_amount(seat) && others_can_respond
    }

    /// Smallest legal bet-or-raise-to total; a short stack may always go all-in.
    pub fn min_bet_or_raise_to(&self) -> Option<u32> {
        if !self.can_bet_or_raise() {
            return None;
        }
        let seat = self.actor_index()?;
        let full = self.max_bet() + self.last_raise.max(self.min_bet);
        Some(full.min(self.bets[seat] + self.stacks[seat]))
    }

    pub fn max_bet_or_raise_to(&self) -> Option<u32> {
        if !self.can_bet_or_raise() {
            return None;
        }
        let seat = self.actor_index()?;
        Some(self.bets[seat] + self.stacks[seat])
    }

    // ----- actions -----

    pub fn fold(&mut self) -> Result<usize, EngineError> {
        let seat = self.require_actor()?;
        if !self.can_fold() {
            return Err(EngineError::CannotFold);
        }
        self.actors.pop_front();
        self.live[seat] = false;
        self.hole_cards[seat].clear();
        self.advance()?;
        Ok(seat)
    }

    /// Checks when nothing is owed, otherwise calls. Returns the chips added.
    pub fn check_or_call(&mut self) -> Result<u32, EngineError> {
        let seat = self.require_actor()?;
        let amount = self.call_amount(seat);
        self.actors.pop_front();
        self.commit(seat, amount);
        self.advance()?;
        Ok(amount)
    }

    /// Bets or raises so the actor's round total becomes `amount`.
    pub fn bet_or_raise_to(&mut self, amount: u32) -> Result<u32, EngineError> {
        let seat = self.require_actor()?;
        let (Some(minimum), Some(maximum)) =
            (self.min_bet_or_raise_to(), self.max_bet_or_raise_to())
        else {
            return Err(EngineError::CannotBetOrRaise);
        };
        if amount < minimum {
            return Err(EngineError::AmountBelowMinimum { amount, minimum });
        }
        if amount > maximum {
            return Err(EngineError::AmountAboveMaximum { amount, maximum });
        }

        let increment = amount - self.max_bet();
        if increment >= self.last_raise.max(self.min_bet) {
            self.last_raise = increment;
        }
        self.commit(seat, amount - self.bets[seat]);

        let n = self.seat_count();
        self.actors = (1..n)
            .map(|offset| (seat + offset) % n)
            .filter(|&i| self.live[i] && self.stacks[i] > 0)
            .collect();
        self.advance()?;
        Ok(amount)
    }

    // ----- automation -----

    fn require_actor(&self) -> Result<usize, EngineError> {
        if !self.in_progress {
            return Err(EngineError::HandComplete);
        }
        self.actor_index().ok_or(EngineError::NoActor)
    }

    fn call_amount(&self, seat: usize) -> u32 {
        (self.max_bet() - self.bets[seat]).min(self.stacks[seat])
    }

    fn commit(&mut self, seat: usize, amount: u32) {
        self.stacks[seat] -= amount;
        self.bets[seat] += amount;
        self.contributions[seat] += amount;
    }

    fn live_count(&self) -> usize {
        self.live.iter().filter(|&&l| l).count()
    }

    fn post_blinds(&mut self) {
        for (seat, blind) in [
            (self.small_blind_seat, self.blinds.small),
            (self.big_blind_seat, self.blinds.big),
        ] {
            let amount = blind.min(self.stacks[seat]);
            self.commit(seat, amount);
        }
    }

    fn draw(&mut self) -> Result<Card, EngineError> {
        self.deck.deal_card().ok_or(EngineError::DeckExhausted)
    }

    fn deal_hole_cards(&mut self) -> Result<(), EngineError> {
        for _ in 0..2 {
            for seat in 0..self.seat_count() {
                let card = self.draw()?;
                self.hole_cards[seat].push(card);
            }
        }
        Ok(())
    }

    fn deal_street(&mut self, street: Street) -> Result<(), EngineError> {
        self.deck.burn_card().ok_or(EngineError::DeckExhausted)?;
        let cards = (0..street.board_cards_dealt())
            .map(|_| self.draw())
            .collect::<Result<Vec<_>, _>>()?;
        self.board.push(cards);
        self.street = street;
        Ok(())
    }

    fn open_round(&mut self) {
        let n = self.seat_count();
        let (start, last_raise) = match self.street {
            Street::Preflop => ((self.big_blind_seat + 1) % n, self.blinds.big),
            _ => ((self.button + 1) % n, 0),
        };
        self.last_raise = last_raise;
        self.actors = (0..n)
            .map(|offset| (start + offset) % n)
            .filter(|&i| self.live[i] && self.stacks[i] > 0)
            .collect();

        let max_bet = self.max_bet();
        let betting_needed = match self.actors.len() {
            0 => false,
            1 => self.actors.front().is_some_and(|&i| self.bets[i] < max_bet),
            _ => true,
        };
        if !betting_needed {
            self.actors.clear();
        }
    }

    /// Runs every step that needs no player decision: closing betting
    /// rounds, dealing streets, showdown and pushing chips.
    fn advance(&mut self) -> Result<(), EngineError> {
        loop {
            if self.live_count() <= 1 {
                self.collect_bets();
                self.award_uncontested();
                return Ok(());
            }
            if !self.actors.is_empty() {
                return Ok(());
            }
            self.collect_bets();
            match self.street.next() {
                Some(next) => {
                    self.deal_street(next)?;
                    self.open_round();
                }
                None => {
                    self.showdown();
                    return Ok(());
                }
            }
        }
    }

    fn collect_bets(&mut self) {
        self.collected += self.bets.iter().sum::<u32>();
        self.bets.iter_mut().for_each(|b| *b = 0);
    }

    fn award_uncontested(&mut self) {
        if let Some(winner) = (0..self.seat_count()).find(|&i| self.live[i]) {
            self.push_chips(vec![Award {
                seat: winner,
                amount: self.collected,
            }]);
        }
        self.finish();
    }

    fn showdown(&mut self) {
        let n = self.seat_count();
        let board = self.board_cards();
        let strengths: Vec<Option<HandStrength>> = (0..n)
            .map(|seat| {
                if !self.live[seat] {
                    return None;
                }
                let mut seven = [self.hole_cards[seat][0]; 7];
                for (slot, card) in seven
                    .iter_mut()
                    .zip(self.hole_cards[seat].iter().chain(board.iter()))
                {
                    *slot = *card;
                }
                Some(evaluate_hand(&seven))
            })
            .collect();

        let pots = PotManager::layered(&self.contributions, &self.live);
        let mut awards = Vec::new();
        for pot in pots.pots() {
            let best = pot
                .eligible
                .iter()
                .filter_map(|&seat| strengths[seat].as_ref())
                .max()
                .cloned();
            let Some(best) = best else { continue };
            let mut winners: Vec<usize> = pot
                .eligible
                .iter()
                .copied()
                .filter(|&seat| strengths[seat].as_ref() == Some(&best))
                .collect();
            // Odd chips go to the first winner left of the button.
            winners.sort_by_key(|&seat| (seat + n - self.button - 1) % n);
            awards.extend(
                split_evenly(pot.amount, &winners)
                    .into_iter()
                    .map(|(seat, amount)| Award { seat, amount }),
            );
        }
        self.push_chips(awards);
        self.finish();
    }

    fn push_chips(&mut self, awards: Vec<Award>) {
        for award in &awards {
            self.stacks[award.seat] += award.amount;
        }
        self.awards = awards;
        self.collected = 0;
    }

    fn finish(&mut self) {
        self.in_progress = false;
        self.actors.clear();
    }
}
