//! Human-readable hand history appended to `GameState::main_log`.
//!
//! Lines are only ever appended. Players are named by seat number, so
//! `player_2` reads as "Player 2".

use holdem_engine::cards::concat_codes;
use holdem_engine::rules::{Blinds, Street};

use crate::action::PlayerAction;
use crate::ids::SeatIndex;
use crate::models::GameState;
use crate::street::StreetChange;

const SEPARATOR: &str = "---";

fn push(state: &mut GameState, line: String) {
    state.main_log.push(line);
}

/// Header, dealt cards, button and blind postings.
///
/// A seat whose starting stack is short of its blind posts the whole stack.
pub fn log_hand_start(state: &mut GameState, blinds: Blinds, initial_stacks: &[u32]) {
    let header = format!("--- Hand #{} started ---", state.hand_id);
    push(state, header);
    let dealt: Vec<String> = state
        .players
        .iter()
        .map(|p| {
            format!(
                "Player {} is dealt {}",
                p.player_id.index(),
                concat_codes(&p.cards)
            )
        })
        .collect();
    state.main_log.extend(dealt);
    push(state, SEPARATOR.to_string());

    let seats = state.players.len();
    if seats > 0 {
        push(state, "Player 0 is the dealer".to_string());
    }
    let posted = |seat: usize, blind: u32| {
        initial_stacks
            .get(seat)
            .map_or(blind, |&stack| blind.min(stack))
    };
    if seats > 1 {
        let small = posted(1, blinds.small);
        push(state, format!("Player 1 posts small blind - {small} chips"));
    }
    if seats > 2 {
        let big = posted(2, blinds.big);
        push(state, format!("Player 2 posts big blind - {big} chips"));
    }
    push(state, SEPARATOR.to_string());
}

pub fn log_action(state: &mut GameState, seat: SeatIndex, action: &PlayerAction) {
    let n = seat.index();
    let line = match action {
        PlayerAction::Fold => format!("Player {n} folds"),
        PlayerAction::Check => format!("Player {n} checks"),
        PlayerAction::Call => format!("Player {n} calls"),
        PlayerAction::Bet(amount) => format!("Player {n} bets {amount}"),
        PlayerAction::Raise(amount) => format!("Player {n} raises to {amount} chips"),
        PlayerAction::AllIn => format!("Player {n} goes all-in"),
    };
    push(state, line);
}

pub fn log_street_change(state: &mut GameState, change: &StreetChange) {
    let cards = concat_codes(&change.revealed);
    let line = match change.street {
        Street::Flop => format!("Flop cards dealt: {cards}"),
        Street::Turn => format!("Turn card dealt: {cards}"),
        Street::River => format!("River card dealt: {cards}"),
        Street::Preflop => return,
    };
    push(state, line);
}

/// Closing lines; the pot reported is the one the snapshot shows.
pub fn log_hand_end(state: &mut GameState) {
    let ended = format!("Hand #{} ended", state.hand_id);
    let pot = format!("Final pot was {}", state.pot);
    push(state, ended);
    push(state, pot);
}
