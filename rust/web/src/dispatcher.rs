//! Validates a player's action against the hand and applies it.
//!
//! Every check runs before the engine is touched. A refused action leaves
//! the entry, its engine and both logs exactly as they were.

use holdem_engine::errors::EngineError;

use crate::action::PlayerAction;
use crate::engine::HandEngine;
use crate::errors::HandError;
use crate::ids::SeatIndex;
use crate::models::GameState;
use crate::narrative;
use crate::projector::project;
use crate::registry::{HandEntry, TableRules};
use crate::street;

/// The engine primitive an accepted action maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    Fold,
    CheckOrCall,
    BetOrRaiseTo(u32),
}

/// Applies one action to `entry` and returns the snapshot that replaces its
/// previous one.
pub fn dispatch(
    entry: &mut HandEntry,
    player_id: &str,
    action_type: &str,
    amount: Option<i64>,
    rules: TableRules,
) -> Result<GameState, HandError> {
    let hand_id = entry.hand_id();
    let seat = SeatIndex::parse_for_table(player_id, entry.engine().seat_count())?;

    let Some(actor) = entry.engine().actor_index().map(SeatIndex::new) else {
        return Err(HandError::guard(format!(
            "Hand {hand_id} is already complete."
        )));
    };
    if seat != actor {
        return Err(HandError::not_your_turn(seat, actor));
    }

    let action = PlayerAction::from_request(action_type, amount).inspect_err(|err| {
        tracing::warn!(
            hand_id = %hand_id,
            player_id = %seat,
            action_type,
            "rejected action request: {err}"
        );
    })?;
    let step = plan(entry.engine(), &action, rules)?;

    apply(entry.engine_mut(), step).map_err(|err| HandError::guard(err.to_string()))?;
    tracing::debug!(
        hand_id = %hand_id,
        player_id = %seat,
        action = ?action,
        "action applied"
    );

    let code = action.code();
    let mut next = project(
        hand_id,
        entry.engine(),
        entry.initial_stacks(),
        Some(entry.snapshot()),
        Some(&code),
    );
    narrative::log_action(&mut next, seat, &action);
    for change in street::boundaries(entry.snapshot(), &next) {
        narrative::log_street_change(&mut next, &change);
    }
    if next.is_terminal() {
        narrative::log_hand_end(&mut next);
        tracing::info!(hand_id = %hand_id, pot = next.pot, "hand completed");
    }

    entry.replace_snapshot(next.clone());
    Ok(next)
}

fn plan(engine: &dyn HandEngine, action: &PlayerAction, rules: TableRules) -> Result<Move, HandError> {
    let facing_bet = engine.round_bets().iter().any(|&bet| bet > 0);

    match *action {
        PlayerAction::Fold => Ok(Move::Fold),
        PlayerAction::Check => {
            if facing_bet {
                return Err(HandError::guard(
                    "Cannot check when there is an active bet. You must call, raise, or fold.",
                ));
            }
            Ok(Move::CheckOrCall)
        }
        PlayerAction::Call => {
            if !facing_bet {
                return Err(HandError::guard(
                    "Cannot call when there is no bet to call. Use check or bet.",
                ));
            }
            Ok(Move::CheckOrCall)
        }
        PlayerAction::Bet(amount) => {
            if facing_bet {
                return Err(HandError::guard(
                    "Cannot bet when there is already a bet in the round. Use raise or call.",
                ));
            }
            let minimum = engine
                .min_bet_or_raise_to()
                .ok_or_else(|| HandError::guard(EngineError::CannotBetOrRaise.to_string()))?;
            if amount < minimum {
                return Err(HandError::guard(format!(
                    "Bet amount must be at least {minimum}."
                )));
            }
            let unit = rules.min_bet;
            if amount > unit && amount % unit != 0 {
                return Err(HandError::guard(format!(
                    "Bet amount must be in increments of {unit} chips."
                )));
            }
            Ok(Move::BetOrRaiseTo(amount))
        }
        PlayerAction::Raise(amount) => {
            if !facing_bet {
                return Err(HandError::guard(
                    "Cannot raise when there is no bet to raise. Use bet.",
                ));
            }
            Ok(Move::BetOrRaiseTo(amount))
        }
        PlayerAction::AllIn => all_in(engine),
    }
}

/// Pushes the actor's whole stack: a bet or raise when one is open, else a
/// call that uses every remaining chip.
fn all_in(engine: &dyn HandEngine) -> Result<Move, HandError> {
    if let Some(maximum) = engine.max_bet_or_raise_to() {
        return Ok(Move::BetOrRaiseTo(maximum));
    }
    let stack = engine
        .actor_index()
        .map(|seat| engine.stacks()[seat])
        .unwrap_or(0);
    if stack > 0 && engine.check_or_call_amount() == stack {
        return Ok(Move::CheckOrCall);
    }
    Err(HandError::guard(EngineError::CannotBetOrRaise.to_string()))
}

fn apply(engine: &mut dyn HandEngine, step: Move) -> Result<(), EngineError> {
    match step {
        Move::Fold => engine.fold(),
        Move::CheckOrCall => engine.check_or_call(),
        Move::BetOrRaiseTo(amount) => engine.bet_or_raise_to(amount),
    }
}
