//! Derives client snapshots from engine state.

use std::collections::BTreeMap;

use holdem_engine::cards::concat_codes;
use holdem_engine::rules::Street;

use crate::engine::HandEngine;
use crate::ids::{HandId, SeatIndex};
use crate::models::{GameState, Player, PlayerStatus};

/// Builds the next snapshot of a hand.
///
/// `action_code` is appended to the actions log when given, followed by the
/// concatenated codes of any board cards revealed since `previous`. The
/// narrative log is carried over unchanged.
pub fn project(
    hand_id: HandId,
    engine: &dyn HandEngine,
    initial_stacks: &[u32],
    previous: Option<&GameState>,
    action_code: Option<&str>,
) -> GameState {
    let stacks = engine.stacks();
    let bets = engine.round_bets();

    let players: Vec<Player> = (0..engine.seat_count())
        .map(|seat| {
            let cards = engine.hole_cards(seat).to_vec();
            let status = if cards.is_empty() {
                PlayerStatus::Folded
            } else {
                PlayerStatus::Active
            };
            Player {
                player_id: SeatIndex::new(seat),
                stack: stacks[seat],
                cards,
                current_bet_in_round: bets[seat],
                status,
                is_dealer: seat == 0,
                is_small_blind: seat == 1,
                is_big_blind: seat == 2,
            }
        })
        .collect();

    let board_cards: Vec<_> = engine
        .board_cards_by_street()
        .iter()
        .flatten()
        .copied()
        .collect();

    let mut actions_log = previous
        .map(|p| p.actions_log.clone())
        .unwrap_or_default();
    if let Some(code) = action_code {
        actions_log.push(code.to_string());
    }
    let previously_shown = previous.map(|p| p.board_cards.len()).unwrap_or(0);
    if board_cards.len() > previously_shown {
        actions_log.push(concat_codes(&board_cards[previously_shown..]));
    }

    let current_street = engine
        .street_index()
        .and_then(Street::from_index)
        .unwrap_or(Street::Preflop);

    let winnings = (!engine.in_progress()).then(|| {
        initial_stacks
            .iter()
            .enumerate()
            .map(|(seat, &initial)| {
                let delta = i64::from(stacks[seat]) - i64::from(initial);
                (SeatIndex::new(seat), delta)
            })
            .collect::<BTreeMap<_, _>>()
    });

    GameState {
        hand_id,
        players,
        board_cards,
        pot: engine.total_pot(),
        active_player_id: engine.actor_index().map(SeatIndex::new),
        current_street,
        current_bet: bets.iter().copied().max().unwrap_or(0),
        winnings,
        actions_log,
        main_log: previous.map(|p| p.main_log.clone()).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineFactory, StandardEngineFactory};
    use holdem_engine::rules::Blinds;

    fn engine(seats: usize) -> Box<dyn HandEngine> {
        StandardEngineFactory::new(Some(11))
            .create(vec![1000; seats], Blinds::new(20, 40), 40)
            .unwrap()
    }

    #[test]
    fn initial_projection_reflects_blinds() {
        let engine = engine(2);
        let state = project(HandId::new(), engine.as_ref(), &[1000, 1000], None, None);

        assert_eq!(state.players.len(), 2);
        assert!(state.players.iter().all(|p| p.cards.len() == 2));
        assert_eq!(state.current_bet, 40);
        assert_eq!(state.pot, 60);
        assert_eq!(state.active_player_id, Some(SeatIndex::new(1)));
        assert_eq!(state.current_street, Street::Preflop);
        assert!(state.winnings.is_none());
        assert!(state.actions_log.is_empty());
        assert!(state.players[0].is_dealer);
        assert!(state.players[1].is_small_blind);
        assert!(!state.players.iter().any(|p| p.is_big_blind));
    }

    #[test]
    fn three_handed_marks_big_blind_seat() {
        let engine = engine(3);
        let state = project(HandId::new(), engine.as_ref(), &[1000; 3], None, None);
        assert!(state.players[2].is_big_blind);
        assert_eq!(state.players[2].current_bet_in_round, 40);
    }

    #[test]
    fn fold_projection_reports_zero_sum_winnings() {
        let mut engine = engine(2);
        let id = HandId::new();
        let first = project(id, engine.as_ref(), &[1000, 1000], None, None);

        engine.fold().unwrap();
        let next = project(id, engine.as_ref(), &[1000, 1000], Some(&first), Some("f"));

        let winnings = next.winnings.as_ref().expect("terminal");
        assert_eq!(winnings.values().sum::<i64>(), 0);
        assert_eq!(winnings[&SeatIndex::new(0)], 20);
        assert_eq!(next.active_player_id, None);
        assert_eq!(next.players[1].status, PlayerStatus::Folded);
        assert_eq!(next.actions_log, vec!["f".to_string()]);
    }

    #[test]
    fn new_board_cards_are_logged_as_one_entry() {
        let mut engine = engine(2);
        let id = HandId::new();
        let first = project(id, engine.as_ref(), &[1000, 1000], None, None);
        engine.check_or_call().unwrap();
        let second = project(id, engine.as_ref(), &[1000, 1000], Some(&first), Some("c"));
        engine.check_or_call().unwrap();
        let third = project(id, engine.as_ref(), &[1000, 1000], Some(&second), Some("x"));

        assert_eq!(third.current_street, Street::Flop);
        assert_eq!(third.board_cards.len(), 3);
        assert_eq!(third.actions_log.len(), 3);
        assert_eq!(third.actions_log[..2], ["c".to_string(), "x".to_string()]);
        assert_eq!(third.actions_log[2], concat_codes(&third.board_cards));
    }
}
