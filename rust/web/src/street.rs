use holdem_engine::cards::Card;
use holdem_engine::rules::Street;

use crate::models::GameState;

/// A street that became current between two snapshots, with the board cards
/// it revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetChange {
    pub street: Street,
    pub revealed: Vec<Card>,
}

/// Compares the street of two consecutive snapshots.
///
/// `revealed` is everything on the current board past what `previous` showed,
/// so it spans several streets when a board is run out in one step.
pub fn detect(previous: &GameState, current: &GameState) -> Option<StreetChange> {
    if previous.current_street == current.current_street {
        return None;
    }
    let shown = previous.board_cards.len().min(current.board_cards.len());
    Some(StreetChange {
        street: current.current_street,
        revealed: current.board_cards[shown..].to_vec(),
    })
}

/// Splits the board growth between two snapshots into one change per street
/// crossed, in reveal order.
///
/// ```
/// use holdem_engine::rules::Street;
/// use holdem_web::street::boundaries;
/// # use holdem_web::ids::HandId;
/// # use holdem_web::models::GameState;
/// # fn snapshot(street: Street, board: &[&str]) -> GameState {
/// #     GameState {
/// #         hand_id: HandId::new(),
/// #         players: Vec::new(),
/// #         board_cards: board.iter().map(|c| c.parse().unwrap()).collect(),
/// #         pot: 0,
/// #         active_player_id: None,
/// #         current_street: street,
/// #         current_bet: 0,
/// #         winnings: None,
/// #         actions_log: Vec::new(),
/// #         main_log: Vec::new(),
/// #     }
/// # }
/// let before = snapshot(Street::Preflop, &[]);
/// let after = snapshot(Street::River, &["2c", "7d", "9h", "Js", "Ah"]);
///
/// let streets: Vec<_> = boundaries(&before, &after).iter().map(|c| c.street).collect();
/// assert_eq!(streets, [Street::Flop, Street::Turn, Street::River]);
/// ```
pub fn boundaries(previous: &GameState, current: &GameState) -> Vec<StreetChange> {
    if detect(previous, current).is_none() {
        return Vec::new();
    }
    let shown = previous.board_cards.len();
    let mut changes = Vec::new();
    let mut start = 0;
    for street in Street::ALL.into_iter().skip(1) {
        let end = start + street.board_cards_dealt();
        if start >= shown && end <= current.board_cards.len() {
            changes.push(StreetChange {
                street,
                revealed: current.board_cards[start..end].to_vec(),
            });
        }
        start = end;
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::HandId;

    fn snapshot(street: Street, board: &[&str]) -> GameState {
        GameState {
            hand_id: HandId::new(),
            players: Vec::new(),
            board_cards: board.iter().map(|c| c.parse().unwrap()).collect(),
            pot: 0,
            active_player_id: None,
            current_street: street,
            current_bet: 0,
            winnings: None,
            actions_log: Vec::new(),
            main_log: Vec::new(),
        }
    }

    #[test]
    fn same_street_is_no_change() {
        let a = snapshot(Street::Flop, &["2c", "7d", "9h"]);
        let b = snapshot(Street::Flop, &["2c", "7d", "9h"]);
        assert_eq!(detect(&a, &b), None);
        assert!(boundaries(&a, &b).is_empty());
    }

    #[test]
    fn flop_reveals_three_cards() {
        let a = snapshot(Street::Preflop, &[]);
        let b = snapshot(Street::Flop, &["2c", "7d", "9h"]);
        let change = detect(&a, &b).unwrap();
        assert_eq!(change.street, Street::Flop);
        assert_eq!(change.revealed.len(), 3);
    }

    #[test]
    fn turn_reveals_only_the_new_card() {
        let a = snapshot(Street::Flop, &["2c", "7d", "9h"]);
        let b = snapshot(Street::Turn, &["2c", "7d", "9h", "Js"]);
        let change = detect(&a, &b).unwrap();
        assert_eq!(change.street, Street::Turn);
        assert_eq!(change.revealed, vec!["Js".parse().unwrap()]);
    }

    #[test]
    fn runout_from_flop_splits_turn_and_river() {
        let a = snapshot(Street::Flop, &["2c", "7d", "9h"]);
        let b = snapshot(Street::River, &["2c", "7d", "9h", "Js", "Ah"]);
        let changes = boundaries(&a, &b);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].street, Street::Turn);
        assert_eq!(changes[0].revealed, vec!["Js".parse().unwrap()]);
        assert_eq!(changes[1].street, Street::River);
        assert_eq!(changes[1].revealed, vec!["Ah".parse().unwrap()]);
    }
}
