use std::collections::BTreeMap;

use holdem_engine::cards::Card;
use holdem_engine::rules::Street;
use serde::{Deserialize, Serialize};

use crate::ids::{HandId, SeatIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Active,
    Folded,
}

/// One seat as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: SeatIndex,
    pub stack: u32,
    pub cards: Vec<Card>,
    pub current_bet_in_round: u32,
    pub status: PlayerStatus,
    pub is_dealer: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
}

/// Client-facing snapshot of a hand.
///
/// `active_player_id` is set exactly while the hand runs and `winnings`
/// exactly once it has ended. Both logs only ever grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub hand_id: HandId,
    pub players: Vec<Player>,
    pub board_cards: Vec<Card>,
    pub pot: u32,
    pub active_player_id: Option<SeatIndex>,
    pub current_street: Street,
    pub current_bet: u32,
    /// Net chips per seat against its starting stack.
    pub winnings: Option<BTreeMap<SeatIndex, i64>>,
    pub actions_log: Vec<String>,
    pub main_log: Vec<String>,
}

impl GameState {
    pub fn is_terminal(&self) -> bool {
        self.winnings.is_some()
    }

    pub fn player(&self, seat: SeatIndex) -> Option<&Player> {
        self.players.get(seat.index())
    }
}

/// A finished hand as stored in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedHand {
    pub id: HandId,
    pub game_state: GameState,
}

impl CompletedHand {
    pub fn new(game_state: GameState) -> Self {
        Self {
            id: game_state.hand_id,
            game_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> GameState {
        GameState {
            hand_id: HandId::new(),
            players: vec![Player {
                player_id: SeatIndex::new(0),
                stack: 960,
                cards: vec!["As".parse().unwrap(), "Kd".parse().unwrap()],
                current_bet_in_round: 40,
                status: PlayerStatus::Active,
                is_dealer: true,
                is_small_blind: false,
                is_big_blind: false,
            }],
            board_cards: Vec::new(),
            pot: 60,
            active_player_id: Some(SeatIndex::new(1)),
            current_street: Street::Preflop,
            current_bet: 40,
            winnings: None,
            actions_log: Vec::new(),
            main_log: vec!["---".to_string()],
        }
    }

    #[test]
    fn snapshot_serializes_with_wire_names() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["players"][0]["player_id"], "player_0");
        assert_eq!(value["players"][0]["cards"], json!(["As", "Kd"]));
        assert_eq!(value["players"][0]["status"], "active");
        assert_eq!(value["active_player_id"], "player_1");
        assert_eq!(value["current_street"], "preflop");
        assert!(value["winnings"].is_null());
    }

    #[test]
    fn winnings_serialize_as_object_keyed_by_player() {
        let mut state = sample();
        state.active_player_id = None;
        state.winnings = Some(BTreeMap::from([
            (SeatIndex::new(0), 20),
            (SeatIndex::new(1), -20),
        ]));

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["winnings"], json!({"player_0": 20, "player_1": -20}));
        assert!(value["active_player_id"].is_null());

        let back: GameState = serde_json::from_value(value).unwrap();
        assert_eq!(back, state);
        assert!(back.is_terminal());
    }
}
