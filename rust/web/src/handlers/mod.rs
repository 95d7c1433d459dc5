pub mod hands;
pub mod health;

pub use hands::{
    create_hand, get_hand, get_hand_state, list_hands, perform_action, welcome, ActionRequest,
    CreateHandRequest, ListHandsQuery,
};
pub use health::health;
