use std::fmt;

use crate::errors::HandError;

/// An action a seat may submit. Only bets and raises carry an amount; for a
/// raise the amount is the total the seat's round bet is raised to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    Bet(u32),
    Raise(u32),
    AllIn,
}

impl PlayerAction {
    /// Builds an action from the wire fields of an action request.
    ///
    /// Amounts sent with fold/check/call/all_in are ignored.
    pub fn from_request(action_type: &str, amount: Option<i64>) -> Result<Self, HandError> {
        match action_type.trim().to_ascii_lowercase().as_str() {
            "fold" => Ok(PlayerAction::Fold),
            "check" => Ok(PlayerAction::Check),
            "call" => Ok(PlayerAction::Call),
            "bet" => Ok(PlayerAction::Bet(required_amount("bet", amount)?)),
            "raise" => Ok(PlayerAction::Raise(required_amount("raise", amount)?)),
            "all_in" => Ok(PlayerAction::AllIn),
            other => Err(HandError::validation(format!("Invalid action: {other}"))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlayerAction::Fold => "fold",
            PlayerAction::Check => "check",
            PlayerAction::Call => "call",
            PlayerAction::Bet(_) => "bet",
            PlayerAction::Raise(_) => "raise",
            PlayerAction::AllIn => "all_in",
        }
    }

    /// Compact code recorded in the actions log.
    pub fn code(&self) -> String {
        match self {
            PlayerAction::Fold => "f".to_string(),
            PlayerAction::Check => "x".to_string(),
            PlayerAction::Call => "c".to_string(),
            PlayerAction::Bet(amount) => format!("b{amount}"),
            PlayerAction::Raise(amount) => format!("r{amount}"),
            PlayerAction::AllIn => "allin".to_string(),
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::Bet(amount) | PlayerAction::Raise(amount) => {
                write!(f, "{} {amount}", self.name())
            }
            _ => f.write_str(self.name()),
        }
    }
}

fn required_amount(action: &str, amount: Option<i64>) -> Result<u32, HandError> {
    let amount = amount.ok_or_else(|| {
        HandError::validation(format!("Amount must be specified for {action} action."))
    })?;
    u32::try_from(amount)
        .ok()
        .filter(|&a| a > 0)
        .ok_or_else(|| HandError::validation(format!("Invalid {action} amount: {amount}")))
}
