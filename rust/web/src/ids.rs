use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::errors::HandError;

const PLAYER_PREFIX: &str = "player_";

/// Identifier of a hand, generated at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandId(Uuid);

impl HandId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a client-supplied identifier; anything but a UUID is a validation error.
    pub fn parse(raw: &str) -> Result<Self, HandError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| HandError::validation(format!("Invalid hand ID format: {raw}")))
    }
}

impl Default for HandId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Seat of a player, rendered to clients as `player_<index>`.
///
/// ```
/// use holdem_web::ids::SeatIndex;
///
/// let seat: SeatIndex = "player_2".parse().unwrap();
/// assert_eq!(seat.index(), 2);
/// assert_eq!(seat.to_string(), "player_2");
/// assert!("player_x".parse::<SeatIndex>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeatIndex(usize);

impl SeatIndex {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// Parses `raw` and checks it names one of `seat_count` seats.
    pub fn parse_for_table(raw: &str, seat_count: usize) -> Result<Self, HandError> {
        let seat: SeatIndex = raw
            .parse()
            .map_err(|_| HandError::validation(format!("Invalid player ID: {raw}")))?;
        if seat.0 >= seat_count {
            return Err(HandError::validation(format!(
                "Invalid player ID: {raw} (table has {seat_count} seats)"
            )));
        }
        Ok(seat)
    }
}

impl fmt::Display for SeatIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PLAYER_PREFIX}{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatParseError(pub String);

impl fmt::Display for SeatParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid player id `{}`", self.0)
    }
}

impl std::error::Error for SeatParseError {}

impl FromStr for SeatIndex {
    type Err = SeatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(PLAYER_PREFIX)
            .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| SeatParseError(s.to_string()))?;
        digits
            .parse()
            .map(SeatIndex)
            .map_err(|_| SeatParseError(s.to_string()))
    }
}

impl Serialize for SeatIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SeatIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_id_rejects_non_uuid() {
        assert!(matches!(
            HandId::parse("not-a-uuid"),
            Err(HandError::Validation(_))
        ));
        let id = HandId::new();
        assert_eq!(HandId::parse(&id.to_string()), Ok(id));
    }

    #[test]
    fn seat_parsing_checks_table_size() {
        assert_eq!(
            SeatIndex::parse_for_table("player_1", 2),
            Ok(SeatIndex::new(1))
        );
        assert!(SeatIndex::parse_for_table("player_2", 2).is_err());
        assert!(SeatIndex::parse_for_table("player_", 2).is_err());
        assert!(SeatIndex::parse_for_table("player_-1", 2).is_err());
        assert!(SeatIndex::parse_for_table("seat_0", 2).is_err());
    }

    #[test]
    fn seat_serializes_as_player_id() {
        let json = serde_json::to_string(&SeatIndex::new(3)).unwrap();
        assert_eq!(json, "\"player_3\"");
        let back: SeatIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SeatIndex::new(3));
    }
}
