use std::fmt;
use std::sync::RwLock;

use thiserror::Error;

use crate::ids::HandId;
use crate::models::CompletedHand;

/// Hands returned by a listing when the caller gives no limit.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Durable home of finished hands.
///
/// Archiving the same hand twice keeps the first copy, so a retried write
/// is harmless.
pub trait HandArchive: Send + Sync + fmt::Debug {
    fn archive(&self, hand: &CompletedHand) -> Result<(), ArchiveError>;

    /// Most recently archived first.
    fn list_recent(&self, limit: Option<usize>) -> Result<Vec<CompletedHand>, ArchiveError>;

    fn get(&self, hand_id: &HandId) -> Result<Option<CompletedHand>, ArchiveError>;
}

/// Archive kept in process memory; the default when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    hands: RwLock<Vec<CompletedHand>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_hands(&self) -> Result<usize, ArchiveError> {
        let hands = self
            .hands
            .read()
            .map_err(|_| ArchiveError::StoragePoisoned)?;
        Ok(hands.len())
    }
}

impl HandArchive for MemoryArchive {
    fn archive(&self, hand: &CompletedHand) -> Result<(), ArchiveError> {
        let mut hands = self
            .hands
            .write()
            .map_err(|_| ArchiveError::StoragePoisoned)?;
        if !hands.iter().any(|h| h.id == hand.id) {
            hands.push(hand.clone());
        }
        Ok(())
    }

    fn list_recent(&self, limit: Option<usize>) -> Result<Vec<CompletedHand>, ArchiveError> {
        let hands = self
            .hands
            .read()
            .map_err(|_| ArchiveError::StoragePoisoned)?;
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        Ok(hands.iter().rev().take(limit).cloned().collect())
    }

    fn get(&self, hand_id: &HandId) -> Result<Option<CompletedHand>, ArchiveError> {
        let hands = self
            .hands
            .read()
            .map_err(|_| ArchiveError::StoragePoisoned)?;
        Ok(hands.iter().find(|h| &h.id == hand_id).cloned())
    }
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Archive storage poisoned")]
    StoragePoisoned,
    #[error("Archive database is busy: {0}")]
    Busy(String),
    #[error("Archive database error: {0}")]
    Database(rusqlite::Error),
    #[error("Archived hand could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Archive unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for ArchiveError {
    fn from(err: rusqlite::Error) -> Self {
        if sqlite_busy(&err) {
            ArchiveError::Busy(err.to_string())
        } else {
            ArchiveError::Database(err)
        }
    }
}

fn sqlite_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(info, _)
            if matches!(
                info.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            )
    )
}

impl crate::errors::IntoErrorResponse for ArchiveError {
    fn status_code(&self) -> warp::http::StatusCode {
        warp::http::StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_code(&self) -> &'static str {
        "storage_error"
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn severity(&self) -> crate::errors::ErrorSeverity {
        match self {
            ArchiveError::StoragePoisoned => crate::errors::ErrorSeverity::Critical,
            _ => crate::errors::ErrorSeverity::Server,
        }
    }
}

impl From<ArchiveError> for crate::errors::HandError {
    fn from(err: ArchiveError) -> Self {
        crate::errors::HandError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::IntoErrorResponse;
    use crate::models::GameState;
    use holdem_engine::rules::Street;
    use std::collections::BTreeMap;

    fn finished() -> CompletedHand {
        CompletedHand::new(GameState {
            hand_id: HandId::new(),
            players: Vec::new(),
            board_cards: Vec::new(),
            pot: 60,
            active_player_id: None,
            current_street: Street::Preflop,
            current_bet: 0,
            winnings: Some(BTreeMap::new()),
            actions_log: vec!["f".to_string()],
            main_log: Vec::new(),
        })
    }

    #[test]
    fn lists_most_recent_first() {
        let archive = MemoryArchive::new();
        let hands: Vec<_> = (0..3).map(|_| finished()).collect();
        for hand in &hands {
            archive.archive(hand).unwrap();
        }

        let listed = archive.list_recent(None).unwrap();
        let ids: Vec<_> = listed.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![hands[2].id, hands[1].id, hands[0].id]);

        assert_eq!(archive.list_recent(Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn archiving_twice_keeps_one_copy() {
        let archive = MemoryArchive::new();
        let hand = finished();
        archive.archive(&hand).unwrap();
        archive.archive(&hand).unwrap();

        assert_eq!(archive.total_hands().unwrap(), 1);
        assert_eq!(archive.get(&hand.id).unwrap(), Some(hand.clone()));
        assert_eq!(archive.get(&hand.id).unwrap(), archive.get(&hand.id).unwrap());
        assert_eq!(archive.get(&HandId::new()).unwrap(), None);
    }

    #[test]
    fn archive_errors_are_server_errors() {
        let err = ArchiveError::Unavailable("disk full".into());
        assert_eq!(
            err.status_code(),
            warp::http::StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(err.to_error_response().error, "storage_error");
    }
}
