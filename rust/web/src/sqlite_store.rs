//! SQLite-backed hand archive.

use std::path::Path;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::history::{ArchiveError, HandArchive, DEFAULT_LIST_LIMIT};
use crate::ids::HandId;
use crate::models::{CompletedHand, GameState};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS completed_hands (
    id TEXT NOT NULL PRIMARY KEY,
    game_state TEXT NOT NULL,
    created_at TEXT NOT NULL
)";

/// Stores each finished hand as a JSON snapshot keyed by its id.
#[derive(Debug)]
pub struct SqliteArchive {
    conn: Mutex<Connection>,
}

impl SqliteArchive {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ArchiveError::Unavailable(format!(
                        "Failed to create parent directory for {}: {e}",
                        path.display()
                    ))
                })?;
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, ArchiveError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, ArchiveError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn decode(id: String, raw: String) -> Result<CompletedHand, ArchiveError> {
        let game_state: GameState = serde_json::from_str(&raw)?;
        let hand = CompletedHand::new(game_state);
        if hand.id.to_string() != id {
            return Err(ArchiveError::Unavailable(format!(
                "row {id} holds a snapshot of hand {}",
                hand.id
            )));
        }
        Ok(hand)
    }
}

impl HandArchive for SqliteArchive {
    fn archive(&self, hand: &CompletedHand) -> Result<(), ArchiveError> {
        let raw = serde_json::to_string(&hand.game_state)?;
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let conn = self
            .conn
            .lock()
            .map_err(|_| ArchiveError::StoragePoisoned)?;
        conn.execute(
            "INSERT OR IGNORE INTO completed_hands (id, game_state, created_at)
             VALUES (?1, ?2, ?3)",
            params![hand.id.to_string(), raw, created_at],
        )?;
        Ok(())
    }

    fn list_recent(&self, limit: Option<usize>) -> Result<Vec<CompletedHand>, ArchiveError> {
        let limit = i64::try_from(limit.unwrap_or(DEFAULT_LIST_LIMIT)).unwrap_or(i64::MAX);
        let conn = self
            .conn
            .lock()
            .map_err(|_| ArchiveError::StoragePoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT id, game_state FROM completed_hands
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut hands = Vec::new();
        for row in rows {
            let (id, raw) = row?;
            hands.push(Self::decode(id, raw)?);
        }
        Ok(hands)
    }

    fn get(&self, hand_id: &HandId) -> Result<Option<CompletedHand>, ArchiveError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| ArchiveError::StoragePoisoned)?;
        let row = conn
            .query_row(
                "SELECT id, game_state FROM completed_hands WHERE id = ?1",
                params![hand_id.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        row.map(|(id, raw)| Self::decode(id, raw)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdem_engine::rules::Street;
    use std::collections::BTreeMap;

    fn finished() -> CompletedHand {
        CompletedHand::new(GameState {
            hand_id: HandId::new(),
            players: Vec::new(),
            board_cards: vec!["Ah".parse().unwrap(), "Kh".parse().unwrap(), "2c".parse().unwrap()],
            pot: 120,
            active_player_id: None,
            current_street: Street::Flop,
            current_bet: 0,
            winnings: Some(BTreeMap::new()),
            actions_log: vec!["c".into(), "x".into(), "AhKh2c".into(), "b40".into(), "f".into()],
            main_log: vec!["Final pot was 120".into()],
        })
    }

    #[test]
    fn stores_and_reads_back_snapshots() {
        let archive = SqliteArchive::in_memory().unwrap();
        let first = finished();
        let second = finished();
        archive.archive(&first).unwrap();
        archive.archive(&second).unwrap();
        archive.archive(&first).unwrap();

        assert_eq!(archive.get(&first.id).unwrap(), Some(first.clone()));
        assert_eq!(archive.get(&HandId::new()).unwrap(), None);

        let listed = archive.list_recent(None).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(archive.list_recent(Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn survives_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hands.sqlite");
        let hand = finished();
        {
            let archive = SqliteArchive::open(&path).unwrap();
            archive.archive(&hand).unwrap();
        }
        let reopened = SqliteArchive::open(&path).unwrap();
        assert_eq!(reopened.get(&hand.id).unwrap(), Some(hand));
    }
}
