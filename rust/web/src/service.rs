use std::sync::Arc;

use crate::archiver::Archiver;
use crate::dispatcher::dispatch;
use crate::errors::HandError;
use crate::ids::HandId;
use crate::models::{CompletedHand, GameState};
use crate::registry::{lock_entry, HandStore};

/// Entry point for every hand operation exposed over HTTP.
#[derive(Debug, Clone)]
pub struct HandService {
    store: Arc<HandStore>,
    archiver: Arc<Archiver>,
}

impl HandService {
    pub fn new(store: Arc<HandStore>, archiver: Arc<Archiver>) -> Self {
        Self { store, archiver }
    }

    pub fn store(&self) -> &Arc<HandStore> {
        &self.store
    }

    pub fn archiver(&self) -> &Arc<Archiver> {
        &self.archiver
    }

    /// Deals a hand. One already settled by the blinds is archived at once.
    pub fn create_hand(&self, stack_size: i64, player_count: i64) -> Result<GameState, HandError> {
        let snapshot = self.store.create_hand(stack_size, player_count)?;
        if snapshot.is_terminal() {
            self.archiver.archive(CompletedHand::new(snapshot.clone()));
        }
        Ok(snapshot)
    }

    /// Applies one action under the hand's lock. A hand that ends with this
    /// action is archived after the lock is released; an archive failure
    /// does not fail the action.
    pub fn perform_action(
        &self,
        hand_id: &str,
        player_id: &str,
        action_type: &str,
        amount: Option<i64>,
    ) -> Result<GameState, HandError> {
        let hand_id = HandId::parse(hand_id)?;
        let entry = self.store.lookup(&hand_id)?;
        let outcome = {
            let mut guard = lock_entry(&entry)?;
            dispatch(&mut guard, player_id, action_type, amount, self.store.rules())
        };
        let snapshot = outcome.inspect_err(|err| {
            tracing::warn!(
                hand_id = %hand_id,
                player_id,
                action_type,
                error = %err,
                "action rejected"
            );
        })?;

        if snapshot.is_terminal() {
            self.archiver.archive(CompletedHand::new(snapshot.clone()));
        }
        Ok(snapshot)
    }

    /// Latest snapshot of a hand still held in memory.
    pub fn live_snapshot(&self, hand_id: &str) -> Result<GameState, HandError> {
        let hand_id = HandId::parse(hand_id)?;
        self.store.last_snapshot(&hand_id)
    }

    pub fn archived_hands(&self, limit: Option<usize>) -> Result<Vec<CompletedHand>, HandError> {
        Ok(self.archiver.store().list_recent(limit)?)
    }

    /// Only finished, archived hands are found here.
    pub fn archived_hand(&self, hand_id: &str) -> Result<CompletedHand, HandError> {
        let hand_id = HandId::parse(hand_id)?;
        self.archiver
            .store()
            .get(&hand_id)?
            .ok_or_else(|| HandError::NotFound(hand_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archiver::RetryPolicy;
    use crate::engine::StandardEngineFactory;
    use crate::history::MemoryArchive;
    use crate::registry::TableRules;

    fn service() -> HandService {
        let store = Arc::new(HandStore::new(
            Arc::new(StandardEngineFactory::new(Some(8))),
            TableRules::default(),
        ));
        let archiver = Arc::new(Archiver::new(
            Arc::new(MemoryArchive::new()),
            RetryPolicy::default(),
        ));
        HandService::new(store, archiver)
    }

    #[test]
    fn finished_hand_is_archived_and_still_live() {
        let service = service();
        let state = service.create_hand(1000, 2).unwrap();
        let id = state.hand_id.to_string();

        assert!(matches!(
            service.archived_hand(&id),
            Err(HandError::NotFound(_))
        ));

        let done = service.perform_action(&id, "player_1", "fold", None).unwrap();
        assert!(done.is_terminal());

        let archived = service.archived_hand(&id).unwrap();
        assert_eq!(archived.game_state, done);
        assert_eq!(service.live_snapshot(&id).unwrap(), done);
        assert_eq!(service.archived_hands(None).unwrap().len(), 1);
    }

    #[test]
    fn hand_settled_by_the_blinds_is_archived_on_creation() {
        let store = Arc::new(HandStore::new(
            Arc::new(StandardEngineFactory::new(Some(8))),
            TableRules {
                blinds: holdem_engine::rules::Blinds::new(40, 40),
                min_bet: 40,
            },
        ));
        let archiver = Arc::new(Archiver::new(
            Arc::new(MemoryArchive::new()),
            RetryPolicy::default(),
        ));
        let service = HandService::new(store, archiver);

        let state = service.create_hand(40, 2).unwrap();
        assert!(state.is_terminal());
        let archived = service.archived_hand(&state.hand_id.to_string()).unwrap();
        assert_eq!(archived.game_state, state);
    }

    #[test]
    fn overflowing_tables_are_refused_before_any_play() {
        let service = service();
        assert!(matches!(
            service.create_hand(3_000_000_000, 2),
            Err(HandError::Validation(_))
        ));
        assert!(service.store().is_empty());
    }

    #[test]
    fn malformed_and_unknown_ids() {
        let service = service();
        assert!(matches!(
            service.perform_action("nope", "player_0", "fold", None),
            Err(HandError::Validation(_))
        ));
        let unknown = HandId::new().to_string();
        assert!(matches!(
            service.perform_action(&unknown, "player_0", "fold", None),
            Err(HandError::NotFound(_))
        ));
        assert!(matches!(
            service.live_snapshot(&unknown),
            Err(HandError::NotFound(_))
        ));
    }
}
