//! In-memory registry of every hand dealt by this process.
//!
//! Each hand sits behind its own mutex so actions on one hand are applied
//! one at a time while distinct hands proceed independently. Entries are
//! never evicted here.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use holdem_engine::rules::Blinds;

use crate::engine::{EngineFactory, HandEngine};
use crate::errors::HandError;
use crate::ids::HandId;
use crate::models::GameState;
use crate::narrative;
use crate::projector::project;

pub const MIN_PLAYERS: i64 = 2;
pub const MAX_PLAYERS: i64 = 6;

/// Table parameters shared by every hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRules {
    pub blinds: Blinds,
    /// Smallest opening bet; bets above it must be whole multiples of it.
    pub min_bet: u32,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            blinds: Blinds::default(),
            min_bet: 40,
        }
    }
}

/// A registered hand: the engine, the stacks it started from and the
/// latest snapshot handed to clients.
#[derive(Debug)]
pub struct HandEntry {
    hand_id: HandId,
    engine: Box<dyn HandEngine>,
    initial_stacks: Vec<u32>,
    snapshot: GameState,
}

impl HandEntry {
    pub fn hand_id(&self) -> HandId {
        self.hand_id
    }

    pub fn engine(&self) -> &dyn HandEngine {
        self.engine.as_ref()
    }

    pub(crate) fn engine_mut(&mut self) -> &mut dyn HandEngine {
        self.engine.as_mut()
    }

    pub fn initial_stacks(&self) -> &[u32] {
        &self.initial_stacks
    }

    pub fn snapshot(&self) -> &GameState {
        &self.snapshot
    }

    pub(crate) fn replace_snapshot(&mut self, snapshot: GameState) {
        self.snapshot = snapshot;
    }
}

pub type SharedEntry = Arc<Mutex<HandEntry>>;

#[derive(Debug)]
pub struct HandStore {
    hands: RwLock<HashMap<HandId, SharedEntry>>,
    factory: Arc<dyn EngineFactory>,
    rules: TableRules,
}

impl HandStore {
    pub fn new(factory: Arc<dyn EngineFactory>, rules: TableRules) -> Self {
        Self {
            hands: RwLock::new(HashMap::new()),
            factory,
            rules,
        }
    }

    pub fn rules(&self) -> TableRules {
        self.rules
    }

    /// Deals a new hand with `player_count` equal stacks and registers it.
    ///
    /// Returns the opening snapshot, narrative header included.
    pub fn create_hand(
        &self,
        stack_size: i64,
        player_count: i64,
    ) -> Result<GameState, HandError> {
        if stack_size <= 0 {
            return Err(HandError::validation(format!(
                "stack_size must be positive, got {stack_size}"
            )));
        }
        let stack = u32::try_from(stack_size).map_err(|_| {
            HandError::validation(format!("stack_size {stack_size} is too large"))
        })?;
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(HandError::validation(format!(
                "player_count must be between {MIN_PLAYERS} and {MAX_PLAYERS}, got {player_count}"
            )));
        }
        let big_blind = self.rules.blinds.big;
        if stack < big_blind {
            return Err(HandError::validation(format!(
                "stack_size must cover the big blind of {big_blind}, got {stack_size}"
            )));
        }
        // Every chip on the table has to fit the engine's pot arithmetic.
        if stack.checked_mul(player_count as u32).is_none() {
            return Err(HandError::validation(format!(
                "stack_size {stack_size} is too large for {player_count} players"
            )));
        }
        let seats = player_count as usize;

        let initial_stacks = vec![stack; seats];
        let engine = self
            .factory
            .create(initial_stacks.clone(), self.rules.blinds, self.rules.min_bet)
            .map_err(|err| HandError::validation(err.to_string()))?;

        let hand_id = HandId::new();
        let mut snapshot = project(hand_id, engine.as_ref(), &initial_stacks, None, None);
        narrative::log_hand_start(&mut snapshot, self.rules.blinds, &initial_stacks);
        if snapshot.is_terminal() {
            narrative::log_hand_end(&mut snapshot);
        }

        let entry = HandEntry {
            hand_id,
            engine,
            initial_stacks,
            snapshot: snapshot.clone(),
        };
        self.hands
            .write()
            .map_err(|_| HandError::StoragePoisoned)?
            .insert(hand_id, Arc::new(Mutex::new(entry)));

        tracing::info!(
            hand_id = %hand_id,
            players = seats,
            stack_size = stack,
            "hand created"
        );
        Ok(snapshot)
    }

    pub fn lookup(&self, hand_id: &HandId) -> Result<SharedEntry, HandError> {
        let guard = self.hands.read().map_err(|_| HandError::StoragePoisoned)?;
        guard
            .get(hand_id)
            .cloned()
            .ok_or_else(|| HandError::NotFound(hand_id.to_string()))
    }

    pub fn last_snapshot(&self, hand_id: &HandId) -> Result<GameState, HandError> {
        let entry = self.lookup(hand_id)?;
        let guard = lock_entry(&entry)?;
        Ok(guard.snapshot.clone())
    }

    pub fn len(&self) -> usize {
        self.hands.read().map(|hands| hands.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn lock_entry(entry: &SharedEntry) -> Result<MutexGuard<'_, HandEntry>, HandError> {
    entry.lock().map_err(|_| HandError::StoragePoisoned)
}
