//! Hands finished hands to the archive, retrying failed writes later.
//!
//! A failed write never touches the in-memory hand: the hand is parked in a
//! pending queue and retried by [`Archiver::retry_pending`] with exponential
//! backoff until it is stored or runs out of attempts.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::history::HandArchive;
use crate::models::CompletedHand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Writes attempted in total, the first one included.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(60),
            max_attempts: 8,
        }
    }
}

impl RetryPolicy {
    /// Delay before the write following failed attempt number `attempt`.
    ///
    /// ```
    /// use std::time::Duration;
    /// use holdem_web::archiver::RetryPolicy;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.backoff_for(1), Duration::from_millis(500));
    /// assert_eq!(policy.backoff_for(3), Duration::from_secs(2));
    /// assert_eq!(policy.backoff_for(20), Duration::from_secs(60));
    /// ```
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

#[derive(Debug, Clone)]
struct PendingArchive {
    hand: CompletedHand,
    attempts: u32,
    next_attempt: Instant,
}

#[derive(Debug)]
pub struct Archiver {
    store: Arc<dyn HandArchive>,
    policy: RetryPolicy,
    pending: Mutex<Vec<PendingArchive>>,
}

impl Archiver {
    pub fn new(store: Arc<dyn HandArchive>, policy: RetryPolicy) -> Self {
        Self {
            store,
            policy,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn HandArchive> {
        &self.store
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Writes `hand` once. Returns `false` when the write failed and the hand
    /// was queued for retry.
    pub fn archive(&self, hand: CompletedHand) -> bool {
        match self.store.archive(&hand) {
            Ok(()) => {
                tracing::info!(hand_id = %hand.id, "hand archived");
                true
            }
            Err(err) => {
                tracing::error!(
                    hand_id = %hand.id,
                    error_code = "storage_error",
                    error = %err,
                    "failed to archive hand, queued for retry"
                );
                if self.policy.max_attempts <= 1 {
                    self.give_up(&hand, 1);
                } else {
                    self.requeue(PendingArchive {
                        hand,
                        attempts: 1,
                        next_attempt: Instant::now() + self.policy.backoff_for(1),
                    });
                }
                false
            }
        }
    }

    pub fn retry_pending(&self) -> usize {
        self.retry_pending_at(Instant::now())
    }

    /// Retries every queued hand whose backoff has elapsed at `now`.
    /// Returns how many were stored.
    pub fn retry_pending_at(&self, now: Instant) -> usize {
        let due: Vec<PendingArchive> = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            let (due, waiting) = pending
                .drain(..)
                .partition(|p: &PendingArchive| p.next_attempt <= now);
            *pending = waiting;
            due
        };

        let mut stored = 0;
        for mut entry in due {
            entry.attempts += 1;
            match self.store.archive(&entry.hand) {
                Ok(()) => {
                    tracing::info!(
                        hand_id = %entry.hand.id,
                        attempts = entry.attempts,
                        "hand archived after retry"
                    );
                    stored += 1;
                }
                Err(err) if entry.attempts >= self.policy.max_attempts => {
                    tracing::error!(
                        hand_id = %entry.hand.id,
                        error_code = "storage_error",
                        error = %err,
                        "archive retry failed"
                    );
                    self.give_up(&entry.hand, entry.attempts);
                }
                Err(err) => {
                    tracing::warn!(
                        hand_id = %entry.hand.id,
                        attempts = entry.attempts,
                        error = %err,
                        "archive retry failed"
                    );
                    entry.next_attempt = now + self.policy.backoff_for(entry.attempts);
                    self.requeue(entry);
                }
            }
        }
        stored
    }

    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn requeue(&self, entry: PendingArchive) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    fn give_up(&self, hand: &CompletedHand, attempts: u32) {
        tracing::error!(
            hand_id = %hand.id,
            attempts,
            error_code = "storage_error",
            "giving up on archiving hand"
        );
    }
}
