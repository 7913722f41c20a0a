//! Pluggable spaced-repetition scheduling.
//!
//! The engine only reads `due_date` and hands the state back to the
//! scheduler; everything else in `CardState` belongs to the implementation.

pub mod sm2;

use crate::types::Grade;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Card status in the scheduler's own learning flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    New,
    Learning,
    Review,
    Relearning,
}

/// Opaque scheduler state stored on each verse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardState {
    pub status: CardStatus,
    pub interval_days: f64,
    pub ease_factor: f64,
    pub lapses: u32,
    pub reviews_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl Default for CardState {
    fn default() -> Self {
        Self {
            status: CardStatus::New,
            interval_days: 0.0,
            ease_factor: 2.5,
            lapses: 0,
            reviews_count: 0,
            due_date: None,
        }
    }
}

/// Result of scheduling a card after review.
#[derive(Debug, Clone)]
pub struct SchedulingResult {
    pub new_state: CardState,
    pub next_due: DateTime<Utc>,
}

/// Trait for spaced-repetition schedulers.
pub trait CardScheduler: Send + Sync {
    /// Scheduler identifier.
    fn name(&self) -> &'static str;

    /// State for a card created at `now`. New cards are due immediately.
    fn new_card(&self, now: DateTime<Utc>) -> CardState;

    /// Whether the card should be reviewed at `now`.
    fn is_due(&self, state: &CardState, now: DateTime<Utc>) -> bool {
        state.due_date.map_or(true, |due| due <= now)
    }

    /// Calculate the next state after a review.
    fn schedule(&self, state: &CardState, grade: Grade, now: DateTime<Utc>) -> SchedulingResult;
}

/// Get scheduler by name.
pub fn get_scheduler(name: &str) -> Option<Box<dyn CardScheduler>> {
    match name {
        "sm2" => Some(Box::new(sm2::Sm2::default())),
        _ => None,
    }
}
