//! SM-2 scheduler.
//!
//! Based on SuperMemo 2 with configurable parameters.

use super::{CardScheduler, CardState, CardStatus, SchedulingResult};
use crate::types::Grade;
use chrono::{DateTime, Duration, Utc};

/// SM-2 scheduler with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub easy_bonus: f64,
    pub hard_multiplier: f64,
    pub graduating_interval: f64,
    pub easy_interval: f64,
    /// Minutes until a failed learning card comes back.
    pub relearn_minutes: i64,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            easy_bonus: 1.3,
            hard_multiplier: 1.2,
            graduating_interval: 1.0,
            easy_interval: 4.0,
            relearn_minutes: 10,
        }
    }
}

impl CardScheduler for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn new_card(&self, now: DateTime<Utc>) -> CardState {
        CardState {
            status: CardStatus::New,
            interval_days: 0.0,
            ease_factor: self.initial_ease,
            lapses: 0,
            reviews_count: 0,
            due_date: Some(now),
        }
    }

    fn schedule(&self, state: &CardState, grade: Grade, now: DateTime<Utc>) -> SchedulingResult {
        let (status, interval, ease, lapses) = match state.status {
            CardStatus::New | CardStatus::Learning => self.schedule_learning(state, grade),
            CardStatus::Review | CardStatus::Relearning => self.schedule_review(state, grade),
        };

        let next_due = if interval > 0.0 {
            now + Duration::days(interval.ceil() as i64)
        } else {
            now + Duration::minutes(self.relearn_minutes)
        };

        SchedulingResult {
            new_state: CardState {
                status,
                interval_days: interval,
                ease_factor: ease,
                lapses,
                reviews_count: state.reviews_count + 1,
                due_date: Some(next_due),
            },
            next_due,
        }
    }
}

impl Sm2 {
    fn schedule_learning(&self, state: &CardState, grade: Grade) -> (CardStatus, f64, f64, u32) {
        match grade {
            Grade::Easy => (CardStatus::Review, self.easy_interval, state.ease_factor, state.lapses),
            Grade::Good => (
                CardStatus::Review,
                self.graduating_interval,
                state.ease_factor,
                state.lapses,
            ),
            Grade::Again | Grade::Hard => (CardStatus::Learning, 0.0, state.ease_factor, state.lapses),
        }
    }

    fn schedule_review(&self, state: &CardState, grade: Grade) -> (CardStatus, f64, f64, u32) {
        let (ease_adj, multiplier) = match grade {
            Grade::Again => {
                return (
                    CardStatus::Relearning,
                    1.0,
                    (state.ease_factor - 0.2).max(self.minimum_ease),
                    state.lapses + 1,
                );
            }
            Grade::Hard => (-0.15, self.hard_multiplier),
            Grade::Good => (0.0, state.ease_factor),
            Grade::Easy => (0.15, state.ease_factor * self.easy_bonus),
        };
        let interval = (state.interval_days * multiplier).max(1.0);
        let ease = (state.ease_factor + ease_adj).max(self.minimum_ease);
        (CardStatus::Review, interval, ease, state.lapses)
    }
}
