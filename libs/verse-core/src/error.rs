//! Error types for verse-core.

use crate::types::LearningPhase;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias using EngineError.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by engine operations.
///
/// Dangling ids in a collection's verse order and disabled drip settings are
/// normal states and never surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid grade {0}: expected 1-4")]
    InvalidGrade(u8),

    #[error("invalid weekday index {0}: expected 0-6")]
    InvalidWeekday(u8),

    #[error("verse not found: {0}")]
    VerseNotFound(Uuid),

    #[error("collection not found: {0}")]
    CollectionNotFound(Uuid),

    #[error("verse {id} is in the {phase} phase and needs a self-reported grade")]
    GradeRequired { id: Uuid, phase: LearningPhase },

    #[error("invalid drip settings: {0}")]
    InvalidDripSettings(String),
}
