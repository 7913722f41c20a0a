//! Verse progression engine shared by the backend.
//!
//! Provides:
//! - Drip feed unlocking of queued verses on a weekday calendar
//! - Mastery phase state machine
//! - Review queue construction by scope and ordering mode
//! - XP, streak and level ledger with same-day diminishing returns
//! - A pluggable spaced-repetition scheduler (SM-2)
//!
//! Every entry point is synchronous and takes `now`/`today` explicitly.

pub mod calendar;
pub mod drip;
pub mod error;
pub mod ledger;
pub mod library;
pub mod patch;
pub mod phase;
pub mod queue;
pub mod reference;
pub mod review;
pub mod scheduler;
pub mod types;

pub use calendar::{study_day, Clock, FixedClock, SystemClock};
pub use drip::{DripSettings, WeekdaySet};
pub use error::{EngineError, Result};
pub use ledger::{level_from_xp, level_progress, xp_for_level, LevelProgress, ReviewAward};
pub use library::{ChangeSet, LibrarySnapshot, LibraryStats, NewVerses, VerseSort};
pub use patch::{CollectionPatch, ProfilePatch, VersePatch};
pub use phase::PhaseTransition;
pub use queue::{build_queue, EntryPoint, QueueEntry, QueueOutcome, QueueRequest, ReviewQueue, SessionStep};
pub use review::{grade_verse, GradeOutcome};
pub use scheduler::{get_scheduler, CardScheduler, CardState, CardStatus, SchedulingResult};
pub use types::{
    Collection, DailyReviewEntry, DripPeriod, Grade, InputMode, LearningPhase, LevelUpFlag,
    Passage, Profile, ReviewMode, ReviewScope, SessionConfig, Verse,
};
