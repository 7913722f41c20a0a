//! Grading pipeline: schedule, catch-up, phase, ledger.

use crate::drip;
use crate::error::{EngineError, Result};
use crate::ledger::{self, ReviewAward};
use crate::library::{ChangeSet, LibrarySnapshot};
use crate::patch::{ProfilePatch, VersePatch};
use crate::phase::PhaseTransition;
use crate::scheduler::CardScheduler;
use crate::types::Grade;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Everything one graded review changes.
#[derive(Debug, Clone)]
pub struct GradeOutcome {
    pub verse_id: Uuid,
    pub grade: Grade,
    /// The grade was supplied by the engine for a beginner verse.
    pub auto_graded: bool,
    pub transition: PhaseTransition,
    pub award: ReviewAward,
    pub next_due: DateTime<Utc>,
    /// Verses unlocked by catch-up, the reviewed one first.
    pub activated: Vec<Uuid>,
    pub changes: ChangeSet,
}

/// Grade one verse against a snapshot.
///
/// `grade` may be omitted only while the verse is a beginner, in which case
/// it is recorded as Good.
pub fn grade_verse(
    snapshot: &LibrarySnapshot,
    verse_id: Uuid,
    grade: Option<Grade>,
    scheduler: &dyn CardScheduler,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> Result<GradeOutcome> {
    let verse = snapshot
        .verse(verse_id)
        .ok_or(EngineError::VerseNotFound(verse_id))?;

    let (grade, auto_graded) = match (grade, verse.learning_phase.auto_grade()) {
        (Some(grade), _) => (grade, false),
        (None, Some(grade)) => (grade, true),
        (None, None) => {
            return Err(EngineError::GradeRequired {
                id: verse_id,
                phase: verse.learning_phase,
            })
        }
    };

    let scheduled = scheduler.schedule(&verse.card, grade, now);

    let mut changes = ChangeSet::default();
    let catch_up = drip::manual_catch_up(verse, &snapshot.collections, &snapshot.index());
    let activated = match catch_up {
        Some(catch_up) => {
            changes.activate(catch_up.activate.iter().copied());
            for (collection_id, patch) in catch_up.patches() {
                changes.patch_collection(collection_id, patch);
            }
            catch_up.activate
        }
        None => Vec::new(),
    };

    let transition = verse.learning_phase.advance(grade);
    changes.patch_verse(
        verse_id,
        VersePatch {
            card: Some(scheduled.new_state),
            learning_phase: transition.changed().then_some(transition.to),
            ..Default::default()
        },
    );

    let (profile, award) = ledger::record_review(snapshot.profile.clone(), verse_id, grade, today);
    changes.profile = Some(ProfilePatch::from_profile(&profile));

    Ok(GradeOutcome {
        verse_id,
        grade,
        auto_graded,
        transition,
        award,
        next_due: scheduled.next_due,
        activated,
        changes,
    })
}
