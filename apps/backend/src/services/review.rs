//! Review session service.

use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;
use verse_core::{build_queue, grade_verse, Grade, QueueOutcome, QueueRequest};

use crate::error::Result;
use crate::models::{GradeRequest, GradeResponse, QueueEntryView, QueueResponse};
use crate::services::library;
use crate::AppState;

/// Build a review queue after bringing drip state up to date.
pub async fn queue(state: &AppState, account_id: Uuid, request: QueueRequest) -> Result<QueueResponse> {
    let snapshot = library::load_with_drip(state, account_id).await?;

    let mut rng = StdRng::from_entropy();
    let outcome = build_queue(
        &request,
        &snapshot.verses,
        &snapshot.collections,
        state.scheduler.as_ref(),
        state.now(),
        &mut rng,
    );

    let queue = match outcome {
        QueueOutcome::Ready(queue) => queue,
        QueueOutcome::NothingEligible => {
            tracing::debug!(%account_id, scope = ?request.scope, "Nothing eligible for review");
            return Ok(QueueResponse::NothingEligible);
        }
    };

    let entries = queue
        .entries
        .iter()
        .filter_map(|entry| {
            snapshot.verse(entry.verse_id).map(|verse| QueueEntryView {
                verse_id: verse.id,
                reference: verse.reference.clone(),
                text: verse.text.clone(),
                learning_phase: verse.learning_phase,
                auto_grade: entry.auto_grade,
            })
        })
        .collect();

    Ok(QueueResponse::Ready {
        mode: queue.mode,
        entries,
        config: queue.config,
    })
}

/// Grade one verse and persist everything the review changed.
pub async fn grade(state: &AppState, account_id: Uuid, request: GradeRequest) -> Result<GradeResponse> {
    let grade = request.grade.map(Grade::try_from).transpose()?;
    let mut snapshot = library::load_snapshot(state, account_id).await?;

    let outcome = grade_verse(
        &snapshot,
        request.verse_id,
        grade,
        state.scheduler.as_ref(),
        state.now(),
        state.today(),
    )?;

    library::persist(state, account_id, &outcome.changes).await?;
    snapshot.apply(&outcome.changes);

    if !outcome.activated.is_empty() {
        tracing::info!(
            %account_id,
            verse_id = %outcome.verse_id,
            activated = outcome.activated.len(),
            "Catch-up activated queued verses"
        );
    }
    if outcome.award.leveled_up {
        tracing::info!(%account_id, level = outcome.award.level, "Level up");
    }

    Ok(GradeResponse {
        verse_id: outcome.verse_id,
        grade: outcome.grade.to_value(),
        auto_graded: outcome.auto_graded,
        xp_earned: outcome.award.xp_earned,
        total_xp: snapshot.profile.xp,
        level: outcome.award.level,
        leveled_up: outcome.award.leveled_up,
        level_up: snapshot.profile.level_up,
        streak: outcome.award.streak,
        learning_phase: outcome.transition.to,
        activated: outcome.activated,
        next_due: outcome.next_due,
    })
}
