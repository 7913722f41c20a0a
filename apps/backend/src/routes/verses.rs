//! Verse endpoints

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;
use verse_core::{EngineError, Verse};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedAccount;
use crate::services::library;
use crate::AppState;

/// GET /api/verses
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
    Query(query): Query<VerseListQuery>,
) -> Result<Json<VersesResponse>> {
    let snapshot = library::load_snapshot(&state, auth.account_id).await?;
    let verses = snapshot
        .sorted_verses(query.sort)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(VersesResponse { verses }))
}

/// POST /api/verses
/// Adds passages to the library. Verses added to a drip collection
/// beyond what the collection has unlocked are stored inactive.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
    Json(payload): Json<CreateVersesRequest>,
) -> Result<Json<VersesResponse>> {
    if payload.passages.is_empty() {
        return Err(ApiError::BadRequest("No passages given".to_string()));
    }
    if let Some(passage) = payload
        .passages
        .iter()
        .find(|p| p.reference.trim().is_empty() || p.text.trim().is_empty())
    {
        return Err(ApiError::BadRequest(format!(
            "Passage is missing a reference or text: {:?}",
            passage.reference
        )));
    }

    let snapshot = library::load_snapshot(&state, auth.account_id).await?;
    let planned = snapshot.plan_new_verses(
        payload.passages,
        &payload.collection_ids,
        state.scheduler.as_ref(),
        state.now(),
        state.today(),
    )?;

    state
        .store
        .create_verses(auth.account_id, &planned.verses)
        .await?;
    library::persist(&state, auth.account_id, &planned.changes).await?;

    let queued = planned.verses.iter().filter(|v| !v.active).count();
    tracing::info!(
        account_id = %auth.account_id,
        added = planned.verses.len(),
        queued,
        "Added verses"
    );

    Ok(Json(VersesResponse {
        verses: planned.verses,
    }))
}

/// PUT /api/verses/:id/star
pub async fn star(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
    Path(verse_id): Path<Uuid>,
    Json(payload): Json<StarRequest>,
) -> Result<Json<Verse>> {
    let mut snapshot = library::load_snapshot(&state, auth.account_id).await?;
    let changes = snapshot.plan_star(verse_id, payload.starred)?;

    library::persist(&state, auth.account_id, &changes).await?;
    snapshot.apply(&changes);

    let verse = snapshot
        .verse(verse_id)
        .cloned()
        .ok_or(EngineError::VerseNotFound(verse_id))?;
    Ok(Json(verse))
}

/// DELETE /api/verses/:id
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
    Path(verse_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>> {
    let removed = state
        .store
        .delete_verses(auth.account_id, &[verse_id])
        .await?;
    if removed == 0 {
        return Err(ApiError::NotFound(format!("Verse {}", verse_id)));
    }

    tracing::info!(account_id = %auth.account_id, %verse_id, "Deleted verse");

    Ok(Json(DeleteResponse {
        deleted: true,
        deleted_verses: removed,
    }))
}
