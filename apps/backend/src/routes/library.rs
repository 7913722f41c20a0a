//! Library load endpoint

use axum::{extract::State, Extension, Json};
use verse_core::level_progress;

use crate::error::Result;
use crate::models::LibraryResponse;
use crate::routes::auth::AuthenticatedAccount;
use crate::services::library;
use crate::AppState;

/// GET /api/library
/// Runs the calendar drip, then returns everything the account owns
pub async fn load(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
) -> Result<Json<LibraryResponse>> {
    let snapshot = library::load_with_drip(&state, auth.account_id).await?;
    let stats = snapshot.stats(state.scheduler.as_ref(), state.now());
    let progress = level_progress(snapshot.profile.xp);

    Ok(Json(LibraryResponse {
        verses: snapshot.verses,
        collections: snapshot.collections,
        profile: snapshot.profile,
        progress,
        stats,
    }))
}
