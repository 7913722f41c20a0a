//! Profile endpoints

use axum::{extract::State, Extension, Json};
use verse_core::{level_progress, ProfilePatch};

use crate::error::Result;
use crate::models::ProfileResponse;
use crate::routes::auth::AuthenticatedAccount;
use crate::AppState;

/// GET /api/profile
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
) -> Result<Json<ProfileResponse>> {
    let profile = state
        .store
        .get_profile(auth.account_id)
        .await?
        .refreshed(state.today());
    let progress = level_progress(profile.xp);

    Ok(Json(ProfileResponse { profile, progress }))
}

/// POST /api/profile/level-up/ack
/// Clears a pending level-up celebration
pub async fn acknowledge_level_up(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
) -> Result<Json<ProfileResponse>> {
    let mut profile = state.store.get_profile(auth.account_id).await?;

    if profile.level_up.is_pending() {
        profile.level_up = profile.level_up.acknowledge();
        let patch = ProfilePatch {
            level_up: Some(profile.level_up),
            ..Default::default()
        };
        state.store.patch_profile(auth.account_id, &patch).await?;
    }

    let profile = profile.refreshed(state.today());
    let progress = level_progress(profile.xp);
    Ok(Json(ProfileResponse { profile, progress }))
}
