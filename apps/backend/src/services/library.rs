//! Snapshot loading and change persistence.

use uuid::Uuid;
use verse_core::{ChangeSet, LibrarySnapshot};

use crate::error::Result;
use crate::AppState;

/// Load an account's data with a stale daily review log discarded.
pub async fn load_snapshot(state: &AppState, account_id: Uuid) -> Result<LibrarySnapshot> {
    let verses = state.store.list_verses(account_id).await?;
    let collections = state.store.list_collections(account_id).await?;
    let profile = state.store.get_profile(account_id).await?;

    Ok(LibrarySnapshot::new(verses, collections, profile).refreshed(state.today()))
}

/// Load an account's data and run the calendar drip over it.
///
/// Drip results are persisted before they are reflected in the returned
/// snapshot; a failed write fails the load.
pub async fn load_with_drip(state: &AppState, account_id: Uuid) -> Result<LibrarySnapshot> {
    let mut snapshot = load_snapshot(state, account_id).await?;
    let pass = snapshot.plan_drip(state.today());
    if pass.changes.is_empty() {
        return Ok(snapshot);
    }

    persist(state, account_id, &pass.changes).await?;

    for run in pass.runs.iter().filter(|run| !run.activate.is_empty()) {
        tracing::info!(
            %account_id,
            collection_id = %run.collection_id,
            elapsed = run.elapsed,
            unlocked = run.activate.len(),
            cursor = run.cursor,
            "Drip unlocked verses"
        );
    }

    snapshot.apply(&pass.changes);
    Ok(snapshot)
}

/// Write a change set: verse patches, then collection patches, then the
/// profile. Stops at the first failed write.
pub async fn persist(state: &AppState, account_id: Uuid, changes: &ChangeSet) -> Result<()> {
    let result = write_changes(state, account_id, changes).await;
    if let Err(error) = &result {
        tracing::warn!(%account_id, %error, "Failed to persist changes");
    }
    result
}

async fn write_changes(state: &AppState, account_id: Uuid, changes: &ChangeSet) -> Result<()> {
    for (verse_id, patch) in &changes.verses {
        state.store.patch_verse(account_id, *verse_id, patch).await?;
    }
    for (collection_id, patch) in &changes.collections {
        state
            .store
            .patch_collection(account_id, *collection_id, patch)
            .await?;
    }
    if let Some(patch) = &changes.profile {
        state.store.patch_profile(account_id, patch).await?;
    }
    Ok(())
}
