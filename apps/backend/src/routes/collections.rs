//! Collection endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use verse_core::{Collection, DripSettings, EngineError};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedAccount;
use crate::services::library;
use crate::AppState;

/// GET /api/collections
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
) -> Result<Json<CollectionsResponse>> {
    let collections = state.store.list_collections(auth.account_id).await?;
    Ok(Json(CollectionsResponse { collections }))
}

/// POST /api/collections
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
    Json(payload): Json<CreateCollectionRequest>,
) -> Result<Json<Collection>> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Collection name is required".to_string()));
    }

    let collection = Collection::new(
        Uuid::new_v4(),
        name.to_string(),
        payload.description,
        state.now(),
    );
    state
        .store
        .create_collection(auth.account_id, &collection)
        .await?;

    tracing::info!(
        account_id = %auth.account_id,
        collection_id = %collection.id,
        "Created collection"
    );

    Ok(Json(collection))
}

/// DELETE /api/collections/:id
/// Deletes the collection together with every verse filed under it
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
    Path(collection_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>> {
    let snapshot = library::load_snapshot(&state, auth.account_id).await?;
    let verse_ids = snapshot.verses_removed_with(collection_id)?;

    let deleted_verses = if verse_ids.is_empty() {
        0
    } else {
        state.store.delete_verses(auth.account_id, &verse_ids).await?
    };
    let deleted = state
        .store
        .delete_collection(auth.account_id, collection_id)
        .await?;

    tracing::info!(
        account_id = %auth.account_id,
        %collection_id,
        deleted_verses,
        "Deleted collection"
    );

    Ok(Json(DeleteResponse {
        deleted,
        deleted_verses,
    }))
}

/// PUT /api/collections/:id/drip
/// Enables, retunes or disables the drip feed. Disabling releases every
/// queued member not held back by another drip collection.
pub async fn update_drip(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
    Path(collection_id): Path<Uuid>,
    Json(payload): Json<DripSettingsRequest>,
) -> Result<Json<Collection>> {
    let settings = if payload.enabled {
        let rate = payload.rate.ok_or_else(|| {
            ApiError::BadRequest("rate is required when enabling drip".to_string())
        })?;
        DripSettings::Enabled {
            rate,
            days: payload.days,
        }
    } else {
        DripSettings::Disabled
    };

    let mut snapshot = library::load_snapshot(&state, auth.account_id).await?;
    let changes = snapshot.plan_drip_settings(collection_id, &settings)?;

    library::persist(&state, auth.account_id, &changes).await?;
    snapshot.apply(&changes);

    tracing::info!(
        account_id = %auth.account_id,
        %collection_id,
        enabled = payload.enabled,
        released = changes.verses.len(),
        "Updated drip settings"
    );

    let collection = snapshot
        .collection(collection_id)
        .cloned()
        .ok_or(EngineError::CollectionNotFound(collection_id))?;
    Ok(Json(collection))
}
