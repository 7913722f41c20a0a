//! Account-scoped persistence traits
//!
//! Implemented by the PostgreSQL [`Database`](crate::db::Database) and the
//! in-process [`MemoryStore`].

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;
use verse_core::{Collection, CollectionPatch, Profile, ProfilePatch, Verse, VersePatch};

pub use memory::MemoryStore;

use crate::models::Account;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create an account with a fresh token and an empty profile.
    async fn create_account(&self, name: Option<&str>, now: DateTime<Utc>) -> StoreResult<Account>;

    async fn get_account_by_token(&self, token: &str) -> StoreResult<Option<Account>>;

    async fn touch_account(&self, account_id: Uuid, now: DateTime<Utc>) -> StoreResult<()>;
}

#[async_trait]
pub trait VerseStore: Send + Sync {
    async fn list_verses(&self, account_id: Uuid) -> StoreResult<Vec<Verse>>;

    async fn create_verses(&self, account_id: Uuid, verses: &[Verse]) -> StoreResult<()>;

    async fn patch_verse(&self, account_id: Uuid, verse_id: Uuid, patch: &VersePatch) -> StoreResult<()>;

    /// Returns the number of verses removed.
    async fn delete_verses(&self, account_id: Uuid, verse_ids: &[Uuid]) -> StoreResult<usize>;
}

#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn list_collections(&self, account_id: Uuid) -> StoreResult<Vec<Collection>>;

    async fn create_collection(&self, account_id: Uuid, collection: &Collection) -> StoreResult<()>;

    async fn patch_collection(
        &self,
        account_id: Uuid,
        collection_id: Uuid,
        patch: &CollectionPatch,
    ) -> StoreResult<()>;

    async fn delete_collection(&self, account_id: Uuid, collection_id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, account_id: Uuid) -> StoreResult<Profile>;

    async fn patch_profile(&self, account_id: Uuid, patch: &ProfilePatch) -> StoreResult<()>;
}

/// Everything the service needs from persistence.
pub trait Store: AccountStore + VerseStore + CollectionStore + ProfileStore {}

impl<T> Store for T where T: AccountStore + VerseStore + CollectionStore + ProfileStore {}
