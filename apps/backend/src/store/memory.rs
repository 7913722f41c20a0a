//! In-memory store for tests and local runs

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;
use verse_core::{Collection, CollectionPatch, Profile, ProfilePatch, Verse, VersePatch};

use super::{AccountStore, CollectionStore, ProfileStore, StoreError, StoreResult, VerseStore};
use crate::models::Account;

struct AccountData {
    account: Account,
    verses: Vec<Verse>,
    collections: Vec<Collection>,
    profile: Profile,
}

/// Store backed by a map of accounts. Writes can be switched off to exercise
/// failure paths.
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<Uuid, AccountData>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with `StoreError::Unavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("writes are disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

fn account_not_found(id: Uuid) -> StoreError {
    StoreError::NotFound { kind: "account", id }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, name: Option<&str>, now: DateTime<Utc>) -> StoreResult<Account> {
        self.check_writable()?;
        let account = Account {
            id: Uuid::new_v4(),
            token: Uuid::new_v4().to_string(),
            name: name.map(str::to_string),
            created_at: now,
            last_seen_at: now,
        };
        self.accounts.write().await.insert(
            account.id,
            AccountData {
                account: account.clone(),
                verses: Vec::new(),
                collections: Vec::new(),
                profile: Profile::new(now),
            },
        );
        Ok(account)
    }

    async fn get_account_by_token(&self, token: &str) -> StoreResult<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|data| data.account.token == token)
            .map(|data| data.account.clone()))
    }

    async fn touch_account(&self, account_id: Uuid, now: DateTime<Utc>) -> StoreResult<()> {
        let mut accounts = self.accounts.write().await;
        let data = accounts
            .get_mut(&account_id)
            .ok_or_else(|| account_not_found(account_id))?;
        data.account.last_seen_at = now;
        Ok(())
    }
}

#[async_trait]
impl VerseStore for MemoryStore {
    async fn list_verses(&self, account_id: Uuid) -> StoreResult<Vec<Verse>> {
        let accounts = self.accounts.read().await;
        let data = accounts
            .get(&account_id)
            .ok_or_else(|| account_not_found(account_id))?;
        Ok(data.verses.clone())
    }

    async fn create_verses(&self, account_id: Uuid, verses: &[Verse]) -> StoreResult<()> {
        self.check_writable()?;
        let mut accounts = self.accounts.write().await;
        let data = accounts
            .get_mut(&account_id)
            .ok_or_else(|| account_not_found(account_id))?;
        data.verses.extend(verses.iter().cloned());
        Ok(())
    }

    async fn patch_verse(&self, account_id: Uuid, verse_id: Uuid, patch: &VersePatch) -> StoreResult<()> {
        self.check_writable()?;
        let mut accounts = self.accounts.write().await;
        let data = accounts
            .get_mut(&account_id)
            .ok_or_else(|| account_not_found(account_id))?;
        let verse = data
            .verses
            .iter_mut()
            .find(|verse| verse.id == verse_id)
            .ok_or(StoreError::NotFound {
                kind: "verse",
                id: verse_id,
            })?;
        patch.apply_to(verse);
        Ok(())
    }

    async fn delete_verses(&self, account_id: Uuid, verse_ids: &[Uuid]) -> StoreResult<usize> {
        self.check_writable()?;
        let mut accounts = self.accounts.write().await;
        let data = accounts
            .get_mut(&account_id)
            .ok_or_else(|| account_not_found(account_id))?;
        let before = data.verses.len();
        data.verses.retain(|verse| !verse_ids.contains(&verse.id));
        Ok(before - data.verses.len())
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn list_collections(&self, account_id: Uuid) -> StoreResult<Vec<Collection>> {
        let accounts = self.accounts.read().await;
        let data = accounts
            .get(&account_id)
            .ok_or_else(|| account_not_found(account_id))?;
        Ok(data.collections.clone())
    }

    async fn create_collection(&self, account_id: Uuid, collection: &Collection) -> StoreResult<()> {
        self.check_writable()?;
        let mut accounts = self.accounts.write().await;
        let data = accounts
            .get_mut(&account_id)
            .ok_or_else(|| account_not_found(account_id))?;
        data.collections.push(collection.clone());
        Ok(())
    }

    async fn patch_collection(
        &self,
        account_id: Uuid,
        collection_id: Uuid,
        patch: &CollectionPatch,
    ) -> StoreResult<()> {
        self.check_writable()?;
        let mut accounts = self.accounts.write().await;
        let data = accounts
            .get_mut(&account_id)
            .ok_or_else(|| account_not_found(account_id))?;
        let collection = data
            .collections
            .iter_mut()
            .find(|collection| collection.id == collection_id)
            .ok_or(StoreError::NotFound {
                kind: "collection",
                id: collection_id,
            })?;
        patch.apply_to(collection);
        Ok(())
    }

    async fn delete_collection(&self, account_id: Uuid, collection_id: Uuid) -> StoreResult<bool> {
        self.check_writable()?;
        let mut accounts = self.accounts.write().await;
        let data = accounts
            .get_mut(&account_id)
            .ok_or_else(|| account_not_found(account_id))?;
        let before = data.collections.len();
        data.collections.retain(|collection| collection.id != collection_id);
        Ok(data.collections.len() < before)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, account_id: Uuid) -> StoreResult<Profile> {
        let accounts = self.accounts.read().await;
        let data = accounts
            .get(&account_id)
            .ok_or_else(|| account_not_found(account_id))?;
        Ok(data.profile.clone())
    }

    async fn patch_profile(&self, account_id: Uuid, patch: &ProfilePatch) -> StoreResult<()> {
        self.check_writable()?;
        let mut accounts = self.accounts.write().await;
        let data = accounts
            .get_mut(&account_id)
            .ok_or_else(|| account_not_found(account_id))?;
        patch.apply_to(&mut data.profile);
        Ok(())
    }
}
