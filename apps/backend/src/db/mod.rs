//! PostgreSQL store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use uuid::Uuid;
use verse_core::{Collection, CollectionPatch, Profile, ProfilePatch, Verse, VersePatch};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::store::{
    AccountStore, CollectionStore, ProfileStore, StoreError, StoreResult, VerseStore,
};

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }
}

fn ensure_found(rows: u64, kind: &'static str, id: Uuid) -> StoreResult<()> {
    if rows == 0 {
        Err(StoreError::NotFound { kind, id })
    } else {
        Ok(())
    }
}

#[async_trait]
impl AccountStore for Database {
    async fn create_account(&self, name: Option<&str>, now: DateTime<Utc>) -> StoreResult<Account> {
        let token = Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (token, name, created_at, last_seen_at)
            VALUES ($1, $2, $3, $3)
            RETURNING id, token, name, created_at, last_seen_at
            "#,
        )
        .bind(&token)
        .bind(name)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO profiles (account_id, created_at)
            VALUES ($1, $2)
            "#,
        )
        .bind(account.id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(account)
    }

    async fn get_account_by_token(&self, token: &str) -> StoreResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, token, name, created_at, last_seen_at
            FROM accounts
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn touch_account(&self, account_id: Uuid, now: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET last_seen_at = $2
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl VerseStore for Database {
    async fn list_verses(&self, account_id: Uuid) -> StoreResult<Vec<Verse>> {
        let rows = sqlx::query_as::<_, DbVerse>(
            r#"
            SELECT id, account_id, reference, book_name, text, collection_ids, card,
                   active, learning_phase, starred, created_at
            FROM verses
            WHERE account_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DbVerse::to_core).collect())
    }

    async fn create_verses(&self, account_id: Uuid, verses: &[Verse]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for verse in verses {
            sqlx::query(
                r#"
                INSERT INTO verses (id, account_id, reference, book_name, text, collection_ids,
                                    card, active, learning_phase, starred, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(verse.id)
            .bind(account_id)
            .bind(&verse.reference)
            .bind(&verse.book_name)
            .bind(&verse.text)
            .bind(&verse.collection_ids)
            .bind(Json(&verse.card))
            .bind(verse.active)
            .bind(verse.learning_phase.as_str())
            .bind(verse.starred)
            .bind(verse.created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn patch_verse(&self, account_id: Uuid, verse_id: Uuid, patch: &VersePatch) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE verses SET
                card = COALESCE($3, card),
                active = COALESCE($4, active),
                learning_phase = COALESCE($5, learning_phase),
                starred = COALESCE($6, starred)
            WHERE account_id = $1 AND id = $2
            "#,
        )
        .bind(account_id)
        .bind(verse_id)
        .bind(patch.card.as_ref().map(Json))
        .bind(patch.active)
        .bind(patch.learning_phase.map(|phase| phase.as_str()))
        .bind(patch.starred)
        .execute(&self.pool)
        .await?;

        ensure_found(result.rows_affected(), "verse", verse_id)
    }

    async fn delete_verses(&self, account_id: Uuid, verse_ids: &[Uuid]) -> StoreResult<usize> {
        let result = sqlx::query(
            r#"
            DELETE FROM verses
            WHERE account_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(account_id)
        .bind(verse_ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() as usize)
    }
}

#[async_trait]
impl CollectionStore for Database {
    async fn list_collections(&self, account_id: Uuid) -> StoreResult<Vec<Collection>> {
        let rows = sqlx::query_as::<_, DbCollection>(
            r#"
            SELECT id, account_id, name, description, verse_order, created_at,
                   drip_rate, drip_period, drip_days, drip_cursor, drip_last_checked
            FROM collections
            WHERE account_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DbCollection::to_core).collect())
    }

    async fn create_collection(&self, account_id: Uuid, collection: &Collection) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO collections (id, account_id, name, description, verse_order, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(collection.id)
        .bind(account_id)
        .bind(&collection.name)
        .bind(&collection.description)
        .bind(&collection.verse_order)
        .bind(collection.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn patch_collection(
        &self,
        account_id: Uuid,
        collection_id: Uuid,
        patch: &CollectionPatch,
    ) -> StoreResult<()> {
        let drip_days: Option<Vec<i16>> = patch
            .drip_days
            .as_ref()
            .map(|days| days.iter().map(|day| i16::from(*day)).collect());
        let drip_cursor: Option<i32> = patch
            .drip_cursor
            .map(|cursor| i32::try_from(cursor).unwrap_or(i32::MAX));

        let result = sqlx::query(
            r#"
            UPDATE collections SET
                verse_order = COALESCE($3, verse_order),
                drip_rate = COALESCE($4, drip_rate),
                drip_days = COALESCE($5, drip_days),
                drip_cursor = COALESCE($6, drip_cursor),
                drip_last_checked = COALESCE($7, drip_last_checked)
            WHERE account_id = $1 AND id = $2
            "#,
        )
        .bind(account_id)
        .bind(collection_id)
        .bind(patch.verse_order.as_deref())
        .bind(patch.drip_rate)
        .bind(drip_days)
        .bind(drip_cursor)
        .bind(patch.drip_last_checked)
        .execute(&self.pool)
        .await?;

        ensure_found(result.rows_affected(), "collection", collection_id)
    }

    async fn delete_collection(&self, account_id: Uuid, collection_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM collections
            WHERE account_id = $1 AND id = $2
            "#,
        )
        .bind(account_id)
        .bind(collection_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProfileStore for Database {
    async fn get_profile(&self, account_id: Uuid) -> StoreResult<Profile> {
        let row = sqlx::query_as::<_, DbProfile>(
            r#"
            SELECT account_id, streak, last_review_date, xp, level, total_reviewed,
                   daily_review_log, level_up, created_at
            FROM profiles
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound {
            kind: "profile",
            id: account_id,
        })?;

        Ok(row.to_core())
    }

    async fn patch_profile(&self, account_id: Uuid, patch: &ProfilePatch) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE profiles SET
                streak = COALESCE($2, streak),
                last_review_date = COALESCE($3, last_review_date),
                xp = COALESCE($4, xp),
                level = COALESCE($5, level),
                total_reviewed = COALESCE($6, total_reviewed),
                daily_review_log = COALESCE($7, daily_review_log),
                level_up = COALESCE($8, level_up),
                updated_at = NOW()
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .bind(patch.streak.map(|streak| streak as i32))
        .bind(patch.last_review_date)
        .bind(patch.xp.map(|xp| xp as i64))
        .bind(patch.level.map(|level| level as i32))
        .bind(patch.total_reviewed.map(|total| total as i64))
        .bind(patch.daily_review_log.as_ref().map(Json))
        .bind(patch.level_up.map(Json))
        .execute(&self.pool)
        .await?;

        ensure_found(result.rows_affected(), "profile", account_id)
    }
}
