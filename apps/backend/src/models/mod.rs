//! Database models and API types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;
use verse_core::{
    CardState, Collection, DailyReviewEntry, DripPeriod, LearningPhase, LevelProgress, LevelUpFlag,
    LibraryStats, Passage, Profile, ReviewMode, SessionConfig, Verse,
};

// === Database Entity Types ===

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub token: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Verse stored in PostgreSQL
///
/// `active` and `learning_phase` are nullable for rows written before those
/// columns existed.
#[derive(Debug, Clone, FromRow)]
pub struct DbVerse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub reference: String,
    pub book_name: String,
    pub text: String,
    pub collection_ids: Vec<Uuid>,
    pub card: Json<CardState>,
    pub active: Option<bool>,
    pub learning_phase: Option<String>,
    pub starred: bool,
    pub created_at: DateTime<Utc>,
}

impl DbVerse {
    pub fn to_core(self) -> Verse {
        Verse {
            id: self.id,
            reference: self.reference,
            book_name: self.book_name,
            text: self.text,
            collection_ids: self.collection_ids,
            card: self.card.0,
            active: self.active.unwrap_or(true),
            learning_phase: self
                .learning_phase
                .as_deref()
                .and_then(LearningPhase::from_str)
                .unwrap_or_else(LearningPhase::legacy),
            starred: self.starred,
            created_at: self.created_at,
        }
    }
}

/// Collection stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbCollection {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub verse_order: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub drip_rate: Option<i32>,
    pub drip_period: Option<String>,
    pub drip_days: Option<Vec<i16>>,
    pub drip_cursor: Option<i32>,
    pub drip_last_checked: Option<NaiveDate>,
}

impl DbCollection {
    pub fn to_core(self) -> Collection {
        Collection {
            id: self.id,
            name: self.name,
            description: self.description,
            verse_order: self.verse_order,
            created_at: self.created_at,
            drip_rate: self.drip_rate,
            drip_period: self.drip_period.as_deref().and_then(DripPeriod::from_str),
            drip_days: self.drip_days.map(|days| {
                days.into_iter()
                    .filter_map(|day| u8::try_from(day).ok())
                    .collect()
            }),
            drip_cursor: self
                .drip_cursor
                .map(|cursor| usize::try_from(cursor).unwrap_or(0)),
            drip_last_checked: self.drip_last_checked,
        }
    }
}

/// Profile stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbProfile {
    pub account_id: Uuid,
    pub streak: i32,
    pub last_review_date: Option<NaiveDate>,
    pub xp: i64,
    pub level: i32,
    pub total_reviewed: i64,
    pub daily_review_log: Json<HashMap<Uuid, DailyReviewEntry>>,
    pub level_up: Json<LevelUpFlag>,
    pub created_at: DateTime<Utc>,
}

impl DbProfile {
    pub fn to_core(self) -> Profile {
        Profile {
            streak: self.streak.max(0) as u32,
            last_review_date: self.last_review_date,
            xp: self.xp.max(0) as u64,
            level: self.level.max(0) as u32,
            total_reviewed: self.total_reviewed.max(0) as u64,
            created_at: self.created_at,
            daily_review_log: self.daily_review_log.0,
            level_up: self.level_up.0,
        }
    }
}

// === API Request/Response Types ===

/// Account register request
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
}

/// Account register response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub account_id: Uuid,
    pub token: String,
}

/// Account status response
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountStatusResponse {
    pub account_id: Uuid,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Create verses request
#[derive(Debug, Deserialize)]
pub struct CreateVersesRequest {
    pub passages: Vec<Passage>,
    #[serde(default)]
    pub collection_ids: Vec<Uuid>,
}

/// Verse list query
#[derive(Debug, Default, Deserialize)]
pub struct VerseListQuery {
    #[serde(default)]
    pub sort: verse_core::VerseSort,
}

/// Verse list response
#[derive(Debug, Serialize, Deserialize)]
pub struct VersesResponse {
    pub verses: Vec<Verse>,
}

/// Star toggle request
#[derive(Debug, Deserialize)]
pub struct StarRequest {
    pub starred: bool,
}

/// Delete response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    #[serde(default)]
    pub deleted_verses: usize,
}

/// Create collection request
#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Collection list response
#[derive(Debug, Serialize, Deserialize)]
pub struct CollectionsResponse {
    pub collections: Vec<Collection>,
}

/// Drip settings request
#[derive(Debug, Deserialize)]
pub struct DripSettingsRequest {
    pub enabled: bool,
    pub rate: Option<u32>,
    /// Weekday indices, 0 = Sunday. Empty keeps the current cadence.
    #[serde(default)]
    pub days: Vec<u8>,
}

/// Full library load
#[derive(Debug, Serialize, Deserialize)]
pub struct LibraryResponse {
    pub verses: Vec<Verse>,
    pub collections: Vec<Collection>,
    pub profile: Profile,
    pub progress: LevelProgress,
    pub stats: LibraryStats,
}

/// Verse as handed to a review session
#[derive(Debug, Serialize, Deserialize)]
pub struct QueueEntryView {
    pub verse_id: Uuid,
    pub reference: String,
    pub text: String,
    pub learning_phase: LearningPhase,
    pub auto_grade: bool,
}

/// Review queue response
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueueResponse {
    Ready {
        mode: ReviewMode,
        entries: Vec<QueueEntryView>,
        config: SessionConfig,
    },
    NothingEligible,
}

/// Grade submission
#[derive(Debug, Deserialize)]
pub struct GradeRequest {
    pub verse_id: Uuid,
    /// 1-4; may be omitted for beginner verses.
    pub grade: Option<u8>,
}

/// Grade result
#[derive(Debug, Serialize, Deserialize)]
pub struct GradeResponse {
    pub verse_id: Uuid,
    pub grade: u8,
    pub auto_graded: bool,
    pub xp_earned: u64,
    pub total_xp: u64,
    pub level: u32,
    pub leveled_up: bool,
    pub level_up: LevelUpFlag,
    pub streak: u32,
    pub learning_phase: LearningPhase,
    pub activated: Vec<Uuid>,
    pub next_due: DateTime<Utc>,
}

/// Profile with level progress
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub progress: LevelProgress,
}
