//! Core types for the verse memorization engine.

use crate::error::EngineError;
use crate::scheduler::CardState;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Self-reported recall quality on a four-point scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Grade {
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }

    /// Good or Easy.
    pub fn is_passing(self) -> bool {
        self >= Self::Good
    }
}

impl TryFrom<u8> for Grade {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or(EngineError::InvalidGrade(value))
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.to_value()
    }
}

/// Mastery progression, independent of spaced-repetition scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningPhase {
    Beginner,
    Learning,
    Mastered,
}

impl LearningPhase {
    /// Phase assumed for verses persisted before phases existed.
    pub fn legacy() -> Self {
        Self::Mastered
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Learning => "learning",
            Self::Mastered => "mastered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "learning" => Some(Self::Learning),
            "mastered" => Some(Self::Mastered),
            _ => None,
        }
    }
}

impl fmt::Display for LearningPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (reference, text) pair supplied by the passage source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub reference: String,
    pub text: String,
}

fn default_active() -> bool {
    true
}

/// A memorization item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    pub id: Uuid,
    pub reference: String,
    pub book_name: String,
    pub text: String,
    #[serde(default)]
    pub collection_ids: Vec<Uuid>,
    pub card: CardState,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default = "LearningPhase::legacy")]
    pub learning_phase: LearningPhase,
    #[serde(default)]
    pub starred: bool,
    pub created_at: DateTime<Utc>,
}

impl Verse {
    /// Create a verse in the beginner phase.
    pub fn new(
        id: Uuid,
        passage: Passage,
        collection_ids: Vec<Uuid>,
        card: CardState,
        active: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            book_name: crate::reference::book_name(&passage.reference).to_string(),
            reference: passage.reference,
            text: passage.text,
            collection_ids,
            card,
            active,
            learning_phase: LearningPhase::Beginner,
            starred: false,
            created_at,
        }
    }

    pub fn belongs_to(&self, collection_id: Uuid) -> bool {
        self.collection_ids.contains(&collection_id)
    }
}

/// Legacy drip cadence, superseded by `drip_days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DripPeriod {
    Day,
    Week,
}

impl DripPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            _ => None,
        }
    }
}

/// An ordered, user-named group of verses with optional drip-feed settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sequential review order and drip unlock order.
    #[serde(default)]
    pub verse_order: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Verses unlocked per elapsed period; absent or non-positive disables drip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drip_rate: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drip_period: Option<DripPeriod>,
    /// Weekday indices, 0 = Sunday.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drip_days: Option<Vec<u8>>,
    /// Index into `verse_order` of the next verse to unlock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drip_cursor: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drip_last_checked: Option<NaiveDate>,
}

impl Collection {
    /// Create an empty collection without drip settings.
    pub fn new(id: Uuid, name: String, description: Option<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            description,
            verse_order: Vec::new(),
            created_at,
            drip_rate: None,
            drip_period: None,
            drip_days: None,
            drip_cursor: None,
            drip_last_checked: None,
        }
    }

    /// Positive drip rate, if drip is enabled.
    pub fn drip_rate(&self) -> Option<u32> {
        self.drip_rate
            .filter(|rate| *rate > 0)
            .map(|rate| rate as u32)
    }

    pub fn drip_enabled(&self) -> bool {
        self.drip_rate().is_some()
    }

    /// Drip cursor, clamped to the verse order length.
    pub fn cursor(&self) -> usize {
        self.drip_cursor.unwrap_or(0).min(self.verse_order.len())
    }

    pub fn position_of(&self, verse_id: Uuid) -> Option<usize> {
        self.verse_order.iter().position(|id| *id == verse_id)
    }
}

/// Per-verse review tally for the current calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReviewEntry {
    pub review_count: u32,
    pub best_grade: Grade,
    pub xp_earned: u64,
}

/// Edge-triggered level-up notification.
///
/// Becomes `Pending` when a review raises the level and stays pending until
/// the caller acknowledges it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LevelUpFlag {
    #[default]
    Acknowledged,
    Pending {
        level: u32,
    },
}

impl LevelUpFlag {
    /// Fold in a level comparison from one review.
    pub fn observe(self, previous_level: u32, new_level: u32) -> Self {
        if new_level > previous_level {
            Self::Pending { level: new_level }
        } else {
            self
        }
    }

    pub fn acknowledge(self) -> Self {
        Self::Acknowledged
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn pending_level(&self) -> Option<u32> {
        match self {
            Self::Pending { level } => Some(*level),
            Self::Acknowledged => None,
        }
    }
}

/// Gamification state for one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review_date: Option<NaiveDate>,
    pub xp: u64,
    pub level: u32,
    pub total_reviewed: u64,
    pub created_at: DateTime<Utc>,
    /// Only meaningful while `last_review_date` is today.
    #[serde(default)]
    pub daily_review_log: HashMap<Uuid, DailyReviewEntry>,
    #[serde(default)]
    pub level_up: LevelUpFlag,
}

impl Profile {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            streak: 0,
            last_review_date: None,
            xp: 0,
            level: 0,
            total_reviewed: 0,
            created_at,
            daily_review_log: HashMap::new(),
            level_up: LevelUpFlag::Acknowledged,
        }
    }

    pub fn reviewed_on(&self, day: NaiveDate) -> bool {
        self.last_review_date == Some(day)
    }

    /// Drop a daily log left over from an earlier day.
    pub fn refreshed(mut self, today: NaiveDate) -> Self {
        if !self.reviewed_on(today) {
            self.daily_review_log.clear();
        }
        self
    }

    /// Today's entry for a verse, treating a stale log as empty.
    pub fn daily_entry(&self, verse_id: Uuid, today: NaiveDate) -> Option<&DailyReviewEntry> {
        if self.reviewed_on(today) {
            self.daily_review_log.get(&verse_id)
        } else {
            None
        }
    }
}

/// Which verses a review session draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReviewScope {
    Starred,
    Collection { collection_id: Uuid },
    Library,
}

/// How a review session orders its verses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMode {
    #[default]
    DueFirst,
    Random,
    Sequential,
}

/// How the learner enters a verse during review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    Full,
    #[default]
    FirstLetter,
    FillBlank,
}

/// Session preferences, passed in with each queue request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub input_mode: InputMode,
    /// Percentage of key words blanked in fill-blank mode.
    #[serde(default = "SessionConfig::default_cloze_rate")]
    pub cloze_rate: u8,
    #[serde(default)]
    pub include_reference: bool,
}

impl SessionConfig {
    pub const MIN_CLOZE_RATE: u8 = 30;
    pub const MAX_CLOZE_RATE: u8 = 70;

    fn default_cloze_rate() -> u8 {
        Self::MIN_CLOZE_RATE
    }

    /// Clamp the cloze rate into its supported range.
    pub fn normalized(self) -> Self {
        Self {
            cloze_rate: self.cloze_rate.clamp(Self::MIN_CLOZE_RATE, Self::MAX_CLOZE_RATE),
            ..self
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            input_mode: InputMode::default(),
            cloze_rate: Self::default_cloze_rate(),
            include_reference: false,
        }
    }
}
