//! Partial updates for stored records.
//!
//! `None` leaves a field untouched. Stores apply these field by field, so a
//! patch never carries an absent sentinel.

use crate::scheduler::CardState;
use crate::types::{Collection, DailyReviewEntry, LearningPhase, LevelUpFlag, Profile, Verse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<CardState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_phase: Option<LearningPhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
}

impl VersePatch {
    pub fn activate() -> Self {
        Self {
            active: Some(true),
            ..Default::default()
        }
    }

    /// Fold a later patch into this one; fields set in `later` win.
    pub fn merge(self, later: Self) -> Self {
        Self {
            card: later.card.or(self.card),
            active: later.active.or(self.active),
            learning_phase: later.learning_phase.or(self.learning_phase),
            starred: later.starred.or(self.starred),
        }
    }

    pub fn apply_to(&self, verse: &mut Verse) {
        if let Some(card) = &self.card {
            verse.card = card.clone();
        }
        if let Some(active) = self.active {
            verse.active = active;
        }
        if let Some(phase) = self.learning_phase {
            verse.learning_phase = phase;
        }
        if let Some(starred) = self.starred {
            verse.starred = starred;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse_order: Option<Vec<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drip_rate: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drip_days: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drip_cursor: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drip_last_checked: Option<NaiveDate>,
}

impl CollectionPatch {
    pub fn merge(self, later: Self) -> Self {
        Self {
            verse_order: later.verse_order.or(self.verse_order),
            drip_rate: later.drip_rate.or(self.drip_rate),
            drip_days: later.drip_days.or(self.drip_days),
            drip_cursor: later.drip_cursor.or(self.drip_cursor),
            drip_last_checked: later.drip_last_checked.or(self.drip_last_checked),
        }
    }

    pub fn apply_to(&self, collection: &mut Collection) {
        if let Some(order) = &self.verse_order {
            collection.verse_order = order.clone();
        }
        if let Some(rate) = self.drip_rate {
            collection.drip_rate = Some(rate);
        }
        if let Some(days) = &self.drip_days {
            collection.drip_days = Some(days.clone());
        }
        if let Some(cursor) = self.drip_cursor {
            collection.drip_cursor = Some(cursor);
        }
        if let Some(checked) = self.drip_last_checked {
            collection.drip_last_checked = Some(checked);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_reviewed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_review_log: Option<HashMap<Uuid, DailyReviewEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_up: Option<LevelUpFlag>,
}

impl ProfilePatch {
    /// Patch that rewrites every mutable field from `profile`.
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            streak: Some(profile.streak),
            last_review_date: profile.last_review_date,
            xp: Some(profile.xp),
            level: Some(profile.level),
            total_reviewed: Some(profile.total_reviewed),
            daily_review_log: Some(profile.daily_review_log.clone()),
            level_up: Some(profile.level_up),
        }
    }

    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(streak) = self.streak {
            profile.streak = streak;
        }
        if let Some(date) = self.last_review_date {
            profile.last_review_date = Some(date);
        }
        if let Some(xp) = self.xp {
            profile.xp = xp;
        }
        if let Some(level) = self.level {
            profile.level = level;
        }
        if let Some(total) = self.total_reviewed {
            profile.total_reviewed = total;
        }
        if let Some(log) = &self.daily_review_log {
            profile.daily_review_log = log.clone();
        }
        if let Some(flag) = self.level_up {
            profile.level_up = flag;
        }
    }
}
