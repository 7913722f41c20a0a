//! Gamification ledger: XP with same-day diminishing returns, streak, level.

use crate::calendar::is_yesterday;
use crate::types::{DailyReviewEntry, Grade, Profile};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// XP for a first review of the day.
pub fn base_xp(grade: Grade) -> u64 {
    match grade {
        Grade::Again | Grade::Hard => 10,
        Grade::Good => 15,
        Grade::Easy => 20,
    }
}

/// XP for a review given today's earlier reviews of the same verse.
///
/// A better grade than the day's best tops up to the new base. Anything else
/// is halved once per earlier review.
pub fn diminished_xp(grade: Grade, today: Option<&DailyReviewEntry>) -> u64 {
    match today {
        None => base_xp(grade),
        Some(entry) if grade > entry.best_grade => {
            base_xp(grade).saturating_sub(base_xp(entry.best_grade))
        }
        Some(entry) => base_xp(grade).checked_shr(entry.review_count).unwrap_or(0),
    }
}

/// Total XP needed to reach `level`, saturating at `u64::MAX` for levels no
/// XP total can reach.
pub fn xp_for_level(level: u32) -> u64 {
    let n = u64::from(level);
    (n * (n + 1) / 2).saturating_mul(100)
}

/// Largest level whose threshold does not exceed `xp`.
pub fn level_from_xp(xp: u64) -> u32 {
    // Float estimate of the root of 50n^2 + 50n - xp, corrected exactly.
    let estimate = ((((xp as f64) / 50.0 + 0.25).sqrt() - 0.5).floor().max(0.0)) as u32;
    let mut level = estimate;
    while level > 0 && xp_for_level(level) > xp {
        level -= 1;
    }
    // Thresholds are always even, so a saturated one is never reached.
    while xp_for_level(level + 1) <= xp && xp_for_level(level + 1) != u64::MAX {
        level += 1;
    }
    level
}

/// Streak after a review on `today`.
pub fn next_streak(streak: u32, last_review: Option<NaiveDate>, today: NaiveDate) -> u32 {
    match last_review {
        Some(last) if last == today => streak,
        Some(last) if is_yesterday(last, today) => streak + 1,
        _ => 1,
    }
}

/// Position within the current level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    pub current_threshold: u64,
    pub next_threshold: u64,
    /// Fraction of the way to the next level, 0.0 to 1.0.
    pub fraction: f64,
}

pub fn level_progress(xp: u64) -> LevelProgress {
    let level = level_from_xp(xp);
    let current_threshold = xp_for_level(level);
    let next_threshold = xp_for_level(level + 1);
    let fraction = (xp - current_threshold) as f64 / (next_threshold - current_threshold) as f64;
    LevelProgress {
        level,
        current_threshold,
        next_threshold,
        fraction,
    }
}

/// What one graded review earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewAward {
    pub xp_earned: u64,
    pub previous_level: u32,
    pub level: u32,
    pub leveled_up: bool,
    pub streak: u32,
}

/// Fold one graded review into a profile.
///
/// A daily log from an earlier day is discarded first. A level increase sets
/// the level-up flag to pending; it stays pending until acknowledged.
pub fn record_review(
    profile: Profile,
    verse_id: Uuid,
    grade: Grade,
    today: NaiveDate,
) -> (Profile, ReviewAward) {
    let mut profile = profile.refreshed(today);
    let previous_level = profile.level;

    let earlier = profile.daily_review_log.get(&verse_id).copied();
    let xp_earned = diminished_xp(grade, earlier.as_ref());
    let entry = match earlier {
        Some(entry) => DailyReviewEntry {
            review_count: entry.review_count.saturating_add(1),
            best_grade: entry.best_grade.max(grade),
            xp_earned: entry.xp_earned + xp_earned,
        },
        None => DailyReviewEntry {
            review_count: 1,
            best_grade: grade,
            xp_earned,
        },
    };
    profile.daily_review_log.insert(verse_id, entry);

    profile.streak = next_streak(profile.streak, profile.last_review_date, today);
    profile.last_review_date = Some(today);
    profile.xp += xp_earned;
    profile.level = level_from_xp(profile.xp);
    profile.total_reviewed += 1;
    profile.level_up = profile.level_up.observe(previous_level, profile.level);

    let award = ReviewAward {
        xp_earned,
        previous_level,
        level: profile.level,
        leveled_up: profile.level > previous_level,
        streak: profile.streak,
    };
    (profile, award)
}
