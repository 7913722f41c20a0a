//! Drip feed: calendar-gated unlocking of queued verses.
//!
//! Every function here is a planner. It reads a snapshot and returns the
//! activations and collection patches to persist; nothing is mutated.

use crate::calendar::{days_between, weekday_index};
use crate::error::{EngineError, Result};
use crate::patch::CollectionPatch;
use crate::types::{Collection, DripPeriod, Verse};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Verses keyed by id.
pub type VerseIndex<'a> = HashMap<Uuid, &'a Verse>;

pub fn index_verses(verses: &[Verse]) -> VerseIndex<'_> {
    verses.iter().map(|verse| (verse.id, verse)).collect()
}

/// Set of weekday indices (0 = Sunday) stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const ALL: Self = Self(0b111_1111);
    pub const MONDAY: Self = Self(1 << 1);

    /// Strict constructor for user input.
    pub fn from_indices(days: &[u8]) -> Result<Self> {
        days.iter().try_fold(Self(0), |set, &day| {
            if day > 6 {
                Err(EngineError::InvalidWeekday(day))
            } else {
                Ok(Self(set.0 | 1 << day))
            }
        })
    }

    /// Lenient constructor for stored data; out-of-range indices are dropped.
    fn from_stored(days: &[u8]) -> Self {
        Self(
            days.iter()
                .filter(|day| **day <= 6)
                .fold(0, |mask, day| mask | 1 << day),
        )
    }

    pub fn contains(self, day: u8) -> bool {
        day <= 6 && self.0 & (1 << day) != 0
    }

    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Sorted weekday indices.
    pub fn indices(self) -> Vec<u8> {
        (0..7).filter(|day| self.contains(*day)).collect()
    }

    /// Count member weekdays in the half-open range `(after, through]`.
    pub fn count_between(self, after: NaiveDate, through: NaiveDate) -> u32 {
        let span = days_between(after, through);
        if span <= 0 {
            return 0;
        }
        let full_weeks = (span / 7) as u32;
        let start = i64::from(weekday_index(after));
        let tail = (1..=span % 7)
            .filter(|offset| self.contains(((start + offset) % 7) as u8))
            .count() as u32;
        full_weeks * self.len() + tail
    }
}

/// How elapsed drip periods are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Unlock on each listed weekday. Legacy daily drip reads as all seven.
    Weekdays(WeekdaySet),
    /// Legacy weekly drip, counted in whole weeks since the last check.
    LegacyWeekly,
}

impl Cadence {
    /// Cadence from a collection's stored fields, whether or not drip is on.
    fn stored(collection: &Collection) -> Self {
        let days = collection
            .drip_days
            .as_deref()
            .map(WeekdaySet::from_stored)
            .filter(|set| !set.is_empty());
        match (days, collection.drip_period) {
            (Some(set), _) => Self::Weekdays(set),
            (None, Some(DripPeriod::Week)) => Self::LegacyWeekly,
            (None, Some(DripPeriod::Day) | None) => Self::Weekdays(WeekdaySet::ALL),
        }
    }

    /// Weekdays equivalent to this cadence. Legacy weekly drip maps to Monday.
    pub fn weekdays(self) -> WeekdaySet {
        match self {
            Self::Weekdays(set) => set,
            Self::LegacyWeekly => WeekdaySet::MONDAY,
        }
    }
}

/// Normalized drip settings of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DripSchedule {
    pub rate: u32,
    pub cadence: Cadence,
}

impl DripSchedule {
    /// Read a collection's drip settings; `None` when drip is disabled.
    pub fn for_collection(collection: &Collection) -> Option<Self> {
        let rate = collection.drip_rate()?;
        Some(Self {
            rate,
            cadence: Cadence::stored(collection),
        })
    }

    /// Periods elapsed since `last_checked`, up to and including `today`.
    pub fn elapsed(&self, last_checked: Option<NaiveDate>, today: NaiveDate) -> u32 {
        match (self.cadence, last_checked) {
            (Cadence::Weekdays(set), None) => u32::from(set.contains(weekday_index(today))),
            (Cadence::Weekdays(set), Some(last)) => set.count_between(last, today),
            (Cadence::LegacyWeekly, None) => 1,
            (Cadence::LegacyWeekly, Some(last)) => {
                let days = days_between(last, today);
                if days <= 0 {
                    0
                } else {
                    (days / 7).max(1) as u32
                }
            }
        }
    }

    pub fn unlock_count(&self, elapsed: u32) -> usize {
        (self.rate as usize).saturating_mul(elapsed as usize)
    }
}

/// Result of one calendar drip evaluation for a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DripRun {
    pub collection_id: Uuid,
    pub elapsed: u32,
    /// Verses to flip to active, in unlock order.
    pub activate: Vec<Uuid>,
    pub cursor: usize,
    pub last_checked: NaiveDate,
}

impl DripRun {
    pub fn patch(&self) -> CollectionPatch {
        CollectionPatch {
            drip_cursor: Some(self.cursor),
            drip_last_checked: Some(self.last_checked),
            ..Default::default()
        }
    }
}

/// Evaluate calendar unlocks for one collection.
///
/// Returns `None` when drip is disabled or the collection was already checked
/// today. Otherwise the run always carries `last_checked = today`, even when no
/// period elapsed. Re-running over partially applied results only activates
/// verses that are still inactive.
pub fn run_collection(
    collection: &Collection,
    verses: &VerseIndex<'_>,
    today: NaiveDate,
) -> Option<DripRun> {
    let schedule = DripSchedule::for_collection(collection)?;
    if collection.drip_last_checked == Some(today) {
        return None;
    }

    let elapsed = schedule.elapsed(collection.drip_last_checked, today);
    let cursor = collection.cursor();
    let end = cursor
        .saturating_add(schedule.unlock_count(elapsed))
        .min(collection.verse_order.len());

    let activate = collection.verse_order[cursor..end]
        .iter()
        .filter(|id| verses.get(*id).is_some_and(|verse| !verse.active))
        .copied()
        .collect();

    Some(DripRun {
        collection_id: collection.id,
        elapsed,
        activate,
        cursor: end,
        last_checked: today,
    })
}

/// Evaluate calendar unlocks for every collection.
pub fn run_all(collections: &[Collection], verses: &VerseIndex<'_>, today: NaiveDate) -> Vec<DripRun> {
    collections
        .iter()
        .filter_map(|collection| run_collection(collection, verses, today))
        .collect()
}

/// Whether a drip collection is still holding this verse back.
pub fn is_queued_in(collection: &Collection, verse_id: Uuid) -> bool {
    collection.drip_enabled()
        && collection
            .position_of(verse_id)
            .is_some_and(|position| position >= collection.cursor())
}

/// Out-of-band unlocks after a queued verse is reviewed directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatchUp {
    /// The reviewed verse first, then one next-in-line verse per collection.
    pub activate: Vec<Uuid>,
    pub cursors: Vec<(Uuid, usize)>,
}

impl CatchUp {
    pub fn patches(&self) -> impl Iterator<Item = (Uuid, CollectionPatch)> + '_ {
        self.cursors.iter().map(|(id, cursor)| {
            (
                *id,
                CollectionPatch {
                    drip_cursor: Some(*cursor),
                    ..Default::default()
                },
            )
        })
    }
}

/// Plan the manual catch-up for a reviewed verse.
///
/// Does nothing for a verse that is already active. Otherwise the verse is
/// activated and, in each of its drip collections with verses left to
/// unlock, the verse at the cursor is activated and the cursor moves by one.
pub fn manual_catch_up(
    verse: &Verse,
    collections: &[Collection],
    verses: &VerseIndex<'_>,
) -> Option<CatchUp> {
    if verse.active {
        return None;
    }

    let mut catch_up = CatchUp {
        activate: vec![verse.id],
        cursors: Vec::new(),
    };

    let owning = collections
        .iter()
        .filter(|collection| verse.belongs_to(collection.id) && collection.drip_enabled());
    for collection in owning {
        let cursor = collection.cursor();
        let Some(next_id) = collection.verse_order.get(cursor).copied() else {
            continue;
        };
        let next_is_queued = verses.get(&next_id).is_some_and(|next| !next.active);
        if next_id != verse.id && next_is_queued && !catch_up.activate.contains(&next_id) {
            catch_up.activate.push(next_id);
        }
        catch_up.cursors.push((collection.id, cursor + 1));
    }

    Some(catch_up)
}

/// Placement of newly created verses into their target collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdditionPlan {
    /// New verses that start inactive.
    pub queued: HashSet<Uuid>,
    pub collections: Vec<(Uuid, CollectionPatch)>,
}

impl AdditionPlan {
    pub fn is_active(&self, verse_id: Uuid) -> bool {
        !self.queued.contains(&verse_id)
    }
}

/// Plan verse order and drip state for verses appended to `targets`.
///
/// A fresh drip collection (no cursor and an empty order) bootstraps: the
/// first `rate` new verses unlock now and the collection counts as checked
/// today. Otherwise a new verse is queued when its position is at or past
/// the cursor. A verse queued by any target starts inactive.
pub fn plan_additions(targets: &[&Collection], new_ids: &[Uuid], today: NaiveDate) -> AdditionPlan {
    let mut plan = AdditionPlan::default();
    if new_ids.is_empty() {
        return plan;
    }

    for collection in targets {
        let appended: Vec<Uuid> = new_ids
            .iter()
            .filter(|id| !collection.verse_order.contains(id))
            .copied()
            .collect();
        let existing = collection.verse_order.len();
        let mut verse_order = collection.verse_order.clone();
        verse_order.extend(appended.iter().copied());

        let mut patch = CollectionPatch {
            verse_order: Some(verse_order),
            ..Default::default()
        };

        if let Some(rate) = collection.drip_rate() {
            let fresh = existing == 0 && collection.drip_cursor.unwrap_or(0) == 0;
            let unlocked = if fresh {
                let seeded = (rate as usize).min(appended.len());
                patch.drip_cursor = Some(seeded);
                patch.drip_last_checked = Some(today);
                seeded
            } else {
                collection.cursor().saturating_sub(existing)
            };
            plan.queued.extend(appended.iter().skip(unlocked).copied());
        }

        plan.collections.push((collection.id, patch));
    }

    plan
}

/// Requested drip configuration for a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DripSettings {
    Enabled { rate: u32, days: Vec<u8> },
    Disabled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPlan {
    pub patch: CollectionPatch,
    pub activate: Vec<Uuid>,
}

/// Plan a drip settings change.
///
/// Enabling always stores explicit weekdays; an empty day list falls back to
/// the collection's current cadence, so a legacy weekly drip becomes Monday.
/// Turning drip on for a collection that already holds verses puts the cursor
/// at the end, since all of them are active. Turning it off stores rate 0
/// and releases every verse not still held back by another drip collection.
pub fn plan_settings(
    collection: &Collection,
    settings: &DripSettings,
    collections: &[Collection],
    verses: &[Verse],
) -> Result<SettingsPlan> {
    match settings {
        DripSettings::Enabled { rate, days } => {
            if *rate == 0 {
                return Err(EngineError::InvalidDripSettings(
                    "rate must be at least 1".to_string(),
                ));
            }
            let rate = i32::try_from(*rate).map_err(|_| {
                EngineError::InvalidDripSettings(format!("rate {rate} is too large"))
            })?;
            // No days given keeps the collection's current cadence as weekdays.
            let set = if days.is_empty() {
                Cadence::stored(collection).weekdays()
            } else {
                WeekdaySet::from_indices(days)?
            };

            let mut patch = CollectionPatch {
                drip_rate: Some(rate),
                drip_days: Some(set.indices()),
                ..Default::default()
            };
            if !collection.drip_enabled() || collection.drip_cursor.is_none() {
                patch.drip_cursor = Some(collection.verse_order.len());
            }
            Ok(SettingsPlan {
                patch,
                activate: Vec::new(),
            })
        }
        DripSettings::Disabled => {
            let others: Vec<&Collection> = collections
                .iter()
                .filter(|other| other.id != collection.id)
                .collect();
            let activate = verses
                .iter()
                .filter(|verse| !verse.active && verse.belongs_to(collection.id))
                .filter(|verse| !others.iter().any(|other| is_queued_in(other, verse.id)))
                .map(|verse| verse.id)
                .collect();
            Ok(SettingsPlan {
                patch: CollectionPatch {
                    drip_rate: Some(0),
                    ..Default::default()
                },
                activate,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::CardState;
    use crate::types::Passage;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2024-03-04 is a Monday.
    fn monday() -> NaiveDate {
        date(2024, 3, 4)
    }

    fn verse(collection_id: Uuid, active: bool) -> Verse {
        Verse::new(
            Uuid::new_v4(),
            Passage {
                reference: "Psalm 23:1".into(),
                text: "The Lord is my shepherd".into(),
            },
            vec![collection_id],
            CardState::default(),
            active,
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
        )
    }

    fn drip_collection(rate: i32, days: &[u8]) -> Collection {
        let mut collection = Collection::new(
            Uuid::new_v4(),
            "Psalms".into(),
            None,
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
        );
        collection.drip_rate = Some(rate);
        collection.drip_days = Some(days.to_vec());
        collection
    }

    /// Collection with `count` verses, the first `cursor` of them active.
    fn populated(rate: i32, days: &[u8], count: usize, cursor: usize) -> (Collection, Vec<Verse>) {
        let mut collection = drip_collection(rate, days);
        let verses: Vec<Verse> = (0..count).map(|i| verse(collection.id, i < cursor)).collect();
        collection.verse_order = verses.iter().map(|v| v.id).collect();
        collection.drip_cursor = Some(cursor);
        (collection, verses)
    }

    fn apply_run(run: &DripRun, collection: &mut Collection, verses: &mut [Verse]) {
        run.patch().apply_to(collection);
        for verse in verses.iter_mut() {
            if run.activate.contains(&verse.id) {
                verse.active = true;
            }
        }
    }

    #[test]
    fn weekday_set_rejects_out_of_range_index() {
        assert!(matches!(
            WeekdaySet::from_indices(&[1, 7]),
            Err(EngineError::InvalidWeekday(7))
        ));
        assert_eq!(WeekdaySet::from_indices(&[5, 1, 3]).unwrap().indices(), vec![1, 3, 5]);
    }

    #[test]
    fn counts_drip_days_after_last_check() {
        let set = WeekdaySet::from_indices(&[1, 3, 5]).unwrap();
        let friday = date(2024, 3, 8);
        assert_eq!(set.count_between(monday(), friday), 2);
        assert_eq!(set.count_between(monday(), monday()), 0);
        // Two full weeks plus Tuesday..Friday.
        assert_eq!(set.count_between(monday(), date(2024, 3, 22)), 8);
    }

    #[test]
    fn monday_to_friday_unlocks_two_periods() {
        let (mut collection, verses) = populated(2, &[1, 3, 5], 8, 2);
        collection.drip_last_checked = Some(monday());

        let run = run_collection(&collection, &index_verses(&verses), date(2024, 3, 8)).unwrap();

        assert_eq!(run.elapsed, 2);
        assert_eq!(run.cursor, 6);
        assert_eq!(run.activate, collection.verse_order[2..6].to_vec());
    }

    #[test]
    fn second_run_on_same_day_is_noop() {
        let (mut collection, mut verses) = populated(1, &[0, 1, 2, 3, 4, 5, 6], 4, 1);
        collection.drip_last_checked = Some(monday());
        let tuesday = date(2024, 3, 5);

        let run = run_collection(&collection, &index_verses(&verses), tuesday).unwrap();
        apply_run(&run, &mut collection, &mut verses);

        assert_eq!(collection.drip_cursor, Some(2));
        assert!(run_collection(&collection, &index_verses(&verses), tuesday).is_none());
    }

    #[test]
    fn first_check_on_non_drip_day_only_marks_checked() {
        let (collection, verses) = populated(3, &[5], 5, 1);
        let run = run_collection(&collection, &index_verses(&verses), monday()).unwrap();

        assert_eq!(run.elapsed, 0);
        assert!(run.activate.is_empty());
        assert_eq!(run.cursor, 1);
        assert_eq!(run.last_checked, monday());
    }

    #[test]
    fn first_check_on_drip_day_counts_one_period() {
        let (collection, verses) = populated(3, &[1], 5, 1);
        let run = run_collection(&collection, &index_verses(&verses), monday()).unwrap();
        assert_eq!(run.elapsed, 1);
        assert_eq!(run.cursor, 4);
    }

    #[test]
    fn cursor_never_passes_end_of_order() {
        let (mut collection, verses) = populated(10, &[1, 3, 5], 3, 1);
        collection.drip_last_checked = Some(monday());
        let run = run_collection(&collection, &index_verses(&verses), date(2024, 4, 1)).unwrap();
        assert_eq!(run.cursor, 3);
        assert_eq!(run.activate.len(), 2);
    }

    #[test]
    fn dangling_ids_are_skipped() {
        let (mut collection, verses) = populated(2, &[2], 2, 0);
        collection.verse_order.insert(0, Uuid::new_v4());
        let tuesday = date(2024, 3, 5);

        let run = run_collection(&collection, &index_verses(&verses), tuesday).unwrap();

        assert_eq!(run.cursor, 2);
        assert_eq!(run.activate, vec![verses[0].id]);
    }

    #[test]
    fn partially_applied_run_does_not_reactivate() {
        let (mut collection, mut verses) = populated(3, &[2], 5, 1);
        // Verse 1 was activated by an earlier run whose cursor write failed.
        verses[1].active = true;
        collection.drip_last_checked = Some(monday());

        let run = run_collection(&collection, &index_verses(&verses), date(2024, 3, 5)).unwrap();

        assert_eq!(run.cursor, 4);
        assert_eq!(run.activate, vec![verses[2].id, verses[3].id]);
    }

    #[test]
    fn disabled_drip_is_skipped() {
        let (mut collection, verses) = populated(0, &[1], 3, 0);
        assert!(run_collection(&collection, &index_verses(&verses), monday()).is_none());
        collection.drip_rate = None;
        assert!(run_collection(&collection, &index_verses(&verses), monday()).is_none());
    }

    #[test]
    fn legacy_daily_period_reads_as_every_day() {
        let mut collection = drip_collection(1, &[]);
        collection.drip_days = None;
        collection.drip_period = Some(DripPeriod::Day);
        let schedule = DripSchedule::for_collection(&collection).unwrap();
        assert_eq!(schedule.cadence, Cadence::Weekdays(WeekdaySet::ALL));
        assert_eq!(schedule.elapsed(Some(monday()), date(2024, 3, 7)), 3);
    }

    #[test]
    fn legacy_weekly_period_counts_whole_weeks_with_floor_of_one() {
        let mut collection = drip_collection(2, &[]);
        collection.drip_days = None;
        collection.drip_period = Some(DripPeriod::Week);
        let schedule = DripSchedule::for_collection(&collection).unwrap();

        assert_eq!(schedule.elapsed(None, monday()), 1);
        assert_eq!(schedule.elapsed(Some(monday()), date(2024, 3, 7)), 1);
        assert_eq!(schedule.elapsed(Some(monday()), date(2024, 3, 19)), 2);
        assert_eq!(schedule.elapsed(Some(date(2024, 3, 19)), monday()), 0);
    }

    #[test]
    fn fresh_collection_bootstraps_first_batch() {
        let collection = drip_collection(3, &[1]);
        let new_ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();

        let plan = plan_additions(&[&collection], &new_ids, monday());

        let active: Vec<bool> = new_ids.iter().map(|id| plan.is_active(*id)).collect();
        assert_eq!(active, vec![true, true, true, false, false]);
        let (_, patch) = &plan.collections[0];
        assert_eq!(patch.drip_cursor, Some(3));
        assert_eq!(patch.drip_last_checked, Some(monday()));
        assert_eq!(patch.verse_order.as_deref(), Some(new_ids.as_slice()));
    }

    #[test]
    fn bootstrapped_collection_skips_calendar_run_that_day() {
        let mut collection = drip_collection(3, &[1]);
        let mut verses: Vec<Verse> = (0..5).map(|_| verse(collection.id, true)).collect();
        let ids: Vec<Uuid> = verses.iter().map(|v| v.id).collect();

        let plan = plan_additions(&[&collection], &ids, monday());
        plan.collections[0].1.apply_to(&mut collection);
        for verse in verses.iter_mut() {
            verse.active = plan.is_active(verse.id);
        }

        assert!(run_collection(&collection, &index_verses(&verses), monday()).is_none());
        let next_monday = date(2024, 3, 11);
        let run = run_collection(&collection, &index_verses(&verses), next_monday).unwrap();
        assert_eq!(run.cursor, 5);
    }

    #[test]
    fn additions_past_cursor_are_queued() {
        let (collection, _) = populated(2, &[1], 4, 4);
        let new_ids = [Uuid::new_v4(), Uuid::new_v4()];
        let plan = plan_additions(&[&collection], &new_ids, monday());
        assert!(!plan.is_active(new_ids[0]));
        assert!(!plan.is_active(new_ids[1]));
        assert_eq!(plan.collections[0].1.drip_cursor, None);
    }

    #[test]
    fn additions_to_plain_collection_stay_active() {
        let mut plain = drip_collection(0, &[]);
        plain.drip_rate = None;
        let (drip, _) = populated(1, &[1], 2, 2);
        let new_id = Uuid::new_v4();

        let plan = plan_additions(&[&plain], &[new_id], monday());
        assert!(plan.is_active(new_id));

        let plan = plan_additions(&[&plain, &drip], &[new_id], monday());
        assert!(!plan.is_active(new_id));
        assert_eq!(plan.collections.len(), 2);
    }

    #[test]
    fn catch_up_activates_reviewed_and_next_in_line() {
        let (collection, verses) = populated(1, &[1], 5, 2);
        let reviewed = &verses[4];

        let catch_up = manual_catch_up(reviewed, &[collection.clone()], &index_verses(&verses)).unwrap();

        assert_eq!(catch_up.activate, vec![reviewed.id, verses[2].id]);
        assert_eq!(catch_up.cursors, vec![(collection.id, 3)]);
    }

    #[test]
    fn catch_up_skips_active_verse() {
        let (collection, verses) = populated(1, &[1], 3, 2);
        assert!(manual_catch_up(&verses[0], &[collection], &index_verses(&verses)).is_none());
    }

    #[test]
    fn catch_up_on_verse_at_cursor_advances_once() {
        let (collection, verses) = populated(1, &[1], 3, 1);
        let catch_up =
            manual_catch_up(&verses[1], &[collection.clone()], &index_verses(&verses)).unwrap();
        assert_eq!(catch_up.activate, vec![verses[1].id]);
        assert_eq!(catch_up.cursors, vec![(collection.id, 2)]);
    }

    #[test]
    fn enabling_drip_validates_input() {
        let collection = drip_collection(0, &[]);
        let zero = DripSettings::Enabled { rate: 0, days: vec![1] };
        let bad_day = DripSettings::Enabled { rate: 2, days: vec![9] };

        assert!(plan_settings(&collection, &zero, &[], &[]).is_err());
        assert!(matches!(
            plan_settings(&collection, &bad_day, &[], &[]),
            Err(EngineError::InvalidWeekday(9))
        ));
    }

    #[test]
    fn resaving_legacy_weekly_drip_without_days_picks_monday() {
        let (mut collection, verses) = populated(2, &[], 4, 2);
        collection.drip_days = None;
        collection.drip_period = Some(DripPeriod::Week);
        let settings = DripSettings::Enabled { rate: 2, days: vec![] };

        let plan = plan_settings(&collection, &settings, &[], &verses).unwrap();

        assert_eq!(plan.patch.drip_rate, Some(2));
        assert_eq!(WeekdaySet::MONDAY.indices(), vec![1]);
        assert_eq!(plan.patch.drip_days, Some(vec![1]));
        assert_eq!(plan.patch.drip_cursor, None);
    }

    #[test]
    fn enabling_without_days_keeps_stored_days_or_uses_every_day() {
        let (collection, verses) = populated(1, &[2, 4], 3, 1);
        let settings = DripSettings::Enabled { rate: 3, days: vec![] };
        let plan = plan_settings(&collection, &settings, &[], &verses).unwrap();
        assert_eq!(plan.patch.drip_days, Some(vec![2, 4]));

        let mut plain = drip_collection(0, &[]);
        plain.drip_days = None;
        let plan = plan_settings(&plain, &settings, &[], &[]).unwrap();
        assert_eq!(plan.patch.drip_days, Some(WeekdaySet::ALL.indices()));
        assert_eq!(plan.patch.drip_cursor, Some(0));
    }

    #[test]
    fn enabling_drip_on_populated_collection_starts_at_end() {
        let (mut collection, verses) = populated(0, &[], 3, 3);
        collection.drip_cursor = None;
        let settings = DripSettings::Enabled { rate: 2, days: vec![3, 1] };

        let plan = plan_settings(&collection, &settings, &[], &verses).unwrap();

        assert_eq!(plan.patch.drip_rate, Some(2));
        assert_eq!(plan.patch.drip_days, Some(vec![1, 3]));
        assert_eq!(plan.patch.drip_cursor, Some(3));
    }

    #[test]
    fn changing_rate_keeps_cursor() {
        let (collection, verses) = populated(1, &[1], 4, 2);
        let settings = DripSettings::Enabled { rate: 3, days: vec![1] };
        let plan = plan_settings(&collection, &settings, &[], &verses).unwrap();
        assert_eq!(plan.patch.drip_cursor, None);
    }

    #[test]
    fn disabling_drip_releases_verses_not_held_elsewhere() {
        let (collection, mut verses) = populated(1, &[1], 3, 1);
        let mut other = drip_collection(1, &[1]);
        verses[2].collection_ids.push(other.id);
        other.verse_order = vec![verses[2].id];
        other.drip_cursor = Some(0);
        let all = vec![collection.clone(), other];

        let plan = plan_settings(&collection, &DripSettings::Disabled, &all, &verses).unwrap();

        assert_eq!(plan.patch.drip_rate, Some(0));
        assert_eq!(plan.activate, vec![verses[1].id]);
    }
}
