//! One account's verses, collections and profile, and the plans that change
//! them.
//!
//! Planners return a [`ChangeSet`]. Callers persist it and only then fold it
//! back into the snapshot with [`LibrarySnapshot::apply`].

use crate::drip::{self, AdditionPlan, DripRun, DripSettings, VerseIndex};
use crate::error::{EngineError, Result};
use crate::patch::{CollectionPatch, ProfilePatch, VersePatch};
use crate::reference::compare_references;
use crate::scheduler::CardScheduler;
use crate::types::{Collection, LearningPhase, Passage, Profile, Verse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Patches to persist, at most one per record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub verses: Vec<(Uuid, VersePatch)>,
    pub collections: Vec<(Uuid, CollectionPatch)>,
    pub profile: Option<ProfilePatch>,
}

impl ChangeSet {
    pub fn patch_verse(&mut self, id: Uuid, patch: VersePatch) {
        match self.verses.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, current)) => *current = std::mem::take(current).merge(patch),
            None => self.verses.push((id, patch)),
        }
    }

    pub fn patch_collection(&mut self, id: Uuid, patch: CollectionPatch) {
        match self.collections.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, current)) => *current = std::mem::take(current).merge(patch),
            None => self.collections.push((id, patch)),
        }
    }

    pub fn activate(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        for id in ids {
            self.patch_verse(id, VersePatch::activate());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty() && self.collections.is_empty() && self.profile.is_none()
    }
}

/// Verse listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerseSort {
    #[default]
    Created,
    Reference,
}

/// Counts shown alongside the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LibraryStats {
    pub total: usize,
    pub active: usize,
    pub queued: usize,
    pub due: usize,
    pub beginner: usize,
    pub learning: usize,
    pub mastered: usize,
    pub starred: usize,
    pub collections: usize,
}

/// Verses created by [`LibrarySnapshot::plan_new_verses`].
#[derive(Debug, Clone)]
pub struct NewVerses {
    pub verses: Vec<Verse>,
    pub changes: ChangeSet,
}

/// Result of a calendar drip pass over the whole library.
#[derive(Debug, Clone, Default)]
pub struct DripPass {
    pub runs: Vec<DripRun>,
    pub changes: ChangeSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    pub verses: Vec<Verse>,
    pub collections: Vec<Collection>,
    pub profile: Profile,
}

impl LibrarySnapshot {
    pub fn new(verses: Vec<Verse>, collections: Vec<Collection>, profile: Profile) -> Self {
        Self {
            verses,
            collections,
            profile,
        }
    }

    /// Discard a daily review log left over from an earlier day.
    pub fn refreshed(mut self, today: NaiveDate) -> Self {
        self.profile = self.profile.refreshed(today);
        self
    }

    pub fn verse(&self, id: Uuid) -> Option<&Verse> {
        self.verses.iter().find(|verse| verse.id == id)
    }

    pub fn collection(&self, id: Uuid) -> Option<&Collection> {
        self.collections.iter().find(|collection| collection.id == id)
    }

    pub fn index(&self) -> VerseIndex<'_> {
        drip::index_verses(&self.verses)
    }

    /// Fold persisted changes back into the snapshot.
    pub fn apply(&mut self, changes: &ChangeSet) {
        let verse_patches: HashMap<Uuid, &VersePatch> =
            changes.verses.iter().map(|(id, patch)| (*id, patch)).collect();
        for verse in &mut self.verses {
            if let Some(patch) = verse_patches.get(&verse.id) {
                patch.apply_to(verse);
            }
        }
        for (id, patch) in &changes.collections {
            if let Some(collection) = self.collections.iter_mut().find(|c| c.id == *id) {
                patch.apply_to(collection);
            }
        }
        if let Some(patch) = &changes.profile {
            patch.apply_to(&mut self.profile);
        }
    }

    /// Calendar drip over every collection.
    pub fn plan_drip(&self, today: NaiveDate) -> DripPass {
        let runs = drip::run_all(&self.collections, &self.index(), today);
        let mut changes = ChangeSet::default();
        for run in &runs {
            changes.activate(run.activate.iter().copied());
            changes.patch_collection(run.collection_id, run.patch());
        }
        DripPass { runs, changes }
    }

    /// Create verses from passages and place them in `collection_ids`.
    pub fn plan_new_verses(
        &self,
        passages: Vec<Passage>,
        collection_ids: &[Uuid],
        scheduler: &dyn CardScheduler,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<NewVerses> {
        let targets = collection_ids
            .iter()
            .map(|id| self.collection(*id).ok_or(EngineError::CollectionNotFound(*id)))
            .collect::<Result<Vec<&Collection>>>()?;

        let ids: Vec<Uuid> = passages.iter().map(|_| Uuid::new_v4()).collect();
        let AdditionPlan { queued, collections } = drip::plan_additions(&targets, &ids, today);

        let verses = passages
            .into_iter()
            .zip(&ids)
            .map(|(passage, id)| {
                Verse::new(
                    *id,
                    passage,
                    collection_ids.to_vec(),
                    scheduler.new_card(now),
                    !queued.contains(id),
                    now,
                )
            })
            .collect();

        let mut changes = ChangeSet::default();
        for (id, patch) in collections {
            changes.patch_collection(id, patch);
        }
        Ok(NewVerses { verses, changes })
    }

    pub fn plan_drip_settings(&self, collection_id: Uuid, settings: &DripSettings) -> Result<ChangeSet> {
        let collection = self
            .collection(collection_id)
            .ok_or(EngineError::CollectionNotFound(collection_id))?;
        let plan = drip::plan_settings(collection, settings, &self.collections, &self.verses)?;
        let mut changes = ChangeSet::default();
        changes.activate(plan.activate);
        changes.patch_collection(collection_id, plan.patch);
        Ok(changes)
    }

    pub fn plan_star(&self, verse_id: Uuid, starred: bool) -> Result<ChangeSet> {
        self.verse(verse_id).ok_or(EngineError::VerseNotFound(verse_id))?;
        let mut changes = ChangeSet::default();
        changes.patch_verse(
            verse_id,
            VersePatch {
                starred: Some(starred),
                ..Default::default()
            },
        );
        Ok(changes)
    }

    /// Verses deleted along with a collection.
    pub fn verses_removed_with(&self, collection_id: Uuid) -> Result<Vec<Uuid>> {
        self.collection(collection_id)
            .ok_or(EngineError::CollectionNotFound(collection_id))?;
        Ok(self
            .verses
            .iter()
            .filter(|verse| verse.belongs_to(collection_id))
            .map(|verse| verse.id)
            .collect())
    }

    pub fn sorted_verses(&self, sort: VerseSort) -> Vec<&Verse> {
        let mut verses: Vec<&Verse> = self.verses.iter().collect();
        match sort {
            VerseSort::Created => verses.sort_by_key(|verse| verse.created_at),
            VerseSort::Reference => {
                verses.sort_by(|a, b| compare_references(&a.reference, &b.reference))
            }
        }
        verses
    }

    pub fn stats(&self, scheduler: &dyn CardScheduler, now: DateTime<Utc>) -> LibraryStats {
        let mut stats = LibraryStats {
            total: self.verses.len(),
            collections: self.collections.len(),
            ..Default::default()
        };
        for verse in &self.verses {
            if verse.active {
                stats.active += 1;
                if scheduler.is_due(&verse.card, now) {
                    stats.due += 1;
                }
            } else {
                stats.queued += 1;
            }
            if verse.starred {
                stats.starred += 1;
            }
            match verse.learning_phase {
                LearningPhase::Beginner => stats.beginner += 1,
                LearningPhase::Learning => stats.learning += 1,
                LearningPhase::Mastered => stats.mastered += 1,
            }
        }
        stats
    }
}
