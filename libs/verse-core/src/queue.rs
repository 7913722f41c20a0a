//! Review queue construction.

use crate::scheduler::CardScheduler;
use crate::types::{Collection, LearningPhase, ReviewMode, ReviewScope, SessionConfig, Verse};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Alternative ways into a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryPoint {
    /// Review exactly this verse.
    Pinned { verse_id: Uuid },
    /// Walk a collection in order, starting at this verse.
    ContinueFrom { collection_id: Uuid, verse_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueRequest {
    pub scope: ReviewScope,
    #[serde(default)]
    pub mode: ReviewMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<EntryPoint>,
    #[serde(default)]
    pub config: SessionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub verse_id: Uuid,
    /// Grade this verse as Good without asking.
    pub auto_grade: bool,
}

/// An ordered session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewQueue {
    /// Mode that governs grading; `Sequential` for continue-from sessions.
    pub mode: ReviewMode,
    pub entries: Vec<QueueEntry>,
    pub config: SessionConfig,
    #[serde(skip)]
    position: usize,
}

/// One step through a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    Next(QueueEntry),
    /// Every entry was handed out; the session completed normally.
    Exhausted,
}

impl ReviewQueue {
    fn new(mode: ReviewMode, verses: Vec<&Verse>, config: SessionConfig) -> Self {
        let entries = verses
            .into_iter()
            .map(|verse| QueueEntry {
                verse_id: verse.id,
                auto_grade: mode == ReviewMode::Sequential
                    || verse.learning_phase == LearningPhase::Beginner,
            })
            .collect();
        Self {
            mode,
            entries,
            config,
            position: 0,
        }
    }

    pub fn next(&mut self) -> SessionStep {
        match self.entries.get(self.position) {
            Some(entry) => {
                self.position += 1;
                SessionStep::Next(*entry)
            }
            None => SessionStep::Exhausted,
        }
    }

    pub fn verse_ids(&self) -> Vec<Uuid> {
        self.entries.iter().map(|entry| entry.verse_id).collect()
    }
}

/// Result of building a queue. `NothingEligible` means the scope had no
/// reviewable verses at all, which is different from a finished session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueueOutcome {
    Ready(ReviewQueue),
    NothingEligible,
}

impl QueueOutcome {
    pub fn into_queue(self) -> Option<ReviewQueue> {
        match self {
            Self::Ready(queue) => Some(queue),
            Self::NothingEligible => None,
        }
    }
}

/// Build the queue for one session.
///
/// Scoped pools only ever hold active verses. Entry points look verses up
/// directly, so a queued verse can still be reviewed through them.
pub fn build_queue<R: Rng + ?Sized>(
    request: &QueueRequest,
    verses: &[Verse],
    collections: &[Collection],
    scheduler: &dyn CardScheduler,
    now: DateTime<Utc>,
    rng: &mut R,
) -> QueueOutcome {
    let config = request.config.normalized();

    let (mode, ordered): (ReviewMode, Vec<&Verse>) = match request.entry {
        Some(EntryPoint::Pinned { verse_id }) => (
            request.mode,
            verses.iter().filter(|verse| verse.id == verse_id).take(1).collect(),
        ),
        Some(EntryPoint::ContinueFrom {
            collection_id,
            verse_id,
        }) => (
            ReviewMode::Sequential,
            continue_from(verses, collections, collection_id, verse_id),
        ),
        None => {
            let pool = scope_pool(verses, request.scope);
            let single = match request.scope {
                ReviewScope::Collection { collection_id } => {
                    collections.iter().find(|c| c.id == collection_id)
                }
                ReviewScope::Starred | ReviewScope::Library => None,
            };
            (
                request.mode,
                order_pool(pool, request.mode, single, scheduler, now, rng),
            )
        }
    };

    if ordered.is_empty() {
        QueueOutcome::NothingEligible
    } else {
        QueueOutcome::Ready(ReviewQueue::new(mode, ordered, config))
    }
}

/// Active verses in scope, oldest first.
fn scope_pool(verses: &[Verse], scope: ReviewScope) -> Vec<&Verse> {
    let mut pool: Vec<&Verse> = verses
        .iter()
        .filter(|verse| verse.active)
        .filter(|verse| match scope {
            ReviewScope::Starred => verse.starred,
            ReviewScope::Collection { collection_id } => verse.belongs_to(collection_id),
            ReviewScope::Library => true,
        })
        .collect();
    pool.sort_by_key(|verse| verse.created_at);
    pool
}

fn order_pool<'a, R: Rng + ?Sized>(
    mut pool: Vec<&'a Verse>,
    mode: ReviewMode,
    collection: Option<&Collection>,
    scheduler: &dyn CardScheduler,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<&'a Verse> {
    match mode {
        ReviewMode::DueFirst => {
            let mut due: Vec<&Verse> = pool
                .iter()
                .copied()
                .filter(|verse| scheduler.is_due(&verse.card, now))
                .collect();
            if due.is_empty() {
                pool.shuffle(rng);
                pool
            } else {
                due.shuffle(rng);
                due
            }
        }
        ReviewMode::Random => {
            pool.shuffle(rng);
            pool
        }
        ReviewMode::Sequential => match collection {
            Some(collection) if !collection.verse_order.is_empty() => {
                in_collection_order(pool, collection)
            }
            _ => pool,
        },
    }
}

/// Order by `verse_order`; verses the order does not mention follow in
/// their existing order.
fn in_collection_order<'a>(pool: Vec<&'a Verse>, collection: &Collection) -> Vec<&'a Verse> {
    let (mut listed, unlisted): (Vec<&Verse>, Vec<&Verse>) = pool
        .into_iter()
        .partition(|verse| collection.position_of(verse.id).is_some());
    listed.sort_by_key(|verse| collection.position_of(verse.id));
    listed.extend(unlisted);
    listed
}

fn continue_from<'a>(
    verses: &'a [Verse],
    collections: &[Collection],
    collection_id: Uuid,
    verse_id: Uuid,
) -> Vec<&'a Verse> {
    let Some(collection) = collections.iter().find(|c| c.id == collection_id) else {
        return Vec::new();
    };
    let mut members: Vec<&Verse> = verses
        .iter()
        .filter(|verse| verse.belongs_to(collection_id))
        .collect();
    members.sort_by_key(|verse| verse.created_at);
    let ordered = if collection.verse_order.is_empty() {
        members
    } else {
        in_collection_order(members, collection)
    };

    match ordered.iter().position(|verse| verse.id == verse_id) {
        Some(start) => ordered[start..].to_vec(),
        None => Vec::new(),
    }
}
