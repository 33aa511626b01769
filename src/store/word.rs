//! Saved vocabulary and the review scheduler.
//!
//! Words enter the store only through an explicit save of a live
//! candidate and leave only by explicit removal. Review selection is a
//! priority-plus-shuffle rotation — least-reviewed first, newer first
//! on ties, then a uniform shuffle of the front of that ordering — not
//! an interval scheduler.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::explain::Explanation;
use crate::store::{now_ms, Persistence, StoreEvent, Subscribers};

const NAMESPACE: &str = "lingflow-words";

/// A saved vocabulary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub id: Uuid,
    pub word: String,
    pub sentence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<String>,
    /// URL or document name the word came from; may dangle after the
    /// article is deleted, by design.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
    /// Epoch milliseconds.
    pub created_at: u64,
    pub review_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<u64>,
}

/// Data for a new entry; id, timestamps and review bookkeeping are the
/// store's business.
#[derive(Debug, Clone)]
pub struct NewWord {
    pub word: String,
    pub sentence: String,
    pub paragraph: Option<String>,
    pub source: String,
    pub source_title: Option<String>,
    pub explanation: Option<Explanation>,
}

pub struct WordStore {
    words: Vec<WordEntry>,
    persistence: Box<dyn Persistence>,
    subscribers: Subscribers,
    rng: SmallRng,
}

impl WordStore {
    pub fn new(persistence: Box<dyn Persistence>) -> Self {
        Self::with_rng(persistence, SmallRng::from_entropy())
    }

    /// Seeded construction keeps scheduling tests deterministic.
    pub fn with_seed(persistence: Box<dyn Persistence>, seed: u64) -> Self {
        Self::with_rng(persistence, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(persistence: Box<dyn Persistence>, rng: SmallRng) -> Self {
        let words = match persistence.load(NAMESPACE) {
            Some(payload) => match serde_json::from_str(&payload) {
                Ok(words) => words,
                Err(e) => {
                    log::warn!("discarding unreadable word snapshot: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        log::debug!("word store loaded: {} words", words.len());
        Self {
            words,
            persistence,
            subscribers: Subscribers::default(),
            rng,
        }
    }

    /// Insertion order, newest first.
    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&WordEntry> {
        self.words.iter().find(|w| w.id == id)
    }

    /// Case-insensitive exact match on the word text.
    pub fn get_by_text(&self, text: &str) -> Option<&WordEntry> {
        self.words
            .iter()
            .find(|w| w.word.eq_ignore_ascii_case(text))
    }

    /// Save a new entry at the front. The caller (the annotation
    /// session) is responsible for idempotence by word text.
    pub fn add(&mut self, new: NewWord) -> Uuid {
        let entry = WordEntry {
            id: Uuid::new_v4(),
            word: new.word,
            sentence: new.sentence,
            paragraph: new.paragraph,
            source: new.source,
            source_title: new.source_title,
            explanation: new.explanation,
            created_at: now_ms(),
            review_count: 0,
            last_reviewed_at: None,
        };
        let id = entry.id;
        self.words.insert(0, entry);
        self.flush();
        id
    }

    /// Delete by id; unknown ids are a silent no-op.
    pub fn remove(&mut self, id: Uuid) {
        let before = self.words.len();
        self.words.retain(|w| w.id != id);
        if self.words.len() != before {
            self.flush();
        }
    }

    /// Case-insensitive substring search over word, source and
    /// sentence, in the store's insertion order.
    pub fn search(&self, query: &str) -> Vec<&WordEntry> {
        let q = query.to_lowercase();
        self.words
            .iter()
            .filter(|w| {
                w.word.to_lowercase().contains(&q)
                    || w.source.to_lowercase().contains(&q)
                    || w.sentence.to_lowercase().contains(&q)
            })
            .collect()
    }

    /// Up to `limit` entries, newest first by save time.
    pub fn recent(&self, limit: usize) -> Vec<&WordEntry> {
        let mut sorted: Vec<&WordEntry> = self.words.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted.truncate(limit);
        sorted
    }

    /// Pick up to `count` words for a review round.
    ///
    /// Sort ascending by review count, newer first on ties, take the
    /// first `2*count` as candidates, shuffle them uniformly, return
    /// the first `count`. Under-reviewed and recently-added words are
    /// favored while the selection still rotates.
    pub fn words_for_review(&mut self, count: usize) -> Vec<WordEntry> {
        if self.words.is_empty() || count == 0 {
            return Vec::new();
        }
        let mut sorted: Vec<&WordEntry> = self.words.iter().collect();
        sorted.sort_by(|a, b| {
            a.review_count
                .cmp(&b.review_count)
                .then(b.created_at.cmp(&a.created_at))
        });
        let mut candidates: Vec<WordEntry> = sorted
            .into_iter()
            .take(count * 2)
            .cloned()
            .collect();
        candidates.shuffle(&mut self.rng);
        candidates.truncate(count);
        candidates
    }

    /// Record one review pass over an entry: bump the count and stamp
    /// the time. Unknown ids are a silent no-op.
    pub fn mark_reviewed(&mut self, id: Uuid) {
        let mut changed = false;
        if let Some(entry) = self.words.iter_mut().find(|w| w.id == id) {
            entry.review_count += 1;
            entry.last_reviewed_at = Some(now_ms());
            changed = true;
        }
        if changed {
            self.flush();
        }
    }

    pub fn subscribe(&mut self) -> std::sync::mpsc::Receiver<StoreEvent> {
        self.subscribers.subscribe()
    }

    fn flush(&mut self) {
        match serde_json::to_string(&self.words) {
            Ok(payload) => self.persistence.store(NAMESPACE, &payload),
            Err(e) => log::warn!("word snapshot serialization failed: {}", e),
        }
        self.subscribers.notify(StoreEvent::WordsChanged);
    }
}
