//! The annotation session.
//!
//! Tracks the currently highlighted word, its popover, and the
//! explanation fetch. The fetch runs on a worker thread and reports
//! back over an mpsc channel; the result is applied only if the word
//! it was requested for is still the live candidate, so a stale
//! response can never overwrite a newer selection. A failed fetch
//! degrades to the deterministic placeholder — the popover is never
//! stuck loading.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

use crate::explain::{placeholder, Explain, ExplainError, Explanation};
use crate::select::WordCandidate;
use crate::store::word::{NewWord, WordStore};

/// Result of one explanation request, tagged with the word it was
/// issued for.
struct ExplainReply {
    word: String,
    result: Result<Explanation, ExplainError>,
}

#[derive(Default)]
pub struct AnnotationSession {
    candidate: Option<WordCandidate>,
    explanation: Option<Explanation>,
    loading: bool,
    popover_open: bool,
    saved: bool,
    reply_rx: Option<Receiver<ExplainReply>>,
}

impl AnnotationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidate(&self) -> Option<&WordCandidate> {
        self.candidate.as_ref()
    }

    pub fn explanation(&self) -> Option<&Explanation> {
        self.explanation.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_popover_open(&self) -> bool {
        self.popover_open
    }

    /// Whether the live candidate is already in the word store.
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    /// Install a new candidate (opening the popover) or clear the
    /// session with `None`. Either way the previous explanation and
    /// loading state are gone; a reply still in flight for the old
    /// word will be discarded by `poll`.
    pub fn set_candidate(&mut self, candidate: Option<WordCandidate>, words: &WordStore) {
        self.saved = candidate
            .as_ref()
            .map(|c| words.get_by_text(&c.word).is_some())
            .unwrap_or(false);
        self.popover_open = candidate.is_some();
        self.candidate = candidate;
        self.explanation = None;
        self.loading = false;
    }

    /// Kick off the explanation fetch for the live candidate. At most
    /// one fetch per candidate: a second call while loading, or after
    /// an explanation arrived, is a no-op.
    pub fn request_explanation(&mut self, explainer: &Arc<dyn Explain>) {
        let candidate = match &self.candidate {
            Some(c) if self.explanation.is_none() && !self.loading => c,
            _ => return,
        };

        let word = candidate.word.clone();
        let sentence = candidate.sentence.clone();
        let explainer = Arc::clone(explainer);

        let (tx, rx) = mpsc::channel();
        self.reply_rx = Some(rx);
        self.loading = true;

        log::debug!("requesting explanation for {:?}", word);
        thread::spawn(move || {
            let result = explainer.explain(&word, &sentence);
            // The session may have moved on; a dead channel is fine.
            let _ = tx.send(ExplainReply { word, result });
        });
    }

    /// Poll the in-flight fetch. Returns true when a reply was applied
    /// to the live candidate. Replies for any other word are dropped
    /// without touching state.
    pub fn poll(&mut self) -> bool {
        let reply = match self.reply_rx.as_ref().and_then(|rx| rx.try_recv().ok()) {
            Some(reply) => reply,
            None => return false,
        };
        self.reply_rx = None;

        let current = match &self.candidate {
            Some(c) if c.word == reply.word => c,
            _ => {
                log::debug!("dropping stale explanation for {:?}", reply.word);
                return false;
            }
        };

        self.explanation = Some(match reply.result {
            Ok(explanation) => explanation,
            Err(e) => {
                log::warn!("explainer failed for {:?}: {}", current.word, e);
                placeholder(&current.word)
            }
        });
        self.loading = false;
        true
    }

    /// Persist the live candidate (and its explanation, if present)
    /// into the word store. Idempotent by case-insensitive word text;
    /// returns true only when a new entry was created.
    pub fn save(
        &mut self,
        words: &mut WordStore,
        source: &str,
        source_title: Option<&str>,
    ) -> bool {
        let candidate = match &self.candidate {
            Some(c) => c,
            None => return false,
        };

        if words.get_by_text(&candidate.word).is_some() {
            self.saved = true;
            return false;
        }

        words.add(NewWord {
            word: candidate.word.clone(),
            sentence: candidate.sentence.clone(),
            paragraph: Some(candidate.paragraph.clone()),
            source: source.to_string(),
            source_title: source_title.map(str::to_string),
            explanation: self.explanation.clone(),
        });
        self.saved = true;
        true
    }

    /// Close the popover, clearing candidate, explanation and loading
    /// state together.
    pub fn close(&mut self) {
        self.candidate = None;
        self.explanation = None;
        self.loading = false;
        self.popover_open = false;
        self.saved = false;
        self.reply_rx = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::stub::{EchoExplainer, FailingExplainer};
    use crate::select::Point;
    use crate::store::MemoryPersistence;
    use std::time::Duration;

    fn candidate(word: &str) -> WordCandidate {
        WordCandidate {
            word: word.to_string(),
            sentence: format!("A sentence with {}.", word),
            paragraph: format!("A paragraph with {}.", word),
            anchor: Point { x: 100.0, y: 200.0 },
        }
    }

    fn words() -> WordStore {
        let _ = env_logger::builder().is_test(true).try_init();
        WordStore::with_seed(Box::new(MemoryPersistence::new()), 3)
    }

    /// Drive `poll` until the worker thread replies.
    fn poll_until_idle(session: &mut AnnotationSession) {
        for _ in 0..200 {
            session.poll();
            if !session.is_loading() {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("explanation fetch never settled");
    }

    #[test]
    fn test_set_candidate_opens_popover() {
        let mut session = AnnotationSession::new();
        session.set_candidate(Some(candidate("cache")), &words());
        assert!(session.is_popover_open());
        assert!(session.explanation().is_none());
        assert!(!session.is_loading());
    }

    #[test]
    fn test_set_candidate_none_closes() {
        let mut session = AnnotationSession::new();
        let store = words();
        session.set_candidate(Some(candidate("cache")), &store);
        session.set_candidate(None, &store);
        assert!(!session.is_popover_open());
        assert!(session.candidate().is_none());
    }

    #[test]
    fn test_successful_fetch_applies() {
        let mut session = AnnotationSession::new();
        session.set_candidate(Some(candidate("cache")), &words());

        let explainer: Arc<dyn Explain> = Arc::new(EchoExplainer);
        session.request_explanation(&explainer);
        assert!(session.is_loading());

        poll_until_idle(&mut session);
        assert_eq!(session.explanation().unwrap().english, "echo:cache");
    }

    #[test]
    fn test_failed_fetch_installs_placeholder() {
        let mut session = AnnotationSession::new();
        session.set_candidate(Some(candidate("latency")), &words());

        let explainer: Arc<dyn Explain> = Arc::new(FailingExplainer);
        session.request_explanation(&explainer);
        poll_until_idle(&mut session);

        let explanation = session.explanation().unwrap();
        assert!(explanation.english.contains("latency"));
        assert!(explanation.chinese.contains("latency"));
        assert!(!session.is_loading());
    }

    #[test]
    fn test_fetch_requested_at_most_once() {
        let mut session = AnnotationSession::new();
        session.set_candidate(Some(candidate("cache")), &words());

        let explainer: Arc<dyn Explain> = Arc::new(EchoExplainer);
        session.request_explanation(&explainer);
        poll_until_idle(&mut session);

        // Explanation present: a second request is a no-op.
        session.request_explanation(&explainer);
        assert!(!session.is_loading());
    }

    #[test]
    fn test_stale_reply_does_not_overwrite_new_candidate() {
        let mut session = AnnotationSession::new();
        let store = words();
        session.set_candidate(Some(candidate("first")), &store);

        let explainer: Arc<dyn Explain> = Arc::new(EchoExplainer);
        session.request_explanation(&explainer);

        // The user selects a different word before the reply lands.
        session.set_candidate(Some(candidate("second")), &store);

        // Give the worker time, then drain. The reply for "first"
        // must not become "second"'s explanation.
        thread::sleep(Duration::from_millis(50));
        session.poll();
        assert!(session.explanation().is_none());

        // The new candidate still fetches normally.
        session.request_explanation(&explainer);
        poll_until_idle(&mut session);
        assert_eq!(session.explanation().unwrap().english, "echo:second");
    }

    #[test]
    fn test_save_is_idempotent_case_insensitive() {
        let mut session = AnnotationSession::new();
        let mut store = words();

        session.set_candidate(Some(candidate("Cache")), &store);
        // Extraction lowercases, but save must also hold its own.
        assert!(session.save(&mut store, "https://example.com", Some("Post")));
        assert_eq!(store.len(), 1);

        session.set_candidate(Some(candidate("cache")), &store);
        assert!(session.is_saved());
        assert!(!session.save(&mut store, "https://example.com", Some("Post")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_save_carries_explanation_and_context() {
        let mut session = AnnotationSession::new();
        let mut store = words();
        session.set_candidate(Some(candidate("schema")), &store);

        let explainer: Arc<dyn Explain> = Arc::new(EchoExplainer);
        session.request_explanation(&explainer);
        poll_until_idle(&mut session);
        session.save(&mut store, "notes.md", None);

        let entry = store.get_by_text("schema").unwrap();
        assert_eq!(entry.sentence, "A sentence with schema.");
        assert_eq!(entry.paragraph.as_deref(), Some("A paragraph with schema."));
        assert_eq!(entry.source, "notes.md");
        assert_eq!(entry.explanation.as_ref().unwrap().english, "echo:schema");
    }

    #[test]
    fn test_save_without_candidate_is_noop() {
        let mut session = AnnotationSession::new();
        let mut store = words();
        assert!(!session.save(&mut store, "", None));
        assert!(store.is_empty());
    }

    #[test]
    fn test_close_clears_everything() {
        let mut session = AnnotationSession::new();
        session.set_candidate(Some(candidate("cache")), &words());
        let explainer: Arc<dyn Explain> = Arc::new(EchoExplainer);
        session.request_explanation(&explainer);

        session.close();
        assert!(session.candidate().is_none());
        assert!(session.explanation().is_none());
        assert!(!session.is_loading());
        assert!(!session.is_popover_open());
        // A late reply after close is ignored.
        thread::sleep(Duration::from_millis(50));
        assert!(!session.poll());
        assert!(session.explanation().is_none());
    }

    #[test]
    fn test_existing_word_marks_session_saved() {
        let mut store = words();
        store.add(NewWord {
            word: "cache".to_string(),
            sentence: "s".to_string(),
            paragraph: None,
            source: String::new(),
            source_title: None,
            explanation: None,
        });

        let mut session = AnnotationSession::new();
        session.set_candidate(Some(candidate("CACHE")), &store);
        assert!(session.is_saved());
    }
}
