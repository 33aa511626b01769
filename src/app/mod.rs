//! `ReaderApp` — the top-level application context.
//!
//! Owns the stores, the annotation session, and the gesture machine,
//! and wires them together: articles load (and deduplicate) through
//! the article store, selections become candidates in the session,
//! saves land in the word store. Nothing here is a singleton; the host
//! shell constructs one `ReaderApp` and injects the explainer and
//! fetcher capabilities.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::explain::Explain;
use crate::gesture::{DeviceClass, GestureAction, GestureRecognizer};
use crate::net::{FetchArticle, FetchError, FetchedArticle};
use crate::popover::{place, Viewport};
use crate::select::surface::{RawSelection, TextSurface};
use crate::select::{extract, Point};
use crate::session::AnnotationSession;
use crate::store::article::{Article, ArticleStore};
use crate::store::word::WordStore;

/// Result of one background article fetch, tagged with its URL.
struct FetchReply {
    url: String,
    result: Result<FetchedArticle, FetchError>,
}

pub struct ReaderApp {
    pub articles: ArticleStore,
    pub words: WordStore,
    pub session: AnnotationSession,
    pub gestures: GestureRecognizer,
    viewport: Viewport,
    /// Article currently open in the reading view.
    pub current_article: Option<Article>,
    /// True while a URL fetch is in flight.
    pub loading: bool,
    /// Visible, non-fatal load error; the reading view is not entered.
    pub error: Option<String>,
    explainer: Arc<dyn Explain>,
    fetcher: Arc<dyn FetchArticle>,
    fetch_rx: Option<Receiver<FetchReply>>,
}

impl ReaderApp {
    pub fn new(
        articles: ArticleStore,
        words: WordStore,
        explainer: Arc<dyn Explain>,
        fetcher: Arc<dyn FetchArticle>,
        viewport: Viewport,
        has_touch: bool,
    ) -> Self {
        let device = DeviceClass::classify(viewport.width, has_touch);
        Self {
            articles,
            words,
            session: AnnotationSession::new(),
            gestures: GestureRecognizer::new(device),
            viewport,
            current_article: None,
            loading: false,
            error: None,
            explainer,
            fetcher,
            fetch_rx: None,
        }
    }

    pub fn device(&self) -> DeviceClass {
        self.gestures.device()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Re-classify the device on viewport resize.
    pub fn handle_resize(&mut self, width: f32, height: f32, has_touch: bool) {
        self.viewport = Viewport { width, height };
        self.gestures.set_viewport(width, has_touch);
    }

    // ─── Article loading ────────────────────────────────────────────

    /// Open a URL. A known source resolves synchronously from the
    /// store; otherwise the fetch runs on a worker thread and lands
    /// via `check_fetch`.
    pub fn load_from_url(&mut self, url: &str) {
        let url = url.trim();
        if url.is_empty() || self.loading {
            return;
        }
        if let Some(existing) = self.articles.get_by_source(url) {
            log::debug!("opening deduplicated article for {}", url);
            self.current_article = Some(existing.clone());
            self.error = None;
            return;
        }

        self.loading = true;
        self.error = None;

        let (tx, rx) = mpsc::channel();
        self.fetch_rx = Some(rx);

        let url = url.to_string();
        let fetcher = Arc::clone(&self.fetcher);
        thread::spawn(move || {
            let result = fetcher.fetch(&url);
            let _ = tx.send(FetchReply { url, result });
        });
    }

    /// Poll the in-flight article fetch and update state when the
    /// result arrives. Failures surface as a visible error string; the
    /// reading view is not entered.
    pub fn check_fetch(&mut self) {
        let reply = match self.fetch_rx.as_ref().and_then(|rx| rx.try_recv().ok()) {
            Some(reply) => reply,
            None => return,
        };
        self.fetch_rx = None;
        self.loading = false;

        match reply.result {
            Ok(fetched) => {
                let article = self.articles.insert_fetched(&reply.url, fetched);
                self.current_article = Some(article);
                self.error = None;
            }
            Err(e) => {
                log::warn!("article fetch failed for {}: {}", reply.url, e);
                self.error = Some(e.to_string());
            }
        }
    }

    /// Open pasted text, deduplicated by content hash.
    pub fn load_from_text(&mut self, text: &str, title: Option<&str>) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let article = self.articles.resolve_or_create_by_text(text, title);
        self.current_article = Some(article);
        self.error = None;
    }

    /// Leave the reading view, closing any open annotation.
    pub fn close_article(&mut self) {
        self.current_article = None;
        self.session.close();
    }

    // ─── Selection → annotation ─────────────────────────────────────

    /// Run the extractor against a raw selection. A valid candidate
    /// opens the session (and starts its explanation fetch); anything
    /// else is a silent no-op. Returns whether a candidate was made.
    pub fn apply_selection(&mut self, surface: &dyn TextSurface, sel: &RawSelection) -> bool {
        match extract(surface, sel) {
            Some(candidate) => {
                log::debug!("candidate: {:?}", candidate.word);
                self.session.set_candidate(Some(candidate), &self.words);
                self.session.request_explanation(&self.explainer);
                true
            }
            None => false,
        }
    }

    /// Poll both in-flight operations from the host update loop, plus
    /// the long-press timer. Returns the gesture action, if any, for
    /// the host to execute.
    pub fn tick(&mut self, now: Instant) -> GestureAction {
        self.check_fetch();
        self.session.poll();
        self.gestures.poll_long_press(now)
    }

    /// Top-left corner for the popover, when one is open.
    pub fn popover_position(&self) -> Option<Point> {
        if !self.session.is_popover_open() {
            return None;
        }
        self.session
            .candidate()
            .map(|c| place(c.anchor, self.viewport, self.gestures.device()))
    }

    /// Save the live candidate into the word store, attributed to the
    /// open article (empty source for pasted text).
    pub fn save_current_word(&mut self) -> bool {
        let (source, title) = match &self.current_article {
            Some(article) => (
                article.source.clone().unwrap_or_default(),
                Some(article.title.clone()),
            ),
            None => (String::new(), None),
        };
        self.session
            .save(&mut self.words, &source, title.as_deref())
    }
}
