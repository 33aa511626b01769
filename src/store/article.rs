//! Content-addressed article collection.
//!
//! Articles are deduplicated by identity key: the source URL when one
//! exists, otherwise the content hash of the body text. Loading a URL
//! or pasting text that is already present resolves to the existing
//! article instead of creating a new one. Newest articles sit at the
//! front.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hash::content_key;
use crate::net::{FetchArticle, FetchError, FetchedArticle};
use crate::store::{now_ms, Persistence, StoreEvent, Subscribers};

const NAMESPACE: &str = "lingflow-saved-articles";

/// A saved article. Immutable after creation except for deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    /// Raw text, markdown-capable.
    pub content: String,
    /// Source URL; absent for pasted text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Epoch milliseconds.
    pub created_at: u64,
}

pub struct ArticleStore {
    articles: Vec<Article>,
    persistence: Box<dyn Persistence>,
    subscribers: Subscribers,
}

impl ArticleStore {
    /// Load the persisted collection; an unreadable snapshot starts
    /// the store empty rather than failing.
    pub fn new(persistence: Box<dyn Persistence>) -> Self {
        let articles = match persistence.load(NAMESPACE) {
            Some(payload) => match serde_json::from_str(&payload) {
                Ok(articles) => articles,
                Err(e) => {
                    log::warn!("discarding unreadable article snapshot: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        log::debug!("article store loaded: {} articles", articles.len());
        Self {
            articles,
            persistence,
            subscribers: Subscribers::default(),
        }
    }

    /// Most-recently-added first.
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    pub fn get_by_source(&self, source: &str) -> Option<&Article> {
        if source.is_empty() {
            return None;
        }
        self.articles
            .iter()
            .find(|a| a.source.as_deref() == Some(source))
    }

    /// Find an article whose body hashes to the same content key as
    /// `content`. Hash collisions between distinct texts are an
    /// accepted limitation of the scheme.
    pub fn get_by_content(&self, content: &str) -> Option<&Article> {
        let key = content_key(content);
        self.articles
            .iter()
            .find(|a| content_key(&a.content) == key)
    }

    /// Resolve a URL to its existing article, or fetch and create one.
    pub fn resolve_or_create_by_url(
        &mut self,
        url: &str,
        fetcher: &dyn FetchArticle,
    ) -> Result<Article, FetchError> {
        if let Some(existing) = self.get_by_source(url) {
            log::debug!("article dedup hit for {}", url);
            return Ok(existing.clone());
        }
        let fetched = fetcher.fetch(url)?;
        Ok(self.insert_fetched(url, fetched))
    }

    /// Insert a fetched article under `url`, re-checking dedup first —
    /// the fetch runs off-thread, so another load of the same URL may
    /// have landed in the meantime.
    pub fn insert_fetched(&mut self, url: &str, fetched: FetchedArticle) -> Article {
        if let Some(existing) = self.get_by_source(url) {
            return existing.clone();
        }
        let title = if fetched.title.trim().is_empty() {
            url.to_string()
        } else {
            fetched.title
        };
        let article = Article {
            id: Uuid::new_v4(),
            title,
            content: fetched.content,
            source: Some(url.to_string()),
            created_at: now_ms(),
        };
        self.articles.insert(0, article.clone());
        self.flush();
        article
    }

    /// Resolve pasted text to its existing article (by content hash),
    /// or create one.
    pub fn resolve_or_create_by_text(&mut self, text: &str, title: Option<&str>) -> Article {
        if let Some(existing) = self.get_by_content(text) {
            log::debug!("article dedup hit by content hash");
            return existing.clone();
        }
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled Document");
        let article = Article {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: text.to_string(),
            source: None,
            created_at: now_ms(),
        };
        self.articles.insert(0, article.clone());
        self.flush();
        article
    }

    /// Delete by id. Unknown ids are a silent no-op. Word entries that
    /// reference the article keep their source string.
    pub fn remove(&mut self, id: Uuid) {
        let before = self.articles.len();
        self.articles.retain(|a| a.id != id);
        if self.articles.len() != before {
            self.flush();
        }
    }

    pub fn subscribe(&mut self) -> std::sync::mpsc::Receiver<StoreEvent> {
        self.subscribers.subscribe()
    }

    fn flush(&mut self) {
        match serde_json::to_string(&self.articles) {
            Ok(payload) => self.persistence.store(NAMESPACE, &payload),
            Err(e) => log::warn!("article snapshot serialization failed: {}", e),
        }
        self.subscribers.notify(StoreEvent::ArticlesChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPersistence;

    struct StubFetcher {
        title: &'static str,
        content: &'static str,
    }

    impl FetchArticle for StubFetcher {
        fn fetch(&self, _url: &str) -> Result<FetchedArticle, FetchError> {
            Ok(FetchedArticle {
                title: self.title.to_string(),
                content: self.content.to_string(),
            })
        }
    }

    struct FailingFetcher;

    impl FetchArticle for FailingFetcher {
        fn fetch(&self, url: &str) -> Result<FetchedArticle, FetchError> {
            Err(FetchError {
                message: format!("unreachable: {}", url),
            })
        }
    }

    fn store() -> ArticleStore {
        let _ = env_logger::builder().is_test(true).try_init();
        ArticleStore::new(Box::new(MemoryPersistence::new()))
    }

    #[test]
    fn test_text_dedup_returns_same_article() {
        let mut store = store();
        let a = store.resolve_or_create_by_text("Same body text.", Some("First"));
        let b = store.resolve_or_create_by_text("Same body text.", Some("Second"));
        assert_eq!(a.id, b.id);
        assert_eq!(store.len(), 1);
        // The original title survives; the second load did not create.
        assert_eq!(b.title, "First");
    }

    #[test]
    fn test_get_by_content_matches_stored_body() {
        let mut store = store();
        let text = "Body looked up by content key.";
        let a = store.resolve_or_create_by_text(text, None);
        assert_eq!(store.get_by_content(text).unwrap().id, a.id);
        assert!(store.get_by_content("something else").is_none());
    }

    #[test]
    fn test_distinct_texts_create_distinct_articles() {
        let mut store = store();
        let a = store.resolve_or_create_by_text("alpha", None);
        let b = store.resolve_or_create_by_text("beta", None);
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_untitled_text_gets_default_title() {
        let mut store = store();
        let a = store.resolve_or_create_by_text("body", None);
        assert_eq!(a.title, "Untitled Document");
        assert!(a.source.is_none());
    }

    #[test]
    fn test_url_dedup_fetches_once() {
        let mut store = store();
        let fetcher = StubFetcher {
            title: "Post",
            content: "Body.",
        };
        let a = store
            .resolve_or_create_by_url("https://example.com/post", &fetcher)
            .unwrap();
        let b = store
            .resolve_or_create_by_url("https://example.com/post", &fetcher)
            .unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(store.len(), 1);
        assert_eq!(a.source.as_deref(), Some("https://example.com/post"));
    }

    #[test]
    fn test_fetch_failure_propagates_and_creates_nothing() {
        let mut store = store();
        let err = store
            .resolve_or_create_by_url("https://down.example", &FailingFetcher)
            .unwrap_err();
        assert!(err.message.contains("unreachable"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_blank_fetched_title_falls_back_to_url() {
        let mut store = store();
        let a = store.insert_fetched(
            "https://example.com/x",
            FetchedArticle {
                title: "  ".to_string(),
                content: "Body.".to_string(),
            },
        );
        assert_eq!(a.title, "https://example.com/x");
    }

    #[test]
    fn test_newest_first_order() {
        let mut store = store();
        store.resolve_or_create_by_text("first", None);
        store.resolve_or_create_by_text("second", None);
        assert_eq!(store.articles()[0].content, "second");
        assert_eq!(store.articles()[1].content, "first");
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut store = store();
        store.resolve_or_create_by_text("body", None);
        store.remove(Uuid::new_v4());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_deletes() {
        let mut store = store();
        let a = store.resolve_or_create_by_text("body", None);
        store.remove(a.id);
        assert!(store.is_empty());
    }

    #[test]
    fn test_persists_and_reloads() {
        let persistence = std::rc::Rc::new(MemoryPersistence::new());

        struct Shared(std::rc::Rc<MemoryPersistence>);
        impl Persistence for Shared {
            fn load(&self, ns: &str) -> Option<String> {
                self.0.load(ns)
            }
            fn store(&self, ns: &str, payload: &str) {
                self.0.store(ns, payload)
            }
        }

        let id = {
            let mut store = ArticleStore::new(Box::new(Shared(persistence.clone())));
            store.resolve_or_create_by_text("persisted body", Some("Kept")).id
        };

        let reloaded = ArticleStore::new(Box::new(Shared(persistence)));
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.articles()[0].id, id);
        assert_eq!(reloaded.articles()[0].title, "Kept");
    }

    #[test]
    fn test_corrupt_snapshot_starts_empty() {
        let persistence = MemoryPersistence::new();
        persistence.store(NAMESPACE, "not json");
        let store = ArticleStore::new(Box::new(persistence));
        assert!(store.is_empty());
    }

    #[test]
    fn test_mutation_notifies_subscribers() {
        let mut store = store();
        let rx = store.subscribe();
        store.resolve_or_create_by_text("body", None);
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::ArticlesChanged);
    }

    #[test]
    fn test_dedup_hit_does_not_notify() {
        let mut store = store();
        store.resolve_or_create_by_text("body", None);
        let rx = store.subscribe();
        store.resolve_or_create_by_text("body", None);
        assert!(rx.try_recv().is_err());
    }
}
