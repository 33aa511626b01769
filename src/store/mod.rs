//! Persisted stores and their shared plumbing.
//!
//! Articles and words are each the sole authority for their entities.
//! Both stores load their full collection once at construction and
//! flush a JSON snapshot through the [`Persistence`] boundary on every
//! mutation. Interested components subscribe for change events over
//! mpsc channels; there are no ambient singletons.

pub mod article;
pub mod word;

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{SystemTime, UNIX_EPOCH};

/// Key-value persistence keyed by a store namespace. The medium is an
/// external concern; the stores only see opaque string payloads.
pub trait Persistence {
    fn load(&self, namespace: &str) -> Option<String>;
    fn store(&self, namespace: &str, payload: &str);
}

/// In-memory persistence for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryPersistence {
    entries: RefCell<std::collections::HashMap<String, String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot currently stored under `namespace`, if any.
    pub fn snapshot(&self, namespace: &str) -> Option<String> {
        self.entries.borrow().get(namespace).cloned()
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self, namespace: &str) -> Option<String> {
        self.entries.borrow().get(namespace).cloned()
    }

    fn store(&self, namespace: &str, payload: &str) {
        self.entries
            .borrow_mut()
            .insert(namespace.to_string(), payload.to_string());
    }
}

/// File-backed persistence: one `<namespace>.json` per store under a
/// base directory. Write errors are logged and swallowed; losing a
/// flush degrades to stale data, never to a crash.
pub struct FilePersistence {
    dir: PathBuf,
}

impl FilePersistence {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            log::warn!("cannot create persistence dir {:?}: {}", dir, e);
        }
        Self { dir }
    }

    fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{}.json", namespace))
    }
}

impl Persistence for FilePersistence {
    fn load(&self, namespace: &str) -> Option<String> {
        fs::read_to_string(self.path_for(namespace)).ok()
    }

    fn store(&self, namespace: &str, payload: &str) {
        let path = self.path_for(namespace);
        if let Err(e) = fs::write(&path, payload) {
            log::warn!("flush to {:?} failed: {}", path, e);
        }
    }
}

/// Change notification emitted after a store mutation has been applied
/// and flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    ArticlesChanged,
    WordsChanged,
}

/// Fan-out of store events to subscribers. Disconnected receivers are
/// pruned on the next notify.
#[derive(Default)]
pub struct Subscribers {
    senders: Vec<Sender<StoreEvent>>,
}

impl Subscribers {
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.senders.push(tx);
        rx
    }

    pub fn notify(&mut self, event: StoreEvent) {
        self.senders.retain(|tx| tx.send(event).is_ok());
    }
}

/// Milliseconds since the Unix epoch, the timestamp unit used by all
/// persisted entities.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
