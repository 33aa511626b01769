//! Remote article fetching.
//!
//! The stores and the app context only see the [`FetchArticle`] trait:
//! one blocking call from URL to `{title, content}`. The HTTP
//! implementation lives in [`fetch`]; tests substitute stubs. There is
//! no retry, timeout beyond the client's own, or cancellation — a
//! failed fetch surfaces its message and that is the whole story.

pub mod extract;
pub mod fetch;

pub use fetch::HttpArticleFetcher;

/// Result of fetching an article from a URL.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedArticle {
    pub title: String,
    /// Plain article text; paragraphs separated by blank lines.
    pub content: String,
}

/// Error during article fetch, surfaced to the reader verbatim.
#[derive(Debug, Clone)]
pub struct FetchError {
    pub message: String,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Fetch an article by URL. Implementations run on a worker thread,
/// hence the bounds.
pub trait FetchArticle: Send + Sync {
    fn fetch(&self, url: &str) -> Result<FetchedArticle, FetchError>;
}
