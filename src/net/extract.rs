//! Title and body extraction from fetched HTML.
//!
//! Selector cascades: try the usual article containers in order of
//! specificity and settle for the first one with enough text. This is
//! heuristic by design; the reading surface renders whatever text we
//! hand it.

use scraper::{ElementRef, Html, Selector};

/// Minimum extracted-text length before a container is trusted as the
/// article body.
const MIN_CONTENT_LEN: usize = 200;

const TITLE_SELECTORS: [&str; 6] = [
    "h1",
    "article h1",
    ".article-title",
    ".post-title",
    "title",
    "meta[property='og:title']",
];

const CONTENT_SELECTORS: [&str; 8] = [
    "article",
    "main article",
    ".post-content",
    ".article-content",
    ".markdown-body",
    ".entry-content",
    "main",
    ".content",
];

/// Best-effort article title.
pub fn extract_title(document: &Html) -> Option<String> {
    for selector_str in TITLE_SELECTORS {
        let selector = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if let Some(element) = document.select(&selector).next() {
            if selector_str.contains("meta") {
                if let Some(content) = element.value().attr("content") {
                    let content = content.trim();
                    if !content.is_empty() {
                        return Some(content.to_string());
                    }
                }
            } else {
                let text = element.text().collect::<String>().trim().to_string();
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

/// Article body as plain text, paragraphs separated by blank lines.
/// Falls back to the whole body, then the whole document.
pub fn extract_content(document: &Html) -> String {
    for selector_str in CONTENT_SELECTORS {
        let selector = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if let Some(element) = document.select(&selector).next() {
            let text = block_text(element);
            if text.len() > MIN_CONTENT_LEN {
                return text;
            }
        }
    }

    if let Ok(selector) = Selector::parse("body") {
        if let Some(body) = document.select(&selector).next() {
            return block_text(body);
        }
    }

    document.root_element().text().collect::<String>().trim().to_string()
}

/// Collect the block-level text of a container: one paragraph per
/// block element, whitespace collapsed within each.
fn block_text(element: ElementRef<'_>) -> String {
    let blocks = match Selector::parse("p, h1, h2, h3, h4, h5, h6, li, pre, blockquote") {
        Ok(s) => s,
        Err(_) => return paragraph_text_ref(&element),
    };

    let mut paragraphs: Vec<String> = element
        .select(&blocks)
        .map(paragraph_text)
        .filter(|p| !p.is_empty())
        .collect();

    // A container with no block children still carries inline text.
    if paragraphs.is_empty() {
        paragraphs = vec![paragraph_text_ref(&element)];
    }

    paragraphs.retain(|p| !p.is_empty());
    paragraphs.join("\n\n")
}

fn paragraph_text(element: ElementRef<'_>) -> String {
    paragraph_text_ref(&element)
}

fn paragraph_text_ref(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
