//! Selection → Word Candidate extraction.
//!
//! Turns a raw highlight reported by the reading surface into a
//! validated single-word candidate with its sentence and paragraph
//! context and a screen anchor for the popover. Every rejection is a
//! silent `None`: an invalid selection is not an error, it is a
//! gesture the reader didn't mean.

pub mod surface;

use surface::{RawSelection, TextSurface};

/// Screen point in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// A validated, normalized word selection.
#[derive(Debug, Clone, PartialEq)]
pub struct WordCandidate {
    /// The selected word, lowercased.
    pub word: String,
    /// Sentence containing the selection, trimmed.
    pub sentence: String,
    /// Text of the enclosing paragraph-level block, trimmed.
    pub paragraph: String,
    /// Popover anchor: horizontal midpoint of the selection rect,
    /// vertical bottom edge.
    pub anchor: Point,
}

/// Longest selection still treated as a single word.
const MAX_WORD_LEN: usize = 30;

/// Sentence terminators recognized by the context scan. Punctuation
/// heuristics only; this is deliberately not a sentence segmenter.
const TERMINATORS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

/// Run the full validation pipeline over a raw selection.
///
/// Returns `None` — with no side effects — unless the selection is
/// non-collapsed, trims to a space-free string of at most 30
/// characters, and matches `letters(-letters)*`.
pub fn extract(surface: &dyn TextSurface, sel: &RawSelection) -> Option<WordCandidate> {
    if sel.collapsed {
        return None;
    }

    let trimmed = sel.text.trim();
    if trimmed.is_empty() || trimmed.contains(' ') || trimmed.len() > MAX_WORD_LEN {
        return None;
    }
    if !is_word_shaped(trimmed) {
        return None;
    }

    let word = trimmed.to_lowercase();
    let anchor = Point {
        x: sel.rect.left + sel.rect.width / 2.0,
        y: sel.rect.bottom(),
    };

    let sentence = match surface.node_text(sel.anchor_node) {
        Some(text) if !text.is_empty() => sentence_around(text, sel.anchor_offset),
        _ => sel.text.trim().to_string(),
    };

    let paragraph = surface
        .block_text(sel.anchor_node)
        .or_else(|| {
            surface
                .node_text(sel.anchor_node)
                .map(|t| t.trim().to_string())
        })
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| sel.text.trim().to_string());

    Some(WordCandidate {
        word,
        sentence,
        paragraph,
        anchor,
    })
}

/// `^[a-zA-Z]+(-[a-zA-Z]+)*$` — letters with single internal hyphens.
fn is_word_shaped(text: &str) -> bool {
    let mut prev_was_letter = false;
    for c in text.chars() {
        match c {
            'a'..='z' | 'A'..='Z' => prev_was_letter = true,
            '-' if prev_was_letter => prev_was_letter = false,
            _ => return false,
        }
    }
    // Must end on a letter; also rejects the empty string.
    prev_was_letter
}

/// Slice the sentence around byte `offset` in `text`: scan backward to
/// the previous terminator (exclusive), forward to the next one
/// (inclusive), then trim.
fn sentence_around(text: &str, offset: usize) -> String {
    let mut offset = offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }

    let start = text[..offset]
        .char_indices()
        .rev()
        .find(|(_, c)| TERMINATORS.contains(c))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);

    let end = text[offset..]
        .char_indices()
        .find(|(_, c)| TERMINATORS.contains(c))
        // Include the terminator itself.
        .map(|(i, c)| offset + i + c.len_utf8())
        .unwrap_or(text.len());

    text[start..end].trim().to_string()
}
