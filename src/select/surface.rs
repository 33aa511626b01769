//! The reading-surface capability interface.
//!
//! Extraction never touches a real DOM. The renderer (whatever it is)
//! exposes two narrow capabilities: the text of the node a selection
//! anchors in, and the text of that node's enclosing block. Everything
//! else the extractor needs travels inside [`RawSelection`], so the
//! whole pipeline is testable against a plain in-memory fixture.

/// Opaque handle to a text node on the reading surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Bounding rectangle of the active selection range, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SelectionRect {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// A raw, unvalidated text selection as reported by the surface.
#[derive(Debug, Clone)]
pub struct RawSelection {
    /// True when nothing is actually highlighted.
    pub collapsed: bool,
    /// The selected text, verbatim.
    pub text: String,
    /// Node the selection anchors in.
    pub anchor_node: NodeId,
    /// Offset of the anchor within that node's text, in bytes.
    pub anchor_offset: usize,
    /// Bounding rect of the active range.
    pub rect: SelectionRect,
}

/// What the extractor is allowed to ask the rendering surface.
pub trait TextSurface {
    /// Full text content of a node, or `None` if the node has none.
    fn node_text(&self, node: NodeId) -> Option<&str>;

    /// Trimmed text of the nearest paragraph-level block enclosing
    /// `node`, or `None` when no block ancestor exists.
    fn block_text(&self, node: NodeId) -> Option<String>;
}

/// Byte span of the word under `offset` in `text`, for long-press
/// word location: expand left and right while characters match
/// `[a-zA-Z-]`. Returns `None` when the character at the point is not
/// word-like. The scan is deliberately looser than the candidate
/// pattern (it admits `--`); the span only seeds a selection that the
/// extractor re-validates.
pub fn word_span_at(text: &str, offset: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    if offset >= bytes.len() || !is_word_byte(bytes[offset]) {
        return None;
    }
    let mut start = offset;
    while start > 0 && is_word_byte(bytes[start - 1]) {
        start -= 1;
    }
    let mut end = offset + 1;
    while end < bytes.len() && is_word_byte(bytes[end]) {
        end += 1;
    }
    Some((start, end))
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'-'
}
