//! Content hashing for article deduplication.
//!
//! A classic base-31 polynomial rolling hash over UTF-16 code units,
//! truncated to a signed 32-bit integer. Two pasted texts with equal
//! hashes are treated as the same article; collisions are an accepted
//! limitation of the dedup scheme, not a defended-against condition.

/// Hash `text` into a signed 32-bit value.
///
/// Per code unit `c`: `h = h*31 + c` in wrapping 32-bit arithmetic,
/// implemented as `(h << 5) - h + c`. The empty string hashes to 0.
/// Iterates UTF-16 code units so non-ASCII text contributes the same
/// values a JS `charCodeAt` loop would produce.
pub fn content_hash(text: &str) -> i32 {
    let mut h: i32 = 0;
    for c in text.encode_utf16() {
        h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(c as i32);
    }
    h
}

/// Hex rendering of a content hash, used as the dedup key for
/// articles that have no source URL.
pub fn content_key(text: &str) -> String {
    format!("{:x}", content_hash(text))
}
