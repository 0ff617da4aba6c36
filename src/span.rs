//! Rune-offset span helpers shared by every stage that produces or consumes
//! markups. All offsets count `char`s, never bytes.

use crate::error::{GecError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub index: usize,
    pub length: usize,
}

impl Span {
    pub fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }

    pub fn end(&self) -> usize {
        self.index + self.length
    }

    /// Half-open overlap test.
    pub fn intersects(&self, other: &Span) -> bool {
        self.index < other.end() && other.index < self.end()
    }
}

pub fn intersects(a: Span, b: Span) -> bool {
    a.intersects(&b)
}

pub fn rune_len(text: &str) -> usize {
    text.chars().count()
}

/// Returns the runes `[index, index + length)` of `text`.
///
/// A span of length 1 anchored exactly at the end of the text is allowed and
/// yields an empty string.
pub fn substring(text: &str, index: usize, length: usize) -> Result<&str> {
    let len = rune_len(text);
    if index == len && length == 1 {
        return Ok("");
    }
    if length == 0 || index + length > len {
        return Err(GecError::OutOfBounds { index, length, len });
    }

    let start = byte_offset(text, index);
    let end = byte_offset(text, index + length);
    Ok(&text[start..end])
}

/// Byte offset of the rune at `rune_index`, or `text.len()` past the end.
pub fn byte_offset(text: &str, rune_index: usize) -> usize {
    text.char_indices()
        .nth(rune_index)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Leading and trailing whitespace runs of `text`. A string that is entirely
/// whitespace reports it all as leading.
pub fn whitespace_around(text: &str) -> (&str, &str) {
    let trimmed_start = text.trim_start();
    let leading = &text[..text.len() - trimmed_start.len()];
    let trimmed = trimmed_start.trim_end();
    let trailing = &trimmed_start[trimmed.len()..];
    (leading, trailing)
}

/// Re-pads `corrected` with the exact leading/trailing whitespace of
/// `original`.
pub fn repad(original: &str, corrected: &str) -> String {
    let (leading, trailing) = whitespace_around(original);
    format!("{}{}{}", leading, corrected.trim(), trailing)
}

/// True when `ignore` is off and the new range overlaps any existing one.
pub fn collision<I>(existing: I, candidate: Span, ignore: bool) -> bool
where
    I: IntoIterator<Item = Span>,
{
    if ignore {
        return false;
    }
    existing.into_iter().any(|span| span.intersects(&candidate))
}

/// Rune index of the first occurrence of `needle` in `haystack` starting at
/// or after rune `from`.
pub fn find_rune_index(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let start = byte_offset(haystack, from);
    if start > haystack.len() {
        return None;
    }
    haystack[start..]
        .find(needle)
        .map(|byte| from + rune_len(&haystack[start..start + byte]))
}

/// Case-insensitive variant of [`find_rune_index`]. Compares rune by rune
/// so the reported position and length stay in the haystack's rune space.
pub fn find_rune_index_ignore_case(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay: Vec<char> = haystack.chars().collect();
    let pat: Vec<char> = needle.chars().collect();
    if pat.is_empty() {
        return (from <= hay.len()).then_some(from);
    }
    if pat.len() > hay.len() {
        return None;
    }

    (from..=hay.len() - pat.len()).find(|&start| {
        hay[start..start + pat.len()]
            .iter()
            .zip(&pat)
            .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()))
    })
}
