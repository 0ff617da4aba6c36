//! Maps a corrected text back onto the original as GRAMMAR markups.
//!
//! Both texts are split on Unicode word boundaries and aligned with Myers'
//! algorithm. Every non-equal region becomes one span over the original's
//! tokens; insertions are anchored on the nearest word before them (or after
//! them when nothing precedes).

use crate::error::{GecError, Result};
use crate::span::Span;
use crate::{Category, Markup, Misspell};
use similar::{capture_diff_slices, Algorithm, DiffTag};
use unicode_segmentation::UnicodeSegmentation;

const EXTRA_SPACE: &str = "Remove the extra space.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token<'a> {
    text: &'a str,
    index: usize,
    length: usize,
}

impl Token<'_> {
    fn is_space(&self) -> bool {
        self.text.trim().is_empty()
    }
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut offset = 0;
    text.split_word_bounds()
        .map(|piece| {
            let length = piece.chars().count();
            let token = Token {
                text: piece,
                index: offset,
                length,
            };
            offset += length;
            token
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
struct Edit {
    span: Span,
    message: String,
}

/// Returns GRAMMAR markups over `original`, sorted by index, skipping any
/// that overlap a span in `known`.
pub fn diff(original: &str, corrected: &str, known: &[Misspell]) -> Result<Vec<Markup>> {
    if original.trim().is_empty() {
        return Err(GecError::Diff("original text is empty".into()));
    }
    if corrected.trim().is_empty() {
        return Err(GecError::Diff("corrected text is empty".into()));
    }

    let old = tokenize(original);
    let new = tokenize(corrected);
    let old_words: Vec<&str> = old.iter().map(|t| t.text).collect();
    let new_words: Vec<&str> = new.iter().map(|t| t.text).collect();

    let mut edits = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, &old_words, &new_words) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let replacement: String = new_words[new_range.clone()].concat();
        let replacement = replacement.trim();
        let removed = &old[old_range.clone()];
        let added = &new[new_range];

        let edit = match tag {
            DiffTag::Equal => None,
            DiffTag::Delete => covering(removed).map(|span| Edit {
                span,
                message: removal_message(removed),
            }),
            DiffTag::Replace if replacement.is_empty() && !narrows(removed, added) => None,
            DiffTag::Replace => covering(removed).map(|span| Edit {
                span,
                message: if replacement.is_empty() {
                    removal_message(removed)
                } else {
                    format!("Replace with \"{}\".", replacement)
                },
            }),
            DiffTag::Insert if replacement.is_empty() => None,
            DiffTag::Insert => anchor(&old, old_range.start).map(|span| Edit {
                span,
                message: format!("Add \"{}\".", replacement),
            }),
        };
        edits.extend(edit);
    }

    let markups = merge(edits)
        .into_iter()
        .filter(|edit| !known.iter().any(|m| m.span().intersects(&edit.span)))
        .map(|edit| Markup::new(edit.span.index, edit.span.length, edit.message, Category::Grammar))
        .collect();

    Ok(markups)
}

fn joined(tokens: &[Token<'_>]) -> String {
    tokens.iter().map(|t| t.text).collect()
}

fn removal_message(tokens: &[Token<'_>]) -> String {
    let removed = joined(tokens);
    let removed = removed.trim();
    if removed.is_empty() {
        EXTRA_SPACE.to_string()
    } else {
        format!("Remove \"{}\".", removed)
    }
}

/// False when whitespace is swapped for at least as much whitespace.
fn narrows(old: &[Token<'_>], new: &[Token<'_>]) -> bool {
    if !old.iter().all(Token::is_space) {
        return true;
    }
    let width = |tokens: &[Token<'_>]| tokens.iter().map(|t| t.length).sum::<usize>();
    width(new) < width(old)
}

/// Span over `tokens` with surrounding whitespace tokens dropped, unless the
/// run is whitespace only.
fn covering(tokens: &[Token<'_>]) -> Option<Span> {
    let first = tokens.first()?;
    let last = tokens.last()?;
    let start = tokens.iter().find(|t| !t.is_space()).unwrap_or(first);
    let end = tokens.iter().rev().find(|t| !t.is_space()).unwrap_or(last);
    Some(Span::new(start.index, end.index + end.length - start.index))
}

fn anchor(old: &[Token<'_>], at: usize) -> Option<Span> {
    old[..at]
        .iter()
        .rev()
        .chain(old[at..].iter())
        .find(|t| !t.is_space())
        .map(|t| Span::new(t.index, t.length))
}

/// Folds overlapping edits together, keeping both messages.
fn merge(mut edits: Vec<Edit>) -> Vec<Edit> {
    edits.sort_by_key(|e| e.span.index);
    let mut merged: Vec<Edit> = Vec::with_capacity(edits.len());

    for edit in edits {
        match merged.last_mut() {
            Some(prev) if prev.span.intersects(&edit.span) => {
                let end = prev.span.end().max(edit.span.end());
                prev.span.length = end - prev.span.index;
                prev.message = format!("{} {}", prev.message, edit.message);
            }
            _ => merged.push(edit),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::substring;
    use crate::MisspellKind;

    fn misspell(index: usize, length: usize) -> Misspell {
        Misspell {
            index,
            length,
            kind: MisspellKind::SpellingMistake,
            suggestions: vec![],
        }
    }

    #[test]
    fn test_identical_texts_have_no_markups() {
        assert!(diff("The cat sat.", "The cat sat.", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_replaced_word() {
        let markups = diff("I has a cat.", "I have a cat.", &[]).unwrap();
        assert_eq!(markups.len(), 1);
        assert_eq!((markups[0].index, markups[0].length), (2, 3));
        assert_eq!(markups[0].message, "Replace with \"have\".");
        assert_eq!(markups[0].category, Category::Grammar);
    }

    #[test]
    fn test_removed_word() {
        let original = "the the cat";
        let markups = diff(original, "the cat", &[]).unwrap();
        assert_eq!(markups.len(), 1);
        let m = &markups[0];
        assert_eq!(substring(original, m.index, m.length).unwrap(), "the");
        assert_eq!(m.message, "Remove \"the\".");
    }

    #[test]
    fn test_whitespace_only_edits() {
        let markups = diff("The  cat sat.", "The cat sat.", &[]).unwrap();
        assert_eq!(markups.len(), 1);
        assert_eq!((markups[0].index, markups[0].length), (3, 2));
        assert_eq!(markups[0].message, "Remove the extra space.");

        assert!(diff("The cat sat.", "The  cat sat.", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_inserted_word_anchors_on_previous_word() {
        let markups = diff("He go home.", "He will go home.", &[]).unwrap();
        assert_eq!(markups.len(), 1);
        assert_eq!((markups[0].index, markups[0].length), (0, 2));
        assert_eq!(markups[0].message, "Add \"will\".");
    }

    #[test]
    fn test_known_misspelling_not_marked_twice() {
        let markups = diff("Teh cat sat.", "The cat sat.", &[misspell(0, 3)]).unwrap();
        assert!(markups.is_empty());
    }

    #[test]
    fn test_offsets_count_runes() {
        let original = "😀 café is nice";
        let markups = diff(original, "😀 café was nice", &[]).unwrap();
        assert_eq!(markups.len(), 1);
        assert_eq!(markups[0].index, 7);
        assert_eq!(substring(original, 7, markups[0].length).unwrap(), "is");
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(matches!(diff("  ", "x", &[]), Err(GecError::Diff(_))));
        assert!(matches!(diff("x", "\n", &[]), Err(GecError::Diff(_))));
    }

    #[test]
    fn test_merge_overlapping_edits() {
        let merged = merge(vec![
            Edit {
                span: Span::new(4, 3),
                message: "b".into(),
            },
            Edit {
                span: Span::new(0, 5),
                message: "a".into(),
            },
            Edit {
                span: Span::new(9, 1),
                message: "c".into(),
            },
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].span, Span::new(0, 7));
        assert_eq!(merged[0].message, "a b");
        assert_eq!(merged[1].span, Span::new(9, 1));
    }
}
