pub mod clean;
pub mod prompt;
pub mod sentences;

pub use clean::clean_text;
pub use sentences::{SentenceSplitter, UnicodeSentenceSplitter};

use crate::span::{self, Span};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

lazy_static! {
    static ref NEWLINE_RUN: Regex = Regex::new(r"\s*\n+\s*").unwrap();
}

/// One piece of segmented input: a sentence, or a whitespace run that holds
/// at least one newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub text: String,
    pub whitespace_literal: bool,
}

impl Unit {
    pub fn sentence(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            whitespace_literal: false,
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            whitespace_literal: true,
        }
    }
}

/// A unit together with where it sits in the original text. `span` is `None`
/// when the unit could not be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedUnit {
    pub unit: Unit,
    pub span: Option<Span>,
}

/// Splits `text` into sentences and newline runs. The text is cleaned first;
/// callers that need offsets must locate units in the cleaned text.
pub fn segment(text: &str, splitter: &dyn SentenceSplitter) -> Vec<Unit> {
    let text = clean_text(text);
    let mut units = Vec::new();
    let mut last = 0;

    for run in NEWLINE_RUN.find_iter(&text) {
        if last < run.start() {
            push_sentences(&mut units, &text[last..run.start()], splitter);
        }

        // Only the part before the first newline loses its spaces.
        let mut lines: Vec<&str> = run.as_str().split('\n').collect();
        lines[0] = lines[0].trim();
        units.push(Unit::literal(lines.join("\n")));
        last = run.end();
    }
    if last < text.len() {
        push_sentences(&mut units, &text[last..], splitter);
    }

    for unit in units.iter_mut().filter(|u| !u.whitespace_literal) {
        unit.text = prompt::normalize_prompt(&unit.text);
    }

    units
}

fn push_sentences(units: &mut Vec<Unit>, chunk: &str, splitter: &dyn SentenceSplitter) {
    units.extend(
        splitter
            .split(chunk)
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(Unit::sentence),
    );
}

/// Finds each unit in `original`, scanning forward from the end of the
/// previous match. Falls back to a case-insensitive search for units whose
/// prompt keyword was re-cased.
pub fn locate_units(original: &str, units: &[Unit]) -> Vec<LocatedUnit> {
    let mut cursor = 0;
    units
        .iter()
        .map(|unit| {
            let len = span::rune_len(&unit.text);
            let found = span::find_rune_index(original, &unit.text, cursor)
                .or_else(|| span::find_rune_index_ignore_case(original, &unit.text, cursor));

            let located = match found {
                Some(index) if len > 0 => {
                    cursor = index + len;
                    Some(Span::new(index, len))
                }
                _ => {
                    warn!("Unit {:?} not found in original text after rune {}", unit.text, cursor);
                    None
                }
            };

            LocatedUnit {
                unit: unit.clone(),
                span: located,
            }
        })
        .collect()
}
