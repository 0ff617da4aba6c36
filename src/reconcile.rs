//! Merges grammar edits, misspellings and gibberish candidates into one
//! sorted markup list over the original text.
//!
//! Priority is grammar, then spelling/profanity, then gibberish: a gibberish
//! candidate that overlaps an accepted span of a higher tier is discarded.
//! Among gibberish candidates the earlier one in the list wins, which favors
//! sentences and pairs over the paragraphs that enclose them.
//!
//! Gibberish is filtered against every accepted span even when the checker
//! keeps colliding misspellings (`ignore_collisions`); that flag only governs
//! spelling and profanity spans among themselves.

use crate::config::GibberishConfig;
use crate::gibberish::{classify, drop_intersecting};
use crate::span::{self, rune_len};
use crate::{Category, GibbCandidate, Markup, Misspell, MisspellKind};
use tracing::{debug, warn};

pub const SPELLING_MESSAGE: &str = "Possible spelling mistake found.";
pub const PROFANITY_MESSAGE: &str = "This word is considered offensive";
pub const GIBBERISH_MESSAGE: &str = "Text is unclear.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    pub markups: Vec<Markup>,
    /// Sum of the lengths of every grammar and misspelling span examined,
    /// including spans that were later dropped.
    pub error_char_count: usize,
    pub profane_words: Vec<String>,
}

impl Reconciled {
    pub fn contains_profanity(&self) -> bool {
        !self.profane_words.is_empty()
    }
}

pub fn reconcile(
    original: &str,
    diff_spans: Vec<Markup>,
    misspells: &[Misspell],
    candidates: Vec<GibbCandidate>,
    config: &GibberishConfig,
) -> Reconciled {
    let text_len = rune_len(original);
    let mut gibberish = classify(original, candidates, config);
    let mut out = Reconciled::default();

    for markup in diff_spans {
        out.error_char_count += markup.length;

        let substr = match span::substring(original, markup.index, markup.length) {
            Ok(s) => s,
            Err(e) => {
                warn!("Dropping {:?} markup: {}", markup.category, e);
                continue;
            }
        };
        if substr.trim_matches(|c: char| c == '\r' || c == '\n').is_empty() {
            continue;
        }

        drop_intersecting(&mut gibberish, markup.span());
        out.markups.push(markup);
    }

    for miss in misspells {
        out.error_char_count += miss.length;

        let substr = match span::substring(original, miss.index, miss.length) {
            Ok(s) => s,
            Err(e) => {
                warn!("Dropping {:?} span: {}", miss.kind, e);
                continue;
            }
        };
        if substr.trim().is_empty() {
            continue;
        }

        drop_intersecting(&mut gibberish, miss.span());
        match miss.kind {
            MisspellKind::SpellingMistake => out.markups.push(Markup::new(
                miss.index,
                miss.length,
                SPELLING_MESSAGE,
                Category::Spelling,
            )),
            MisspellKind::Profanity => {
                out.markups.push(Markup::new(
                    miss.index,
                    miss.length,
                    PROFANITY_MESSAGE,
                    Category::Profanity,
                ));
                out.profane_words.push(substr.to_string());
            }
        }
    }

    while !gibberish.is_empty() {
        let head = gibberish.remove(0);
        drop_intersecting(&mut gibberish, head.span());

        if head.length == 0 || head.index + head.length > text_len {
            warn!(
                "Gibberish candidate ({}, {}) indexes beyond the original text ({} runes)",
                head.index, head.length, text_len
            );
            continue;
        }
        debug!("Gibberish {:?} at ({}, {})", head.kind, head.index, head.length);
        out.markups.push(Markup::new(
            head.index,
            head.length,
            GIBBERISH_MESSAGE,
            Category::Gibberish,
        ));
    }

    out.markups.sort_by_key(|m| m.index);

    if out.error_char_count > 0 && out.markups.is_empty() {
        warn!(
            "{} error characters counted but no markups survived",
            out.error_char_count
        );
    }
    out
}
