pub mod dictionary;
pub mod profanity;
pub mod suggestions;

use crate::config::SpellingConfig;
use crate::error::{GecError, Result};
use crate::span::{self, Span};
use crate::{Misspell, MisspellKind};
use dictionary::Dictionary;
use lazy_static::lazy_static;
use profanity::ProfanityFilter;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use suggestions::Suggester;
use tracing::{debug, warn};

lazy_static! {
    static ref EMOJI: Regex = Regex::new(r"[\p{So}\p{Sk}]").unwrap();
    // Custom dictionary entries: letters, spaces and hyphens only.
    static ref CUSTOM_ENTRY: Regex = Regex::new(r"^[a-zA-Z- ]+$").unwrap();
}

const TRIMMED: &[char] = &[
    '*', '.', ',', '!', '?', '"', '\'', '(', ')', '[', ']', '{', '}', ':', ';', '#', '&', '+', '-',
    '/', '=', '$', '%', '<', '>', '@', '_', '|', '~',
];

const REJECTED: &[char] = &[
    '\\', '"', '-', '.', '=', '\'', '`', '?', '$', '\u{2019}', '\u{201c}', '\u{2018}', '\u{2013}',
];

/// Produces spelling and profanity spans for a cleaned text.
pub struct SpellChecker {
    dictionary: Dictionary,
    personal_words: HashSet<String>,
    custom_words: HashSet<String>,
    ignore_patterns: Vec<Regex>,
    profanity: ProfanityFilter,
    suggester: Suggester,
    ignore_collisions: bool,
}

impl SpellChecker {
    pub fn new(config: &SpellingConfig) -> Result<Self> {
        let dictionary = Dictionary::load(&config.language)?;
        Self::with_dictionary(dictionary, config)
    }

    pub fn with_dictionary(dictionary: Dictionary, config: &SpellingConfig) -> Result<Self> {
        let personal_words = match &config.personal_dictionary {
            Some(path) if path.exists() => read_word_list(path, None)?,
            _ => HashSet::new(),
        };

        let custom_words = match &config.custom_words {
            Some(path) => read_word_list(path, Some(&*CUSTOM_ENTRY))?,
            None => HashSet::new(),
        };

        let mut ignore_patterns = Vec::new();
        for pattern in &config.ignore_patterns {
            match Regex::new(pattern) {
                Ok(re) => ignore_patterns.push(re),
                Err(e) => warn!("Invalid ignore pattern '{}': {}", pattern, e),
            }
        }

        let profanity = if config.profanity_lists.is_empty() {
            ProfanityFilter::empty()
        } else {
            ProfanityFilter::load(config.profanity_lists.as_slice())?
        };

        debug!(
            "Spell checker ready: {} dictionary words, {} personal, {} custom, {} profanity entries",
            dictionary.len(),
            personal_words.len(),
            custom_words.len(),
            profanity.len()
        );

        Ok(Self {
            dictionary,
            personal_words,
            custom_words,
            ignore_patterns,
            profanity,
            suggester: Suggester::new(config.max_suggestions),
            ignore_collisions: config.ignore_collisions,
        })
    }

    /// Profanity first, then symbols, then dictionary misses. A later span
    /// that overlaps an earlier one is dropped unless collisions are ignored.
    pub fn check(&self, text: &str) -> Vec<Misspell> {
        let mut found = Vec::new();
        self.profanity.scan(text, &mut found, self.ignore_collisions);
        mark_emojis(text, &mut found, self.ignore_collisions);
        self.scan_words(text, &mut found);
        found
    }

    fn scan_words(&self, text: &str, found: &mut Vec<Misspell>) {
        let mut cursor = 0;

        for field in text.split_whitespace() {
            let Some(index) = span::find_rune_index(text, field, cursor) else {
                continue;
            };
            cursor = index + span::rune_len(field);

            let Some(word) = clean_word(field) else {
                continue;
            };
            if self.is_known(word) || self.should_ignore(field, word) {
                continue;
            }

            // Only trimmed punctuation can precede the word inside the field.
            let prefix = field.find(word).unwrap_or(0);
            let candidate = Span::new(
                index + span::rune_len(&field[..prefix]),
                span::rune_len(word),
            );

            if span::collision(found.iter().map(Misspell::span), candidate, self.ignore_collisions) {
                continue;
            }
            found.push(Misspell {
                index: candidate.index,
                length: candidate.length,
                kind: MisspellKind::SpellingMistake,
                suggestions: self.suggester.suggest(word, &self.dictionary),
            });
        }
    }

    pub fn is_known(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        self.dictionary.contains(&lower)
            || self.personal_words.contains(&lower)
            || self.custom_words.contains(&lower)
    }

    fn should_ignore(&self, field: &str, word: &str) -> bool {
        if word.chars().count() <= 1 {
            return true;
        }

        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.is_match(word) || pattern.is_match(field))
    }
}

/// Strips surrounding punctuation and rejects words that cannot be checked:
/// anything left with quotes, dots, hyphens and similar marks, digits, or
/// characters outside ASCII.
pub fn clean_word(field: &str) -> Option<&str> {
    let word = field.trim_matches(TRIMMED).trim();
    if word.is_empty() {
        return None;
    }
    let rejected = word.chars().any(|c| {
        c.is_control() || REJECTED.contains(&c) || c.is_ascii_digit() || !c.is_ascii()
    });
    (!rejected).then_some(word)
}

/// Marks every symbol character (emoji, dingbats, modifier symbols) as a
/// spelling mistake with no suggestions.
pub fn mark_emojis(text: &str, found: &mut Vec<Misspell>, ignore_collisions: bool) {
    for m in EMOJI.find_iter(text) {
        let candidate = Span::new(span::rune_len(&text[..m.start()]), span::rune_len(m.as_str()));
        debug!("Symbol {:?} at rune {}", m.as_str(), candidate.index);

        if span::collision(found.iter().map(Misspell::span), candidate, ignore_collisions) {
            continue;
        }
        found.push(Misspell {
            index: candidate.index,
            length: candidate.length,
            kind: MisspellKind::SpellingMistake,
            suggestions: Vec::new(),
        });
    }
}

/// Lowercased entries of a one-per-line word list. Blank and `#` lines are
/// skipped, as are lines `filter` rejects.
fn read_word_list(path: &Path, filter: Option<&Regex>) -> Result<HashSet<String>> {
    let content = fs::read_to_string(path)
        .map_err(|e| GecError::Dictionary(format!("failed to read {}: {}", path.display(), e)))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| filter.map_or(true, |re| re.is_match(line)))
        .map(str::to_lowercase)
        .collect())
}
