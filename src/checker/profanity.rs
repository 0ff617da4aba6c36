use crate::error::{GecError, Result};
use crate::span::{self, Span};
use crate::{Misspell, MisspellKind};
use aho_corasick::{AhoCorasick, MatchKind};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Case-insensitive whole-word matcher over one or more offensive-word lists.
pub struct ProfanityFilter {
    matcher: Option<AhoCorasick>,
    words: usize,
}

impl ProfanityFilter {
    pub fn empty() -> Self {
        Self {
            matcher: None,
            words: 0,
        }
    }

    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty() && !w.starts_with('#'))
            .collect();
        patterns.sort();
        patterns.dedup();

        if patterns.is_empty() {
            return Ok(Self::empty());
        }

        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| GecError::Dictionary(format!("failed to build profanity matcher: {}", e)))?;

        Ok(Self {
            matcher: Some(matcher),
            words: patterns.len(),
        })
    }

    /// Reads one word or phrase per line from every file in `paths`.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut words = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let content = fs::read_to_string(path).map_err(|e| {
                GecError::Dictionary(format!("failed to read {}: {}", path.display(), e))
            })?;
            words.extend(content.lines().map(str::to_string));
        }

        let filter = Self::from_words(words)?;
        debug!("Loaded {} profanity entries", filter.len());
        Ok(filter)
    }

    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Appends a `Profanity` misspelling for every whole-word match in
    /// `text`, skipping matches that collide with spans already in `found`.
    pub fn scan(&self, text: &str, found: &mut Vec<Misspell>, ignore_collisions: bool) {
        let Some(matcher) = &self.matcher else {
            return;
        };

        let folded = Folded::new(text);
        let mut rune_cursor = 0;
        let mut byte_cursor = 0;
        for m in matcher.find_iter(&folded.text) {
            let Some((start, end)) = folded.original_range(m.start(), m.end()) else {
                continue;
            };
            if !standalone(text, start, end) {
                continue;
            }

            rune_cursor += span::rune_len(&text[byte_cursor..start]);
            byte_cursor = start;
            let candidate = Span::new(rune_cursor, span::rune_len(&text[start..end]));

            if span::collision(found.iter().map(Misspell::span), candidate, ignore_collisions) {
                continue;
            }
            found.push(Misspell {
                index: candidate.index,
                length: candidate.length,
                kind: MisspellKind::Profanity,
                suggestions: Vec::new(),
            });
        }
    }
}

/// Lowercased copy of a text that remembers where each byte came from.
struct Folded {
    text: String,
    /// Original byte offset of the char each folded byte belongs to, plus
    /// one trailing entry for the end of the text.
    origin: Vec<usize>,
}

impl Folded {
    fn new(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut origin = Vec::with_capacity(text.len() + 1);
        for (offset, ch) in text.char_indices() {
            let before = folded.len();
            folded.extend(ch.to_lowercase());
            origin.resize(origin.len() + folded.len() - before, offset);
        }
        origin.push(text.len());
        Self {
            text: folded,
            origin,
        }
    }

    fn starts_char(&self, at: usize) -> bool {
        at == 0 || self.origin[at - 1] != self.origin[at]
    }

    /// Maps a folded byte range back onto the original text. Ranges that
    /// begin or end inside one char's expansion have no counterpart.
    fn original_range(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        if !self.starts_char(start) || !self.starts_char(end) {
            return None;
        }
        Some((self.origin[start], self.origin[end]))
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// True when the byte range `start..end` is not glued to a neighbouring word.
fn standalone(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back().is_some_and(is_word_char);
    let after = text[end..].chars().next().is_some_and(is_word_char);
    !before && !after
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn spans(found: &[Misspell]) -> Vec<(usize, usize)> {
        found.iter().map(|m| (m.index, m.length)).collect()
    }

    #[test]
    fn test_whole_words_only() {
        let filter = ProfanityFilter::from_words(["darn", "heck"]).unwrap();
        let mut found = Vec::new();
        filter.scan("Darn it, what the heck. Darning socks.", &mut found, false);
        assert_eq!(spans(&found), vec![(0, 4), (18, 4)]);
        assert!(found.iter().all(|m| m.kind == MisspellKind::Profanity));
    }

    #[test]
    fn test_rune_offsets() {
        let filter = ProfanityFilter::from_words(["darn"]).unwrap();
        let mut found = Vec::new();
        filter.scan("😀 café darn", &mut found, false);
        assert_eq!(spans(&found), vec![(7, 4)]);
    }

    #[test]
    fn test_non_ascii_entries_match_any_case() {
        let filter = ProfanityFilter::from_words(["ÄRGER"]).unwrap();
        let mut found = Vec::new();
        filter.scan("Ärger und ÄRGER und ärger", &mut found, false);
        assert_eq!(spans(&found), vec![(0, 5), (10, 5), (20, 5)]);
    }

    #[test]
    fn test_expanding_lowercase_keeps_offsets() {
        // 'İ' lowercases to two chars, which shifts every later byte.
        let filter = ProfanityFilter::from_words(["darn"]).unwrap();
        let mut found = Vec::new();
        filter.scan("İİ DARN", &mut found, false);
        assert_eq!(spans(&found), vec![(3, 4)]);
    }

    #[test]
    fn test_phrases_and_collisions() {
        let filter = ProfanityFilter::from_words(["bad word"]).unwrap();
        let mut found = vec![Misspell {
            index: 4,
            length: 3,
            kind: MisspellKind::SpellingMistake,
            suggestions: vec![],
        }];
        filter.scan("one bad word", &mut found, false);
        assert_eq!(found.len(), 1);

        filter.scan("one bad word", &mut found, true);
        assert_eq!(spans(&found), vec![(4, 3), (4, 8)]);
    }

    #[test]
    fn test_load_skips_comments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, "# list\nDarn\n\nheck\n").unwrap();
        let filter = ProfanityFilter::load(&[&path]).unwrap();
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn test_empty_filter_finds_nothing() {
        let mut found = Vec::new();
        ProfanityFilter::empty().scan("anything", &mut found, false);
        assert!(found.is_empty());
    }
}
