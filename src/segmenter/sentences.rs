use lazy_static::lazy_static;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

lazy_static! {
    // Initialisms such as "U.S." or "e.g."
    static ref INITIALISM: Regex = Regex::new(r"^(?:[A-Za-z]\.){2,}$").unwrap();
}

const ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "prof.", "sr.", "jr.", "st.", "vs.", "etc.", "no.", "fig.",
];

/// Splits a newline-free run of text into sentences.
pub trait SentenceSplitter: Send + Sync {
    /// Returns trimmed sentences in order. Entries may be empty.
    fn split(&self, text: &str) -> Vec<String>;
}

/// UAX #29 sentence boundaries, re-joined across abbreviations.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeSentenceSplitter;

impl SentenceSplitter for UnicodeSentenceSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut pending = String::new();

        for piece in text.split_sentence_bounds() {
            pending.push_str(piece);
            if ends_with_abbreviation(&pending) {
                continue;
            }
            sentences.push(pending.trim().to_string());
            pending.clear();
        }

        if !pending.trim().is_empty() {
            sentences.push(pending.trim().to_string());
        }

        sentences
    }
}

fn ends_with_abbreviation(sentence: &str) -> bool {
    sentence
        .split_whitespace()
        .last()
        .map(|word| {
            INITIALISM.is_match(word) || ABBREVIATIONS.contains(&word.to_lowercase().as_str())
        })
        .unwrap_or(false)
}
