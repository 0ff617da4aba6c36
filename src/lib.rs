pub mod api;
pub mod checker;
pub mod cli;
pub mod config;
pub mod diff;
pub mod dict;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod gibberish;
pub mod pipeline;
pub mod reconcile;
pub mod segmenter;
pub mod span;

pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{GecError, Result};
pub use pipeline::Corrector;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Grammar,
    Spelling,
    Profanity,
    Gibberish,
}

/// An annotation over the original text. `index` and `length` count Unicode
/// scalar values, never bytes, and always address the cleaned input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markup {
    pub index: usize,
    pub length: usize,
    pub message: String,
    pub category: Category,
}

impl Markup {
    pub fn new(index: usize, length: usize, message: impl Into<String>, category: Category) -> Self {
        Self {
            index,
            length,
            message: message.into(),
            category,
        }
    }

    pub fn span(&self) -> span::Span {
        span::Span::new(self.index, self.length)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MisspellKind {
    SpellingMistake,
    Profanity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Misspell {
    pub index: usize,
    pub length: usize,
    pub kind: MisspellKind,
    pub suggestions: Vec<String>,
}

impl Misspell {
    pub fn span(&self) -> span::Span {
        span::Span::new(self.index, self.length)
    }
}

/// Class probabilities reported by a gibberish classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GibbScores {
    pub clean: f32,
    pub mild: f32,
    pub noise: f32,
    #[serde(rename = "wordSalad")]
    pub word_salad: f32,
}

impl Default for GibbScores {
    fn default() -> Self {
        Self {
            clean: 1.0,
            mild: 0.0,
            noise: 0.0,
            word_salad: 0.0,
        }
    }
}

impl From<[f32; 4]> for GibbScores {
    fn from(probs: [f32; 4]) -> Self {
        Self {
            clean: probs[0],
            mild: probs[1],
            noise: probs[2],
            word_salad: probs[3],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    /// Placeholder for a newline run; never scored, never emitted.
    WhitespaceLiteral,
    Sentence,
    Pair,
    Paragraph,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GibbCandidate {
    pub index: usize,
    pub length: usize,
    pub kind: CandidateKind,
    pub scores: GibbScores,
}

impl GibbCandidate {
    pub fn literal() -> Self {
        Self {
            index: 0,
            length: 0,
            kind: CandidateKind::WhitespaceLiteral,
            scores: GibbScores::default(),
        }
    }

    pub fn new(index: usize, length: usize, kind: CandidateKind) -> Self {
        Self {
            index,
            length,
            kind,
            scores: GibbScores::default(),
        }
    }

    pub fn is_literal(&self) -> bool {
        self.kind == CandidateKind::WhitespaceLiteral
    }

    pub fn span(&self) -> span::Span {
        span::Span::new(self.index, self.length)
    }
}

/// Final result of one markup request, serialized as the `/api/gec` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GecResponse {
    pub corrected_text: String,
    pub text_markups: Vec<Markup>,
    pub character_count: usize,
    pub error_character_count: usize,
    pub contains_profanity: bool,
    pub service_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        let json = serde_json::to_string(&Category::Gibberish).unwrap();
        assert_eq!(json, "\"GIBBERISH\"");
        let parsed: Category = serde_json::from_str("\"SPELLING\"").unwrap();
        assert_eq!(parsed, Category::Spelling);
    }

    #[test]
    fn test_scores_from_probabilities() {
        let scores = GibbScores::from([0.1, 0.2, 0.3, 0.4]);
        assert_eq!(scores.word_salad, 0.4);
        let json = serde_json::to_value(scores).unwrap();
        assert!(json.get("wordSalad").is_some());
    }

    #[test]
    fn test_literal_candidate() {
        assert!(GibbCandidate::literal().is_literal());
        assert!(!GibbCandidate::new(0, 3, CandidateKind::Sentence).is_literal());
    }
}
