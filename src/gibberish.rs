//! Gibberish candidates at three granularities: single sentences, adjacent
//! sentence pairs and whole paragraphs.

use crate::config::GibberishConfig;
use crate::error::Result;
use crate::segmenter::{locate_units, Unit};
use crate::span::{self, Span};
use crate::{CandidateKind, GibbCandidate, GibbScores};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Walks `units` in order and emits candidates over `original`.
///
/// Newline runs pass through as literal placeholders. Every other unit
/// yields its own sentence candidate, followed either by a pair candidate
/// with the next unit or, when the paragraph ends here, by a candidate
/// covering the whole paragraph. Identical `(index, length)` ranges are
/// emitted once.
pub fn build_candidates(original: &str, units: &[Unit]) -> Vec<GibbCandidate> {
    let located = locate_units(original, units);
    let mut candidates = Vec::new();
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut paragraph_start: Option<usize> = None;

    let mut emit = |candidates: &mut Vec<GibbCandidate>, index: usize, length: usize, kind| {
        if length > 0 && seen.insert((index, length)) {
            candidates.push(GibbCandidate::new(index, length, kind));
        }
    };

    for (i, current) in located.iter().enumerate() {
        if current.unit.whitespace_literal {
            candidates.push(GibbCandidate::literal());
            continue;
        }
        let Some(this) = current.span else {
            continue;
        };

        emit(&mut candidates, this.index, this.length, CandidateKind::Sentence);
        let start = *paragraph_start.get_or_insert(this.index);

        match located.get(i + 1) {
            Some(next) if !next.unit.whitespace_literal => {
                if let Some(next_span) = next.span {
                    emit(
                        &mut candidates,
                        this.index,
                        next_span.end() - this.index,
                        CandidateKind::Pair,
                    );
                }
            }
            _ => {
                emit(&mut candidates, start, this.end() - start, CandidateKind::Paragraph);
                paragraph_start = None;
            }
        }
    }

    debug!("Built {} gibberish candidates", candidates.len());
    candidates
}

/// Texts to send to the classifier, paired with the candidate they belong
/// to. Literal placeholders and unreadable spans are left out.
pub fn candidate_texts(original: &str, candidates: &[GibbCandidate]) -> Vec<(usize, String)> {
    candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_literal())
        .filter_map(|(i, c)| match span::substring(original, c.index, c.length) {
            Ok(text) => Some((i, text.to_string())),
            Err(e) => {
                warn!("Skipping gibberish candidate: {}", e);
                None
            }
        })
        .collect()
}

/// Fills in classifier scores, sending at most `max_batch` texts per call.
/// Candidates the classifier does not answer for keep clean scores.
pub fn score_candidates<F>(
    original: &str,
    candidates: &mut [GibbCandidate],
    max_batch: usize,
    mut score: F,
) -> Result<()>
where
    F: FnMut(Vec<String>) -> Result<Vec<GibbScores>>,
{
    let pending = candidate_texts(original, candidates);

    for chunk in pending.chunks(max_batch.max(1)) {
        let texts = chunk.iter().map(|(_, text)| text.clone()).collect();
        let scores = score(texts)?;
        if scores.len() != chunk.len() {
            warn!(
                "Classifier returned {} scores for {} texts",
                scores.len(),
                chunk.len()
            );
        }
        for ((slot, _), scores) in chunk.iter().zip(scores) {
            candidates[*slot].scores = scores;
        }
    }
    Ok(())
}

/// Ratio of one-letter words to longer words, after trimming non-letters.
/// With no longer words the single-letter count itself is returned.
pub fn single_letter_ratio(text: &str) -> f64 {
    let (mut single, mut multi) = (0usize, 0usize);
    for word in text.split_whitespace() {
        match word.trim_matches(|c: char| !c.is_alphabetic()).chars().count() {
            0 => {}
            1 => single += 1,
            _ => multi += 1,
        }
    }

    if multi == 0 {
        single as f64
    } else {
        single as f64 / multi as f64
    }
}

pub fn scores_flag_gibberish(scores: &GibbScores, config: &GibberishConfig) -> bool {
    scores.clean < config.clean_threshold
        && (scores.mild > config.mild_threshold
            || scores.noise > config.noise_threshold
            || scores.word_salad > config.salad_threshold)
}

/// Keeps the candidates judged gibberish, in their original order.
pub fn classify(
    original: &str,
    candidates: Vec<GibbCandidate>,
    config: &GibberishConfig,
) -> Vec<GibbCandidate> {
    candidates
        .into_iter()
        .filter(|c| !c.is_literal())
        .filter(|c| {
            if scores_flag_gibberish(&c.scores, config) {
                return true;
            }
            match span::substring(original, c.index, c.length) {
                Ok(text) => single_letter_ratio(text) > config.single_letter_ratio,
                Err(e) => {
                    warn!("Gibberish ratio check skipped: {}", e);
                    false
                }
            }
        })
        .collect()
}

/// Removes every candidate that overlaps `span`.
pub fn drop_intersecting(candidates: &mut Vec<GibbCandidate>, span: Span) {
    candidates.retain(|c| !c.span().intersects(&span));
}
