use crate::checker::SpellChecker;
use crate::config::Config;
use crate::diff::diff;
use crate::dispatch::Dispatcher;
use crate::engine::{self, EngineFactory};
use crate::error::{GecError, Result};
use crate::gibberish::{build_candidates, score_candidates};
use crate::reconcile::reconcile;
use crate::segmenter::{self, clean_text, SentenceSplitter, Unit, UnicodeSentenceSplitter};
use crate::span;
use crate::GecResponse;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs one text through spelling, grammar correction and gibberish
/// detection and reconciles the results. Shareable across threads.
pub struct Corrector {
    config: Config,
    dispatcher: Dispatcher,
    checker: Option<SpellChecker>,
    splitter: Box<dyn SentenceSplitter>,
}

impl Corrector {
    /// Starts the worker pool on the engine named by `config` and loads the
    /// spelling dictionaries when spelling is enabled.
    pub fn new(config: Config) -> Result<Self> {
        let factory = engine::factory_from_config(&config.engine);
        Self::with_engine(config, factory)
    }

    pub fn with_engine(config: Config, factory: Arc<EngineFactory>) -> Result<Self> {
        config.validate()?;
        let checker = if config.spelling.enabled {
            Some(SpellChecker::new(&config.spelling)?)
        } else {
            None
        };
        let dispatcher = Dispatcher::start(&config.pool, factory)?;
        Ok(Self::from_parts(config, dispatcher, checker))
    }

    pub fn from_parts(config: Config, dispatcher: Dispatcher, checker: Option<SpellChecker>) -> Self {
        Self {
            config,
            dispatcher,
            checker,
            splitter: Box::new(UnicodeSentenceSplitter),
        }
    }

    pub fn with_splitter(mut self, splitter: Box<dyn SentenceSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn segment(&self, text: &str) -> Vec<Unit> {
        segmenter::segment(text, self.splitter.as_ref())
    }

    pub fn markup(&self, text: &str) -> Result<GecResponse> {
        let text = clean_text(text);
        if text.trim().is_empty() {
            return Err(GecError::EmptyText);
        }

        let misspells = self
            .checker
            .as_ref()
            .map(|checker| checker.check(&text))
            .unwrap_or_default();
        debug!("Found {} spelling/profanity spans", misspells.len());

        let units = self.segment(&text);
        let unit_texts = units.iter().map(|u| u.text.clone()).collect();
        let result = self.dispatcher.correct(&text, unit_texts)?;

        let corrected = if result.corrected_text.trim().is_empty() {
            text.clone()
        } else {
            span::repad(&text, &result.corrected_text)
        };

        let diff_spans = diff(&text, &corrected, &misspells)?;

        let candidates = if self.config.gibberish.enabled {
            let mut candidates = build_candidates(&text, &units);
            score_candidates(
                &text,
                &mut candidates,
                self.config.gibberish.max_batch,
                |texts| self.dispatcher.score(texts),
            )?;
            candidates
        } else {
            Vec::new()
        };

        let reconciled = reconcile(
            &text,
            diff_spans,
            &misspells,
            candidates,
            &self.config.gibberish,
        );

        info!(
            "Marked {} issue(s) over {} chars in {:.3}s on worker {}",
            reconciled.markups.len(),
            span::rune_len(&text),
            result.service_time,
            result.worker
        );

        Ok(GecResponse {
            contains_profanity: reconciled.contains_profanity(),
            character_count: span::rune_len(&text),
            error_character_count: reconciled.error_char_count,
            text_markups: reconciled.markups,
            corrected_text: corrected,
            service_time: result.service_time,
        })
    }
}
