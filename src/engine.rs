//! Grammar-correction engine and gibberish classifier contracts.
//!
//! Each dispatcher worker owns exactly one [`Engine`] for its whole life, so
//! implementations may hold exclusive, non-shareable resources (a device
//! handle, a model session, a connection).

use crate::config::EngineConfig;
use crate::error::{GecError, Result};
use crate::GibbScores;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub trait Engine: Send {
    /// Corrects `text`, given its segmented `units`. An empty result means
    /// "no correction" and the caller keeps the original text.
    fn correct(&mut self, text: &str, units: &[String]) -> Result<String>;

    /// Scores every text as `[clean, mild, noise, word_salad]`, in input order.
    fn score(&mut self, texts: &[String]) -> Result<Vec<GibbScores>>;

    fn name(&self) -> &str;
}

/// Opens one engine per worker; the argument is the worker index.
pub type EngineFactory = dyn Fn(usize) -> Result<Box<dyn Engine>> + Send + Sync;

/// Engine that never changes the text and rates everything as clean.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughEngine;

impl Engine for PassthroughEngine {
    fn correct(&mut self, _text: &str, _units: &[String]) -> Result<String> {
        Ok(String::new())
    }

    fn score(&mut self, texts: &[String]) -> Result<Vec<GibbScores>> {
        Ok(vec![GibbScores::default(); texts.len()])
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

#[derive(Debug, Serialize)]
struct CorrectRequest<'a> {
    text: &'a str,
    units: &'a [String],
}

#[derive(Debug, Deserialize)]
struct CorrectResponse {
    corrected_text: String,
}

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    texts: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    scores: Vec<[f32; 4]>,
}

/// Engine served over HTTP: `POST {url}/correct` and `POST {url}/gibberish`.
pub struct RemoteEngine {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl RemoteEngine {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GecError::Engine(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn post<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        route: &str,
        body: &Req,
    ) -> Result<Resp> {
        let url = format!("{}/{}", self.base_url, route);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| GecError::Engine(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(GecError::Engine(format!(
                "{} answered HTTP {}",
                url,
                response.status()
            )));
        }

        response
            .json()
            .map_err(|e| GecError::Engine(format!("invalid response from {}: {}", url, e)))
    }
}

impl Engine for RemoteEngine {
    fn correct(&mut self, text: &str, units: &[String]) -> Result<String> {
        let resp: CorrectResponse = self.post("correct", &CorrectRequest { text, units })?;
        debug!("Remote engine corrected text: {:?}", resp.corrected_text);
        Ok(resp.corrected_text)
    }

    fn score(&mut self, texts: &[String]) -> Result<Vec<GibbScores>> {
        let resp: ScoreResponse = self.post("gibberish", &ScoreRequest { texts })?;
        Ok(resp.scores.into_iter().map(GibbScores::from).collect())
    }

    fn name(&self) -> &str {
        "remote"
    }
}

/// Picks the engine named by the configuration: remote when a URL is set,
/// passthrough otherwise.
pub fn factory_from_config(config: &EngineConfig) -> Arc<EngineFactory> {
    let factory: Arc<EngineFactory> = match config.url.clone() {
        Some(url) => {
            let timeout = Duration::from_secs(config.timeout_secs);
            Arc::new(move |worker: usize| -> Result<Box<dyn Engine>> {
                info!("Worker {} connecting to remote engine at {}", worker, url);
                Ok(Box::new(RemoteEngine::new(&url, timeout)?))
            })
        }
        None => Arc::new(|_: usize| -> Result<Box<dyn Engine>> { Ok(Box::new(PassthroughEngine)) }),
    };
    factory
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_returns_empty_correction() {
        let mut engine = PassthroughEngine;
        let out = engine.correct("Teh cat.", &["Teh cat.".to_string()]).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_passthrough_scores_clean() {
        let mut engine = PassthroughEngine;
        let scores = engine.score(&["a".into(), "b".into()]).unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores.iter().all(|s| s.clean == 1.0));
    }

    #[test]
    fn test_factory_defaults_to_passthrough() {
        let factory = factory_from_config(&EngineConfig::default());
        let engine = factory(0).unwrap();
        assert_eq!(engine.name(), "passthrough");
    }

    #[test]
    fn test_remote_engine_unreachable_is_engine_error() {
        let mut engine = RemoteEngine::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let err = engine.correct("text", &[]).unwrap_err();
        assert!(matches!(err, GecError::Engine(_)));
    }

    #[test]
    fn test_engine_trait_object_is_send() {
        fn assert_send<T: Send + ?Sized>() {}
        assert_send::<Box<dyn Engine>>();
    }
}
