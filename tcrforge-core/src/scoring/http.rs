//! HTTP client for a remote masked-language model.
//!
//! The service exposes two JSON endpoints:
//!
//! - `GET {endpoint}/vocab` → `{"tokens": ["[CLS]", ..., "A", ...]}`
//! - `POST {endpoint}/predict` with `{"tokens": [...], "position": i}` →
//!   `{"probabilities": [...]}`, one value per vocabulary entry

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::model::{MaskedLanguageModel, Token, Vocabulary};
use crate::types::TcrForgeError;

#[derive(Debug, Deserialize)]
struct VocabResponse {
    tokens: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PredictRequest {
    tokens: Vec<String>,
    position: usize,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    probabilities: Vec<f64>,
}

/// Blocking masked-LM client. The vocabulary is fetched once on connect.
#[derive(Debug)]
pub struct HttpMaskedLm {
    client: reqwest::blocking::Client,
    endpoint: String,
    vocabulary: Vocabulary,
}

impl HttpMaskedLm {
    /// Connects to `endpoint` and loads its vocabulary.
    ///
    /// # Errors
    ///
    /// [`TcrForgeError::ModelUnavailable`] if the service cannot be reached
    /// or its vocabulary is unusable.
    pub fn connect(endpoint: &str, timeout: Duration) -> Result<Self, TcrForgeError> {
        let unavailable = |e: reqwest::Error| TcrForgeError::ModelUnavailable(e.to_string());

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(unavailable)?;
        let endpoint = endpoint.trim_end_matches('/').to_string();

        let vocab: VocabResponse = client
            .get(format!("{endpoint}/vocab"))
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(unavailable)?
            .json()
            .map_err(unavailable)?;
        let vocabulary = Vocabulary::new(vocab.tokens)?;
        info!(
            "Loaded masked-LM vocabulary ({} tokens) from {endpoint}",
            vocabulary.len()
        );

        Ok(Self {
            client,
            endpoint,
            vocabulary,
        })
    }
}

impl MaskedLanguageModel for HttpMaskedLm {
    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn predict_masked(&self, tokens: &[Token], position: usize) -> Result<Vec<f64>, TcrForgeError> {
        let request = PredictRequest {
            tokens: tokens.iter().map(ToString::to_string).collect(),
            position,
        };
        let response: PredictResponse = self
            .client
            .post(format!("{}/predict", self.endpoint))
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response.probabilities)
    }
}
