//! Generation boundary and its Evo2 HTTP implementation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::TcrForgeError;

/// Body of one generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationCall {
    /// DNA seed
    pub sequence: String,
    /// Nucleotides to generate
    pub num_tokens: usize,
    pub top_k: u32,
    pub temperature: f64,
}

/// One generated fragment.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct GeneratedChoice {
    #[serde(default)]
    pub text: String,
}

/// Response of one generation call; zero or more raw DNA fragments.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub choices: Vec<GeneratedChoice>,
}

impl GenerationResponse {
    /// Text of the first fragment, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().map(|choice| choice.text.as_str())
    }
}

/// A remote genomic model that extends a DNA seed.
///
/// Implementations own their credentials. Any `Err` is treated as a
/// transport-level failure by the caller.
pub trait GenerationBoundary: Send + Sync {
    /// Issues one call and returns the raw response.
    ///
    /// # Errors
    ///
    /// [`TcrForgeError::Transport`] or [`TcrForgeError::MalformedResponse`].
    fn generate(&self, call: &GenerationCall) -> Result<GenerationResponse, TcrForgeError>;
}

/// Blocking client for the NVIDIA-hosted Evo2 endpoint.
pub struct Evo2Client {
    client: reqwest::blocking::Client,
    url: String,
    api_key: String,
}

impl std::fmt::Debug for Evo2Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evo2Client").field("url", &self.url).finish()
    }
}

impl Evo2Client {
    /// # Errors
    ///
    /// [`TcrForgeError::Transport`] if the HTTP client cannot be built.
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TcrForgeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl GenerationBoundary for Evo2Client {
    fn generate(&self, call: &GenerationCall) -> Result<GenerationResponse, TcrForgeError> {
        debug!(
            "POST {} ({} tokens, top_k={}, temperature={})",
            self.url, call.num_tokens, call.top_k, call.temperature
        );
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(call)
            .send()?
            .error_for_status()?;

        let body = response.text()?;
        serde_json::from_str(&body).map_err(|e| TcrForgeError::MalformedResponse(e.to_string()))
    }
}
