//! Candidate generation.
//!
//! A [`SequenceGenerator`] is built once per run and is either **live**
//! (an API credential was found, calls go through a [`GenerationBoundary`])
//! or **local-only** (every candidate comes from the [`FallbackGenerator`]).
//!
//! The live path issues at most `max_real_calls` calls, whatever the
//! requested count. Each response fragment is translated from DNA; fragments
//! that fail translation are skipped and recorded. The first call that fails
//! at the transport level ends live generation for the run. Whatever is
//! still missing is then backfilled locally, so the caller always receives
//! exactly `count` candidates.
//!
//! # Examples
//!
//! ```rust
//! use tcrforge_core::generation::{
//!     FallbackGenerator, FallbackShape, GenerationRequest, SequenceGenerator,
//! };
//!
//! let fallback = FallbackGenerator::new(FallbackShape::Plain { min: 10, max: 20 }, Some(1));
//! let mut generator = SequenceGenerator::local(fallback);
//! let request = GenerationRequest::new("CAS", 20, 4, 1.0, 10)?;
//!
//! let report = generator.generate(&request);
//! assert_eq!(report.sequences.len(), 10);
//! assert_eq!((report.real_count, report.mock_count), (0, 10));
//! # Ok::<(), tcrforge_core::types::TcrForgeError>(())
//! ```

pub mod client;
pub mod fallback;

use std::time::Duration;

use tracing::{debug, info, warn};

pub use client::{Evo2Client, GeneratedChoice, GenerationBoundary, GenerationCall, GenerationResponse};
pub use fallback::{FallbackGenerator, FallbackShape};

use crate::config::PipelineConfig;
use crate::constants::{DNA_TOKENS_PER_RESIDUE, MIN_DNA_TOKENS};
use crate::sequence::{normalize_seed, translate};
use crate::types::{Sequence, SkipReason, TcrForgeError};

/// Parameters for one generation stage.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Protein or DNA seed; normalized to DNA before dispatch
    pub seed: String,
    /// Protein tokens wanted per call
    pub token_budget: usize,
    pub top_k: u32,
    pub temperature: f64,
    /// Candidates to return
    pub count: usize,
}

impl GenerationRequest {
    /// # Errors
    ///
    /// [`TcrForgeError::InvalidRequest`] when `token_budget`, `top_k` or
    /// `count` is zero, or `temperature` is not a positive number.
    pub fn new(
        seed: impl Into<String>,
        token_budget: usize,
        top_k: u32,
        temperature: f64,
        count: usize,
    ) -> Result<Self, TcrForgeError> {
        if token_budget == 0 {
            return Err(TcrForgeError::InvalidRequest("token_budget must be > 0".into()));
        }
        if top_k == 0 {
            return Err(TcrForgeError::InvalidRequest("top_k must be >= 1".into()));
        }
        if !temperature.is_finite() || temperature <= 0.0 {
            return Err(TcrForgeError::InvalidRequest(format!(
                "temperature must be > 0, got {temperature}"
            )));
        }
        if count == 0 {
            return Err(TcrForgeError::InvalidRequest("count must be >= 1".into()));
        }
        Ok(Self {
            seed: seed.into(),
            token_budget,
            top_k,
            temperature,
            count,
        })
    }

    /// # Errors
    ///
    /// See [`GenerationRequest::new`].
    pub fn from_config(config: &PipelineConfig) -> Result<Self, TcrForgeError> {
        Self::new(
            config.design_parameters.seed_sequence.clone(),
            config.design_parameters.num_tokens,
            config.evo2_parameters.top_k,
            config.evo2_parameters.temperature,
            config.design_parameters.num_sequences,
        )
    }

    /// Nucleotides to request: three per protein token, never below the floor.
    #[must_use]
    pub fn dna_token_budget(&self) -> usize {
        self.token_budget
            .saturating_mul(DNA_TOKENS_PER_RESIDUE)
            .max(MIN_DNA_TOKENS)
    }

    /// The wire call for this request, with the seed normalized to DNA.
    #[must_use]
    pub fn to_call(&self) -> GenerationCall {
        GenerationCall {
            sequence: normalize_seed(&self.seed),
            num_tokens: self.dna_token_budget(),
            top_k: self.top_k,
            temperature: self.temperature,
        }
    }
}

/// What one generation stage produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationReport {
    /// Live candidates first, then backfill
    pub sequences: Vec<Sequence>,
    /// Candidates translated from live output
    pub real_count: usize,
    /// Candidates drawn from the local fallback
    pub mock_count: usize,
    /// Live fragments that were dropped, in call order
    pub skipped: Vec<SkipReason>,
    /// The failure that stopped live generation, if any
    pub transport_failure: Option<String>,
}

enum Backend {
    Live(Box<dyn GenerationBoundary>),
    LocalOnly,
}

/// Produces candidate sequences from the live model or the local fallback.
pub struct SequenceGenerator {
    backend: Backend,
    fallback: FallbackGenerator,
    max_real_calls: usize,
}

impl std::fmt::Debug for SequenceGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceGenerator")
            .field("live", &self.is_live())
            .field("fallback", &self.fallback.shape())
            .field("max_real_calls", &self.max_real_calls)
            .finish()
    }
}

impl SequenceGenerator {
    /// Selects the backend from the configured credential variable.
    ///
    /// # Errors
    ///
    /// [`TcrForgeError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, TcrForgeError> {
        let key = std::env::var(&config.generation.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self::with_credential(config, key)
    }

    /// Like [`SequenceGenerator::from_config`] with an explicit credential.
    ///
    /// # Errors
    ///
    /// [`TcrForgeError::Transport`] if the HTTP client cannot be built.
    pub fn with_credential(
        config: &PipelineConfig,
        api_key: Option<String>,
    ) -> Result<Self, TcrForgeError> {
        let fallback = FallbackGenerator::new(
            FallbackShape::from_config(&config.generation.fallback),
            config.run.random_seed,
        );
        match api_key {
            Some(key) => {
                let client = Evo2Client::new(
                    config.generation.api_url.clone(),
                    key,
                    Duration::from_secs(config.generation.timeout_secs),
                )?;
                info!("Using Evo2 endpoint {}", client.url());
                Ok(Self::live(
                    Box::new(client),
                    fallback,
                    config.generation.max_real_calls,
                ))
            }
            None => {
                warn!(
                    "{} not set. Candidates will come from the local mock generator.",
                    config.generation.api_key_env
                );
                Ok(Self::local(fallback))
            }
        }
    }

    /// Live generation through `boundary`, at most `max_real_calls` calls per
    /// stage.
    #[must_use]
    pub fn live(
        boundary: Box<dyn GenerationBoundary>,
        fallback: FallbackGenerator,
        max_real_calls: usize,
    ) -> Self {
        Self {
            backend: Backend::Live(boundary),
            fallback,
            max_real_calls,
        }
    }

    /// Local generation only.
    #[must_use]
    pub const fn local(fallback: FallbackGenerator) -> Self {
        Self {
            backend: Backend::LocalOnly,
            fallback,
            max_real_calls: 0,
        }
    }

    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self.backend, Backend::Live(_))
    }

    /// Produces exactly `request.count` candidates.
    pub fn generate(&mut self, request: &GenerationRequest) -> GenerationReport {
        let mut report = GenerationReport::default();

        if let Backend::Live(boundary) = &self.backend {
            let call = request.to_call();
            if call.sequence != request.seed.trim().to_ascii_uppercase() {
                info!(
                    "Seed '{}' is not DNA; using canonical DNA seed {}",
                    request.seed, call.sequence
                );
            }

            let attempts = request.count.min(self.max_real_calls);
            for attempt in 1..=attempts {
                let response = match boundary.generate(&call) {
                    Ok(response) => response,
                    Err(err) => {
                        warn!(
                            "Generation call {attempt}/{attempts} failed: {err}. \
                             Skipping remaining live calls."
                        );
                        report.transport_failure = Some(err.to_string());
                        break;
                    }
                };

                let decoded = response
                    .first_text()
                    .map_or(Err(SkipReason::EmptyOutput), translate);
                match decoded {
                    Ok(sequence) => {
                        debug!("Call {attempt}: {sequence}");
                        report.sequences.push(sequence);
                    }
                    Err(reason) => {
                        warn!("Call {attempt}: dropped output ({reason})");
                        report.skipped.push(reason);
                    }
                }
            }
            report.real_count = report.sequences.len();
        }

        let deficit = request.count - report.real_count;
        if deficit > 0 {
            if self.is_live() {
                info!(
                    "Generated {} sequences from API. Filling remaining {deficit} with mock data.",
                    report.real_count
                );
            } else {
                warn!("Generating {deficit} mock sequences (no API credential).");
            }
            report.sequences.extend(self.fallback.generate(deficit));
            report.mock_count = deficit;
        }

        info!(
            "Generation complete: {} real / {} mock",
            report.real_count, report.mock_count
        );
        report
    }
}
