//! Pseudo-log-likelihood ranking.
//!
//! For a sequence of length `L`, framed as `[CLS] r1 .. rL [SEP]`, each
//! residue position `i` in `1..=L` is masked on its own, the model is asked
//! for a distribution at `i`, and the log-probability of the original
//! residue is accumulated. Every position sees the unmasked context apart
//! from itself. The score is the accumulated value divided by `L`, so it
//! lies in `(-inf, 0]` and compares across lengths.
//!
//! When no model is reachable the [`PllScorer`] runs in mock mode for the
//! whole run: each sequence gets a uniformly random negative score and the
//! result is marked [`ScoringMode::Mock`].
//!
//! # Examples
//!
//! ```rust
//! use tcrforge_core::scoring::PllScorer;
//! use tcrforge_core::types::{ScoringMode, Sequence};
//!
//! let mut scorer = PllScorer::mock(Some(3));
//! let seqs = vec![Sequence::new("CASSLGQETQYF")?, Sequence::new("CASRDSYEQYF")?];
//! let ranked = scorer.score_sequences(&seqs);
//!
//! assert_eq!(ranked.len(), 2);
//! assert_eq!(ranked.mode, ScoringMode::Mock);
//! assert!(ranked.candidates[0].score >= ranked.candidates[1].score);
//! # Ok::<(), tcrforge_core::types::TcrForgeError>(())
//! ```

pub mod http;
pub mod model;

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info, warn};

pub use http::HttpMaskedLm;
pub use model::{MaskedLanguageModel, Token, Vocabulary};

use crate::config::PipelineConfig;
use crate::constants::SENTINEL_SCORE;
use crate::types::{RankedResult, ScoreStatus, ScoredCandidate, ScoringMode, Sequence, TcrForgeError};
use crate::worker::WorkerPool;

/// Average masked-token log-probability of `sequence` under `model`.
///
/// Distributions are renormalized before use; a zero probability is floored
/// at `f64::MIN_POSITIVE` so the result stays finite.
///
/// # Errors
///
/// [`TcrForgeError::Scoring`] if a residue is missing from the vocabulary or
/// the model returns an unusable distribution, or any error the model
/// raises.
pub fn pseudo_log_likelihood(
    model: &dyn MaskedLanguageModel,
    sequence: &Sequence,
) -> Result<f64, TcrForgeError> {
    let vocabulary = model.vocabulary();
    let mut tokens = Token::frame(sequence);
    let length = sequence.len();
    let mut total = 0.0;

    for position in 1..=length {
        let original = tokens[position];
        let target = vocabulary.index_of(original).ok_or_else(|| {
            TcrForgeError::Scoring(format!("token '{original}' not in model vocabulary"))
        })?;

        tokens[position] = Token::Mask;
        let prediction = model.predict_masked(&tokens, position);
        tokens[position] = original;
        let distribution = prediction?;

        total += log_probability(&distribution, target, vocabulary.len())?;
    }

    Ok(total / length as f64)
}

fn log_probability(distribution: &[f64], target: usize, expected_len: usize) -> Result<f64, TcrForgeError> {
    if distribution.len() != expected_len {
        return Err(TcrForgeError::Scoring(format!(
            "expected {expected_len} probabilities, got {}",
            distribution.len()
        )));
    }
    if distribution.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(TcrForgeError::Scoring(
            "distribution contains negative or non-finite values".to_string(),
        ));
    }
    let mass: f64 = distribution.iter().sum();
    if mass <= 0.0 {
        return Err(TcrForgeError::Scoring("distribution has no mass".to_string()));
    }
    Ok((distribution[target] / mass).max(f64::MIN_POSITIVE).ln())
}

enum Backend {
    Model(Box<dyn MaskedLanguageModel>),
    Mock(StdRng),
}

/// Ranks filtered candidates by pseudo-log-likelihood.
pub struct PllScorer {
    backend: Backend,
    pool: Arc<WorkerPool>,
}

impl std::fmt::Debug for PllScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PllScorer").field("mode", &self.mode()).finish()
    }
}

impl PllScorer {
    /// Connects to `ranker.endpoint`, or runs in mock mode if it is unset or
    /// unreachable.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        let Some(endpoint) = &config.ranker.endpoint else {
            warn!("No ranker endpoint configured. Using mock ranking.");
            return Self::mock(config.run.random_seed);
        };

        match HttpMaskedLm::connect(endpoint, Duration::from_secs(config.ranker.timeout_secs)) {
            Ok(model) => Self::with_model(Box::new(model)),
            Err(err) => {
                error!("Failed to load masked-LM from {endpoint}: {err}. Using mock ranking.");
                Self::mock(config.run.random_seed)
            }
        }
    }

    #[must_use]
    pub fn with_model(model: Box<dyn MaskedLanguageModel>) -> Self {
        Self {
            backend: Backend::Model(model),
            pool: Arc::new(WorkerPool::global()),
        }
    }

    /// Random negative scores, seeded for reproducibility.
    #[must_use]
    pub fn mock(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            backend: Backend::Mock(rng),
            pool: Arc::new(WorkerPool::global()),
        }
    }

    /// Scores sequences on `pool` instead of rayon's global pool.
    #[must_use]
    pub fn with_pool(mut self, pool: Arc<WorkerPool>) -> Self {
        self.pool = pool;
        self
    }

    #[must_use]
    pub const fn mode(&self) -> ScoringMode {
        match self.backend {
            Backend::Model(_) => ScoringMode::Model,
            Backend::Mock(_) => ScoringMode::Mock,
        }
    }

    /// One scored candidate per input, best first.
    ///
    /// Sequences the model fails on get [`SENTINEL_SCORE`] and
    /// [`ScoreStatus::ScoringFailed`]; they are never dropped.
    pub fn score_sequences(&mut self, sequences: &[Sequence]) -> RankedResult {
        match &mut self.backend {
            Backend::Model(model) => {
                info!(
                    "Scoring {} sequences on {} workers",
                    sequences.len(),
                    self.pool.num_threads()
                );
                let model: &dyn MaskedLanguageModel = model.as_ref();
                let scored = self
                    .pool
                    .map_indexed(sequences, |_, sequence| score_one(model, sequence));
                RankedResult::from_unsorted(scored, ScoringMode::Model)
            }
            Backend::Mock(rng) => {
                warn!(
                    "MOCK RANKING: {} scores are random placeholders, not model output",
                    sequences.len()
                );
                let scored = sequences
                    .iter()
                    .map(|sequence| ScoredCandidate {
                        sequence: sequence.clone(),
                        score: -rng.gen::<f64>(),
                        status: ScoreStatus::MockRanked,
                    })
                    .collect();
                RankedResult::from_unsorted(scored, ScoringMode::Mock)
            }
        }
    }
}

fn score_one(model: &dyn MaskedLanguageModel, sequence: &Sequence) -> ScoredCandidate {
    let (score, status) = match pseudo_log_likelihood(model, sequence) {
        Ok(score) if score.is_finite() => (score, ScoreStatus::Ranked),
        Ok(score) => {
            warn!("Non-finite PLL {score} for {sequence}; assigning sentinel");
            (SENTINEL_SCORE, ScoreStatus::ScoringFailed)
        }
        Err(err) => {
            warn!("Error scoring {sequence}: {err}");
            (SENTINEL_SCORE, ScoreStatus::ScoringFailed)
        }
    };
    ScoredCandidate {
        sequence: sequence.clone(),
        score,
        status,
    }
}
