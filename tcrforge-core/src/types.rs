use std::fmt;

use thiserror::Error;

use crate::sequence::alphabet::is_protein;

/// A validated amino-acid sequence.
///
/// Always non-empty, upper-case, and drawn from the 20 standard residues.
/// Generation and translation produce these before anything reaches the
/// survival filter.
///
/// # Examples
///
/// ```rust
/// use tcrforge_core::types::Sequence;
///
/// let seq = Sequence::new("cassq").unwrap();
/// assert_eq!(seq.as_str(), "CASSQ");
/// assert!(Sequence::new("CAS*").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sequence(String);

impl Sequence {
    /// Validates and upper-cases `residues`.
    ///
    /// # Errors
    ///
    /// Returns [`TcrForgeError::InvalidSequence`] if the input is empty or
    /// contains anything outside the 20-letter alphabet.
    pub fn new(residues: impl AsRef<str>) -> Result<Self, TcrForgeError> {
        let upper = residues.as_ref().trim().to_ascii_uppercase();
        if upper.is_empty() {
            return Err(TcrForgeError::InvalidSequence(
                "empty protein sequence".to_string(),
            ));
        }
        if !is_protein(upper.as_bytes()) {
            return Err(TcrForgeError::InvalidSequence(format!(
                "'{}' contains residues outside the 20-letter alphabet",
                residues.as_ref()
            )));
        }
        Ok(Self(upper))
    }

    /// Wraps residues drawn directly from the 20-letter alphabet.
    pub(crate) fn from_standard_residues(residues: Vec<u8>) -> Self {
        debug_assert!(is_protein(&residues));
        Self(residues.into_iter().map(char::from).collect())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Number of residues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Sequence {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a single candidate was dropped during generation or translation.
///
/// Skips never abort a batch; they are collected so callers can inspect them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The generator returned no text for this call
    #[error("generation returned no sequence")]
    EmptyOutput,
    /// Fewer than three usable nucleotides after cleaning
    #[error("no complete codon in {0} nucleotides")]
    NoCodons(usize),
    /// A triplet did not map to any amino acid
    #[error("malformed codon '{0}'")]
    MalformedCodon(String),
    /// The translated protein is below the minimum usable length
    #[error("translated protein '{protein}' is shorter than {minimum} residues")]
    TooShort { protein: String, minimum: usize },
    /// The protein contains residues outside the 20-letter alphabet
    #[error("invalid residues in '{0}'")]
    InvalidResidue(String),
}

/// Outcome of running one candidate through the survival filter.
///
/// Produced exactly once per candidate and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDecision {
    /// The candidate as it was submitted (may be invalid)
    pub sequence: String,
    /// Whether every rule accepted the candidate
    pub passed: bool,
    /// `"Passed"` or the message of the first failing rule
    pub reason: String,
}

/// How a [`ScoredCandidate`] obtained its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreStatus {
    /// Pseudo-log-likelihood from the masked-scoring model
    Ranked,
    /// Random placeholder; the model was unavailable for this run
    MockRanked,
    /// The model failed on this sequence and the sentinel was assigned
    ScoringFailed,
}

impl fmt::Display for ScoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ranked => write!(f, "Ranked"),
            Self::MockRanked => write!(f, "MockRanked"),
            Self::ScoringFailed => write!(f, "ScoringFailed"),
        }
    }
}

/// A filtered candidate together with its plausibility score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub sequence: Sequence,
    /// PLL in (-inf, 0]; closer to zero is better
    pub score: f64,
    pub status: ScoreStatus,
}

/// Which scoring path produced a [`RankedResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    /// Live masked-language model
    Model,
    /// Degraded mode with random scores
    Mock,
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// Scored candidates ordered best first.
///
/// Sorted by score descending; equal scores keep their filter-survivor
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub candidates: Vec<ScoredCandidate>,
    pub mode: ScoringMode,
}

impl RankedResult {
    /// Sorts `candidates` best first with a stable tie-break.
    ///
    /// Failed candidates always trail scored ones, whatever their score.
    #[must_use]
    pub fn from_unsorted(mut candidates: Vec<ScoredCandidate>, mode: ScoringMode) -> Self {
        candidates.sort_by(|a, b| {
            let failed = |c: &ScoredCandidate| c.status == ScoreStatus::ScoringFailed;
            failed(a)
                .cmp(&failed(b))
                .then_with(|| b.score.total_cmp(&a.score))
        });
        Self { candidates, mode }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The best `n` candidates (fewer if the result is shorter).
    #[must_use]
    pub fn top(&self, n: usize) -> &[ScoredCandidate] {
        &self.candidates[..n.min(self.candidates.len())]
    }

    /// Whether these scores came from the live model.
    #[must_use]
    pub fn is_authoritative(&self) -> bool {
        self.mode == ScoringMode::Model
    }
}

/// Error types for tcrforge operations.
#[derive(Error, Debug)]
pub enum TcrForgeError {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// Writing a CSV table failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Configuration is missing a field or holds an out-of-range value
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// Configuration file is not valid YAML for the expected schema
    #[error("Config parse error: {0}")]
    ConfigParse(String),
    /// Sequence contains characters outside its alphabet
    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),
    /// Generation request violates its invariants
    #[error("Invalid generation request: {0}")]
    InvalidRequest(String),
    /// Network call to an external model failed
    #[error("Transport error: {0}")]
    Transport(String),
    /// External model answered with an unusable payload
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    /// Scoring model could not be initialised
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
    /// Scoring a single sequence failed
    #[error("Scoring error: {0}")]
    Scoring(String),
    /// Worker pool could not be built
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl From<reqwest::Error> for TcrForgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_yaml::Error> for TcrForgeError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}
