//! Run configuration.
//!
//! A [`PipelineConfig`] is read once from YAML at process start, validated,
//! and then only ever passed around by reference.
//!
//! # Examples
//!
//! ```rust
//! use tcrforge_core::config::{PipelineConfig, TmeConstraint};
//!
//! let yaml = r#"
//! target:
//!   name: KRAS_G12D
//! design_parameters:
//!   num_sequences: 20
//! tme_constraints:
//!   - constraint: tonic_signaling_risk
//!     threshold: 0.3
//!   - constraint: motif_ban
//!     motifs: [NG, DG]
//! "#;
//!
//! let config = PipelineConfig::from_yaml_str(yaml)?;
//! assert_eq!(config.target.name, "KRAS_G12D");
//! assert_eq!(config.evo2_parameters.top_k, 4);
//! assert!(matches!(
//!     config.tme_constraints[0],
//!     TmeConstraint::TonicSignalingRisk { threshold } if threshold == 0.3
//! ));
//! # Ok::<(), tcrforge_core::types::TcrForgeError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::{
    DEFAULT_API_KEY_ENV, DEFAULT_GENERATION_TIMEOUT_SECS, DEFAULT_GENERATION_URL,
    DEFAULT_PROTEIN_SEED, DEFAULT_PROTEIN_TOKENS, DEFAULT_RANKER_TIMEOUT_SECS,
    DEFAULT_RESULTS_DIR, DEFAULT_TEMPERATURE, DEFAULT_TOP_K, DOCKING_TOP_N, FALLBACK_MAX_LENGTH,
    FALLBACK_MIN_LENGTH, FLANKED_CORE_MAX_LENGTH, FLANKED_CORE_MIN_LENGTH, MAX_REAL_CALLS,
};
use crate::types::TcrForgeError;

/// Complete configuration for one design run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineConfig {
    /// Antigen target the candidates are designed against
    pub target: TargetConfig,

    /// How many candidates to generate and from which seed
    pub design_parameters: DesignParameters,

    /// Sampling parameters forwarded to the generative model
    #[serde(default)]
    pub evo2_parameters: EvoParameters,

    /// Ordered survival constraints
    #[serde(default)]
    pub tme_constraints: Vec<TmeConstraint>,

    /// Generation endpoint and fallback behaviour
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Masked-scoring endpoint
    #[serde(default)]
    pub ranker: RankerConfig,

    /// Output location, reproducibility and parallelism
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TargetConfig {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DesignParameters {
    /// Number of candidates to generate
    pub num_sequences: usize,

    /// Seed handed to the generator; protein seeds are mapped to a DNA seed
    #[serde(default = "default_seed_sequence")]
    pub seed_sequence: String,

    /// Protein tokens requested per generation call
    #[serde(default = "default_num_tokens")]
    pub num_tokens: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EvoParameters {
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for EvoParameters {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// One survival constraint, tagged by its `constraint` key in YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "constraint", rename_all = "snake_case")]
pub enum TmeConstraint {
    /// Reject candidates whose GRAVY exceeds `threshold`
    TonicSignalingRisk { threshold: f64 },
    /// Reject candidates containing any of `motifs`
    MotifBan { motifs: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Evo2 generate endpoint
    pub api_url: String,

    /// Environment variable the API credential is read from
    pub api_key_env: String,

    /// Cap on live calls per run, whatever `num_sequences` is
    pub max_real_calls: usize,

    pub timeout_secs: u64,

    pub fallback: FallbackConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GENERATION_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            max_real_calls: MAX_REAL_CALLS,
            timeout_secs: DEFAULT_GENERATION_TIMEOUT_SECS,
            fallback: FallbackConfig::default(),
        }
    }
}

/// Shape of locally generated candidates.
///
/// Lengths count every residue for the plain shape and only the random core
/// for the flanked shape. Unset bounds take the shape's defaults (10–20
/// plain, 16–22 flanked).
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Inclusive lower bound on generated length
    pub min_length: Option<usize>,

    /// Inclusive upper bound on generated length
    pub max_length: Option<usize>,

    /// Wrap each random core in fixed `W ... C` anchors
    pub flanked: bool,
}

impl FallbackConfig {
    /// Inclusive `(min, max)` length bounds with defaults applied.
    #[must_use]
    pub fn length_range(&self) -> (usize, usize) {
        let (min_default, max_default) = if self.flanked {
            (FLANKED_CORE_MIN_LENGTH, FLANKED_CORE_MAX_LENGTH)
        } else {
            (FALLBACK_MIN_LENGTH, FALLBACK_MAX_LENGTH)
        };
        (
            self.min_length.unwrap_or(min_default),
            self.max_length.unwrap_or(max_default),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// Base URL of the masked-scoring service; `None` selects mock ranking
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: DEFAULT_RANKER_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Seeds the fallback generator and mock scorer; `None` draws from entropy
    pub random_seed: Option<u64>,

    pub results_dir: PathBuf,

    /// How many top candidates go to the docking hand-off
    pub top_n: usize,

    /// Worker threads for per-candidate work; `None` uses all cores
    pub num_threads: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            random_seed: None,
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            top_n: DOCKING_TOP_N,
            num_threads: None,
        }
    }
}

fn default_seed_sequence() -> String {
    DEFAULT_PROTEIN_SEED.to_string()
}

const fn default_num_tokens() -> usize {
    DEFAULT_PROTEIN_TOKENS
}

const fn default_top_k() -> u32 {
    DEFAULT_TOP_K
}

const fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

impl PipelineConfig {
    /// Reads and validates a YAML configuration file.
    ///
    /// # Errors
    ///
    /// [`TcrForgeError::IoError`] if the file cannot be read,
    /// [`TcrForgeError::ConfigParse`] for malformed YAML or missing required
    /// keys, [`TcrForgeError::Config`] for out-of-range values.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TcrForgeError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Parses and validates configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// See [`PipelineConfig::from_path`].
    pub fn from_yaml_str(yaml: &str) -> Result<Self, TcrForgeError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value the pipeline relies on.
    ///
    /// # Errors
    ///
    /// [`TcrForgeError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), TcrForgeError> {
        if self.target.name.trim().is_empty() {
            return Err(config_error("target.name must not be empty"));
        }
        if self.design_parameters.num_sequences == 0 {
            return Err(config_error("design_parameters.num_sequences must be at least 1"));
        }
        if self.design_parameters.num_tokens == 0 {
            return Err(config_error("design_parameters.num_tokens must be at least 1"));
        }
        if self.evo2_parameters.top_k == 0 {
            return Err(config_error("evo2_parameters.top_k must be at least 1"));
        }
        let temperature = self.evo2_parameters.temperature;
        if !temperature.is_finite() || temperature <= 0.0 {
            return Err(config_error("evo2_parameters.temperature must be positive"));
        }

        for constraint in &self.tme_constraints {
            match constraint {
                TmeConstraint::TonicSignalingRisk { threshold } if !threshold.is_finite() => {
                    return Err(config_error("tonic_signaling_risk threshold must be finite"));
                }
                TmeConstraint::MotifBan { motifs }
                    if motifs.iter().any(|m| m.trim().is_empty()) =>
                {
                    return Err(config_error("motif_ban motifs must not be empty strings"));
                }
                _ => {}
            }
        }

        let (min_length, max_length) = self.generation.fallback.length_range();
        if min_length == 0 || min_length > max_length {
            return Err(config_error(
                "generation.fallback requires 1 <= min_length <= max_length",
            ));
        }
        if self.run.top_n == 0 {
            return Err(config_error("run.top_n must be at least 1"));
        }
        if self.run.num_threads == Some(0) {
            return Err(config_error("run.num_threads must be at least 1"));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> TcrForgeError {
    TcrForgeError::Config(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "
target:
  name: KRAS_G12D
design_parameters:
  num_sequences: 10
";

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = PipelineConfig::from_yaml_str(MINIMAL).unwrap();
        assert_eq!(config.target.name, "KRAS_G12D");
        assert_eq!(config.design_parameters.num_sequences, 10);
        assert_eq!(config.design_parameters.seed_sequence, "CAS");
        assert_eq!(config.design_parameters.num_tokens, 20);
        assert_eq!(config.evo2_parameters, EvoParameters::default());
        assert!(config.tme_constraints.is_empty());
        assert_eq!(config.generation, GenerationConfig::default());
        assert_eq!(config.ranker.endpoint, None);
        assert_eq!(config.run.top_n, 5);
        assert_eq!(config.run.results_dir, PathBuf::from("results"));
    }

    #[test]
    fn test_full_config() {
        let yaml = "
target:
  name: MAGE-A4
design_parameters:
  num_sequences: 100
  seed_sequence: TGCGCCAGC
  num_tokens: 30
evo2_parameters:
  top_k: 2
  temperature: 0.7
tme_constraints:
  - constraint: tonic_signaling_risk
    threshold: 0.2
  - constraint: motif_ban
    motifs: [NG, NS, DG]
generation:
  max_real_calls: 3
  fallback:
    flanked: true
    min_length: 16
    max_length: 22
ranker:
  endpoint: http://localhost:9000
run:
  random_seed: 7
  results_dir: out
  top_n: 3
  num_threads: 2
";
        let config = PipelineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.evo2_parameters.top_k, 2);
        assert_eq!(
            config.tme_constraints,
            vec![
                TmeConstraint::TonicSignalingRisk { threshold: 0.2 },
                TmeConstraint::MotifBan {
                    motifs: vec!["NG".into(), "NS".into(), "DG".into()]
                },
            ]
        );
        assert_eq!(config.generation.max_real_calls, 3);
        assert_eq!(config.generation.api_key_env, "NVIDIA_API_KEY");
        assert!(config.generation.fallback.flanked);
        assert_eq!(config.generation.fallback.length_range(), (16, 22));
        assert_eq!(config.ranker.endpoint.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.run.random_seed, Some(7));
        assert_eq!(config.run.num_threads, Some(2));
    }

    #[test]
    fn test_missing_required_field_is_parse_error() {
        let yaml = "
target:
  name: KRAS_G12D
";
        assert!(matches!(
            PipelineConfig::from_yaml_str(yaml),
            Err(TcrForgeError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_unknown_constraint_kind_is_rejected() {
        let yaml = format!("{MINIMAL}tme_constraints:\n  - constraint: ph_tolerance\n    min: 6.5\n");
        assert!(matches!(
            PipelineConfig::from_yaml_str(&yaml),
            Err(TcrForgeError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_zero_sequences_is_invalid() {
        let yaml = MINIMAL.replace("num_sequences: 10", "num_sequences: 0");
        assert!(matches!(
            PipelineConfig::from_yaml_str(&yaml),
            Err(TcrForgeError::Config(_))
        ));
    }

    #[test]
    fn test_non_positive_temperature_is_invalid() {
        let yaml = format!("{MINIMAL}evo2_parameters:\n  temperature: 0.0\n");
        assert!(matches!(
            PipelineConfig::from_yaml_str(&yaml),
            Err(TcrForgeError::Config(_))
        ));
    }

    #[test]
    fn test_inverted_fallback_range_is_invalid() {
        let yaml = format!(
            "{MINIMAL}generation:\n  fallback:\n    min_length: 20\n    max_length: 10\n"
        );
        assert!(matches!(
            PipelineConfig::from_yaml_str(&yaml),
            Err(TcrForgeError::Config(_))
        ));
    }

    #[test]
    fn test_fallback_length_defaults_follow_shape() {
        let plain = FallbackConfig::default();
        assert_eq!(plain.length_range(), (10, 20));
        let custom = FallbackConfig {
            min_length: Some(8),
            ..FallbackConfig::default()
        };
        assert_eq!(custom.length_range(), (8, 20));
    }

    #[test]
    fn test_from_path_missing_file() {
        assert!(matches!(
            PipelineConfig::from_path("does/not/exist.yaml"),
            Err(TcrForgeError::IoError(_))
        ));
    }

    #[test]
    fn test_from_path_reads_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), MINIMAL).unwrap();
        let config = PipelineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.design_parameters.num_sequences, 10);
    }
}
