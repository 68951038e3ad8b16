use std::fmt;
use std::path::PathBuf;

use crate::types::RankedResult;

/// Summary of one pipeline run.
///
/// Returned for both terminal states. `ranked` and `exports` are only
/// present when the run reached [`TerminalState::Exported`].
///
/// # Examples
///
/// ```rust,no_run
/// use tcrforge_core::{Pipeline, config::PipelineConfig};
///
/// let config = PipelineConfig::from_path("config.yaml")?;
/// let report = Pipeline::from_config(config)?.run()?;
///
/// println!("Target: {}", report.target);
/// println!("Generated: {} real / {} mock", report.generation.real, report.generation.mock);
/// println!("Survivors: {}", report.filter.survivors);
/// if let Some(ranked) = &report.ranked {
///     println!("Best: {}", ranked.candidates[0].sequence);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Target name from the configuration
    pub target: String,

    pub generation: GenerationStats,

    pub filter: FilterStats,

    /// Ranked survivors; `None` when the run aborted
    pub ranked: Option<RankedResult>,

    /// Files written; `None` when the run aborted
    pub exports: Option<ExportPaths>,

    pub state: TerminalState,
}

/// Where generated candidates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerationStats {
    pub real: usize,
    pub mock: usize,
    /// Live fragments dropped during translation
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterStats {
    pub evaluated: usize,
    pub survivors: usize,
    /// Percentage of evaluated candidates that were rejected
    pub rejection_rate: f64,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    /// No candidate survived filtering; nothing was written
    Aborted,
    /// Ranked results and docking jobs were written
    Exported,
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aborted => write!(f, "ABORTED"),
            Self::Exported => write!(f, "EXPORTED"),
        }
    }
}

/// Files produced by an exported run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    /// Ranked candidate table
    pub candidates: PathBuf,
    /// Docking hand-off for the top candidates
    pub docking_job: PathBuf,
    /// Directory the docking tool should write into
    pub docking_output: PathBuf,
}
