use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::constants::LOGGED_TOP_CANDIDATES;
use crate::filter::{FilterOutcome, SurvivalFilter};
use crate::generation::{GenerationRequest, SequenceGenerator};
use crate::output::export_results;
use crate::results::{FilterStats, GenerationStats, RunReport, TerminalState};
use crate::scoring::PllScorer;
use crate::types::{RankedResult, Sequence, TcrForgeError};
use crate::worker::WorkerPool;

/// Where a design run currently is.
///
/// `Init → Generated → Filtered → {Aborted | Ranked} → Exported`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    Generated,
    Filtered,
    Aborted,
    Ranked,
    Exported,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "INIT",
            Self::Generated => "GENERATED",
            Self::Filtered => "FILTERED",
            Self::Aborted => "ABORTED",
            Self::Ranked => "RANKED",
            Self::Exported => "EXPORTED",
        };
        f.write_str(name)
    }
}

/// Marker trait for the non-terminal stages of a [`DesignRun`].
///
/// Each stage carries the data the next transition consumes, so a stage
/// can only be reached with its inputs in hand.
pub trait Stage {
    const STATE: PipelineState;
}

/// Nothing has run yet.
#[derive(Debug, Clone, Default)]
pub struct Init;

/// Candidates have been generated.
#[derive(Debug, Clone)]
pub struct Generated {
    sequences: Vec<Sequence>,
}

/// Candidates have been filtered.
#[derive(Debug, Clone)]
pub struct Filtered {
    outcome: FilterOutcome,
}

/// Survivors have been scored and sorted.
#[derive(Debug, Clone)]
pub struct Ranked {
    ranked: RankedResult,
}

impl Stage for Init {
    const STATE: PipelineState = PipelineState::Init;
}
impl Stage for Generated {
    const STATE: PipelineState = PipelineState::Generated;
}
impl Stage for Filtered {
    const STATE: PipelineState = PipelineState::Filtered;
}
impl Stage for Ranked {
    const STATE: PipelineState = PipelineState::Ranked;
}

/// One pass through the pipeline.
///
/// Transitions consume the run and return it in the next stage, so stages
/// cannot be skipped or repeated. The only branch is `rank` on a filtered
/// run, which ends the run early when nothing survived filtering.
///
/// # Examples
///
/// ```rust
/// use tcrforge_core::config::PipelineConfig;
/// use tcrforge_core::filter::SurvivalFilter;
/// use tcrforge_core::generation::SequenceGenerator;
/// use tcrforge_core::pipeline::{Pipeline, PipelineState, RankOutcome};
/// use tcrforge_core::scoring::PllScorer;
///
/// let config = PipelineConfig::from_yaml_str(
///     "target:\n  name: KRAS_G12D\ndesign_parameters:\n  num_sequences: 12\nrun:\n  random_seed: 7\n",
/// )?;
/// let generator = SequenceGenerator::with_credential(&config, None)?;
/// let filter = SurvivalFilter::from_constraints(&config.tme_constraints);
/// let mut pipeline = Pipeline::with_components(config, generator, filter, PllScorer::mock(Some(7)));
///
/// let run = pipeline.start().generate()?;
/// assert_eq!(run.state(), PipelineState::Generated);
/// assert_eq!(run.sequences().len(), 12);
///
/// let run = run.filter();
/// match run.rank() {
///     RankOutcome::Aborted(report) => assert!(report.ranked.is_none()),
///     RankOutcome::Ranked(run) => assert!(!run.ranked().is_empty()),
/// }
/// # Ok::<(), tcrforge_core::types::TcrForgeError>(())
/// ```
pub struct DesignRun<'p, S: Stage> {
    pipeline: &'p mut Pipeline,
    generation: GenerationStats,
    filter: FilterStats,
    stage: S,
}

/// Result of ranking a filtered run.
pub enum RankOutcome<'p> {
    /// Nothing survived filtering; the run is over and wrote nothing
    Aborted(RunReport),
    /// Survivors were ranked and can be exported
    Ranked(DesignRun<'p, Ranked>),
}

impl<'p, S: Stage> DesignRun<'p, S> {
    #[must_use]
    pub fn state(&self) -> PipelineState {
        S::STATE
    }

    #[must_use]
    pub fn generation_stats(&self) -> GenerationStats {
        self.generation
    }

    fn advance<T: Stage>(self, stage: T) -> DesignRun<'p, T> {
        debug!("{} -> {}", S::STATE, T::STATE);
        DesignRun {
            pipeline: self.pipeline,
            generation: self.generation,
            filter: self.filter,
            stage,
        }
    }

    fn report(&self, ranked: Option<RankedResult>, state: TerminalState) -> RunReport {
        RunReport {
            target: self.pipeline.config.target.name.clone(),
            generation: self.generation,
            filter: self.filter,
            ranked,
            exports: None,
            state,
        }
    }
}

impl<'p> DesignRun<'p, Init> {
    /// Generates `design_parameters.num_sequences` candidates.
    ///
    /// Generation itself never fails; live-API problems are absorbed by the
    /// local fallback.
    ///
    /// # Errors
    ///
    /// [`TcrForgeError::InvalidRequest`] if the configured generation
    /// parameters are out of range.
    pub fn generate(mut self) -> Result<DesignRun<'p, Generated>, TcrForgeError> {
        let request = GenerationRequest::from_config(&self.pipeline.config)?;
        info!("Generating {} candidate sequences", request.count);

        let report = self.pipeline.generator.generate(&request);
        let generation = GenerationStats {
            real: report.real_count,
            mock: report.mock_count,
            skipped: report.skipped.len(),
        };

        let mut run = self.advance(Generated {
            sequences: report.sequences,
        });
        run.generation = generation;
        Ok(run)
    }
}

impl<'p> DesignRun<'p, Generated> {
    /// Generated candidates, live ones first.
    #[must_use]
    pub fn sequences(&self) -> &[Sequence] {
        &self.stage.sequences
    }

    /// Runs the survival filter over every generated candidate.
    #[must_use]
    pub fn filter(self) -> DesignRun<'p, Filtered> {
        let outcome = self.pipeline.filter.apply_all(&self.stage.sequences);
        let filter = FilterStats {
            evaluated: outcome.decisions.len(),
            survivors: outcome.survivors.len(),
            rejection_rate: outcome.rejection_rate(),
        };
        info!(
            "Filtered {} -> {} candidates (Rejection Rate: {:.1}%)",
            filter.evaluated, filter.survivors, filter.rejection_rate
        );
        for rejection in &outcome.rejections {
            debug!("{rejection}");
        }

        let mut run = self.advance(Filtered { outcome });
        run.filter = filter;
        run
    }
}

impl<'p> DesignRun<'p, Filtered> {
    #[must_use]
    pub fn outcome(&self) -> &FilterOutcome {
        &self.stage.outcome
    }

    /// Scores the survivors, or aborts if there are none.
    #[must_use]
    pub fn rank(mut self) -> RankOutcome<'p> {
        if self.stage.outcome.survivors.is_empty() {
            warn!("No sequences survived the filter. Aborting.");
            debug!("{} -> {}", PipelineState::Filtered, PipelineState::Aborted);
            return RankOutcome::Aborted(self.report(None, TerminalState::Aborted));
        }

        let ranked = self
            .pipeline
            .scorer
            .score_sequences(&self.stage.outcome.survivors);
        log_top_candidates(&ranked);
        RankOutcome::Ranked(self.advance(Ranked { ranked }))
    }
}

impl DesignRun<'_, Ranked> {
    #[must_use]
    pub fn ranked(&self) -> &RankedResult {
        &self.stage.ranked
    }

    /// Writes the ranked table and the docking hand-off under `results_dir`.
    ///
    /// # Errors
    ///
    /// [`TcrForgeError::IoError`] if the files cannot be written.
    pub fn export(self, results_dir: &Path) -> Result<RunReport, TcrForgeError> {
        let config = &self.pipeline.config;
        let paths = export_results(
            results_dir,
            &self.stage.ranked,
            &config.target.name,
            config.run.top_n,
        )?;
        info!(
            "Run: tcrdock --input {} --output {}",
            paths.docking_job.display(),
            paths.docking_output.display()
        );
        debug!("{} -> {}", PipelineState::Ranked, PipelineState::Exported);

        let mut report = self.report(Some(self.stage.ranked.clone()), TerminalState::Exported);
        report.exports = Some(paths);
        Ok(report)
    }
}

fn log_top_candidates(ranked: &RankedResult) {
    if !ranked.is_authoritative() {
        warn!("Ranking used MOCK scores; order is not meaningful");
    }
    info!("Top {} candidates:", LOGGED_TOP_CANDIDATES.min(ranked.len()));
    for (rank, candidate) in ranked.top(LOGGED_TOP_CANDIDATES).iter().enumerate() {
        info!(
            "  {}. {} (score {:.4}, {})",
            rank + 1,
            candidate.sequence,
            candidate.score,
            candidate.status
        );
    }
}

/// The configured generator, filter and scorer for a target.
///
/// Build once per process; each [`Pipeline::run`] is an independent pass.
pub struct Pipeline {
    config: PipelineConfig,
    generator: SequenceGenerator,
    filter: SurvivalFilter,
    scorer: PllScorer,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("target", &self.config.target.name)
            .field("generator", &self.generator)
            .field("scorer", &self.scorer)
            .finish()
    }
}

impl Pipeline {
    /// Builds every component from `config`.
    ///
    /// The generator goes live if the credential variable is set. The scorer
    /// connects to `ranker.endpoint` and falls back to mock ranking for the
    /// whole run if it cannot.
    ///
    /// # Errors
    ///
    /// [`TcrForgeError::Config`] for invalid configuration,
    /// [`TcrForgeError::ThreadPool`] if the worker pool cannot be built.
    pub fn from_config(config: PipelineConfig) -> Result<Self, TcrForgeError> {
        config.validate()?;
        let pool = Arc::new(WorkerPool::new(config.run.num_threads)?);

        let generator = SequenceGenerator::from_config(&config)?;
        let filter =
            SurvivalFilter::from_constraints(&config.tme_constraints).with_pool(Arc::clone(&pool));
        let scorer = PllScorer::from_config(&config).with_pool(pool);

        Ok(Self::with_components(config, generator, filter, scorer))
    }

    /// Assembles a pipeline from ready-made components.
    #[must_use]
    pub fn with_components(
        config: PipelineConfig,
        generator: SequenceGenerator,
        filter: SurvivalFilter,
        scorer: PllScorer,
    ) -> Self {
        Self {
            config,
            generator,
            filter,
            scorer,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// A fresh run in [`PipelineState::Init`].
    pub fn start(&mut self) -> DesignRun<'_, Init> {
        info!("Starting design run for target {}", self.config.target.name);
        DesignRun {
            pipeline: self,
            generation: GenerationStats::default(),
            filter: FilterStats::default(),
            stage: Init,
        }
    }

    /// Runs every stage, exporting into `run.results_dir`.
    ///
    /// An aborted run is a successful run with no output files.
    ///
    /// # Errors
    ///
    /// Invalid generation parameters or a failed export.
    pub fn run(&mut self) -> Result<RunReport, TcrForgeError> {
        let results_dir = self.config.run.results_dir.clone();
        match self.start().generate()?.filter().rank() {
            RankOutcome::Aborted(report) => Ok(report),
            RankOutcome::Ranked(run) => run.export(&results_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::config::TmeConstraint;
    use crate::filter::SurvivalRule;
    use crate::generation::{
        FallbackGenerator, FallbackShape, GenerationBoundary, GenerationCall, GenerationResponse,
    };
    use crate::types::ScoringMode;

    fn config(results_dir: &Path, num_sequences: usize) -> PipelineConfig {
        let yaml = format!(
            "target:\n  name: KRAS_G12D\ndesign_parameters:\n  num_sequences: {num_sequences}\n\
             run:\n  random_seed: 42\n  results_dir: {}\n",
            results_dir.display()
        );
        PipelineConfig::from_yaml_str(&yaml).unwrap()
    }

    fn local_pipeline(config: PipelineConfig, filter: SurvivalFilter) -> Pipeline {
        let generator = SequenceGenerator::with_credential(&config, None).unwrap();
        let scorer = PllScorer::mock(config.run.random_seed);
        Pipeline::with_components(config, generator, filter, scorer)
    }

    fn reject_everything() -> SurvivalFilter {
        SurvivalFilter::with_rules(vec![SurvivalRule::TonicSignalingRisk { threshold: -10.0 }])
    }

    fn accept_everything() -> SurvivalFilter {
        SurvivalFilter::from_constraints(&[
            TmeConstraint::TonicSignalingRisk { threshold: 10.0 },
            TmeConstraint::MotifBan { motifs: Vec::new() },
        ])
    }

    #[test]
    fn test_states_advance_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = local_pipeline(config(dir.path(), 8), accept_everything());

        let run = pipeline.start();
        assert_eq!(run.state(), PipelineState::Init);
        let run = run.generate().unwrap();
        assert_eq!(run.state(), PipelineState::Generated);
        assert_eq!(run.generation_stats(), GenerationStats { real: 0, mock: 8, skipped: 0 });
        let run = run.filter();
        assert_eq!(run.state(), PipelineState::Filtered);
        assert_eq!(run.outcome().survivors.len(), 8);
        let RankOutcome::Ranked(run) = run.rank() else {
            panic!("expected ranked run");
        };
        assert_eq!(run.state(), PipelineState::Ranked);
        assert_eq!(run.ranked().len(), 8);
    }

    #[test]
    fn test_empty_survivors_abort_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let results_dir = dir.path().join("results");
        let mut pipeline = local_pipeline(config(&results_dir, 10), reject_everything());

        let report = pipeline.run().unwrap();
        assert_eq!(report.state, TerminalState::Aborted);
        assert!(report.ranked.is_none());
        assert!(report.exports.is_none());
        assert_eq!(report.filter.evaluated, 10);
        assert_eq!(report.filter.survivors, 0);
        assert!((report.filter.rejection_rate - 100.0).abs() < 1e-9);
        assert!(!results_dir.exists());
    }

    #[test]
    fn test_full_run_exports() {
        let dir = tempfile::tempdir().unwrap();
        let results_dir = dir.path().join("results");
        let mut pipeline = local_pipeline(config(&results_dir, 9), accept_everything());

        let report = pipeline.run().unwrap();
        assert_eq!(report.state, TerminalState::Exported);
        let ranked = report.ranked.as_ref().unwrap();
        assert_eq!(ranked.len(), 9);
        assert_eq!(ranked.mode, ScoringMode::Mock);

        let exports = report.exports.as_ref().unwrap();
        let candidates = std::fs::read_to_string(&exports.candidates).unwrap();
        assert_eq!(candidates.lines().count(), 10);
        let first_row = candidates.lines().nth(1).unwrap();
        assert!(first_row.starts_with(ranked.candidates[0].sequence.as_str()));

        let jobs = std::fs::read_to_string(&exports.docking_job).unwrap();
        assert_eq!(jobs.lines().count(), 6);
        assert_eq!(
            exports.docking_job,
            results_dir.join("docking_jobs").join("KRAS_G12D_job.csv")
        );
    }

    #[test]
    fn test_seeded_local_runs_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        let run = |sub: &str| {
            let results_dir: PathBuf = dir.path().join(sub);
            let mut pipeline =
                local_pipeline(config(&results_dir, 30), SurvivalFilter::default());
            pipeline.run().unwrap()
        };

        let first = run("a");
        let second = run("b");
        assert_eq!(first.ranked, second.ranked);
        assert_eq!(first.filter, second.filter);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a/candidates.csv")).ok(),
            std::fs::read_to_string(dir.path().join("b/candidates.csv")).ok()
        );
    }

    struct DownBoundary;

    impl GenerationBoundary for DownBoundary {
        fn generate(&self, _call: &GenerationCall) -> Result<GenerationResponse, TcrForgeError> {
            Err(TcrForgeError::Transport("connection refused".into()))
        }
    }

    #[test]
    fn test_unreachable_generator_still_completes() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir.path().join("results"), 10);
        let generator = SequenceGenerator::live(
            Box::new(DownBoundary),
            FallbackGenerator::new(FallbackShape::Plain { min: 10, max: 20 }, Some(42)),
            5,
        );
        let mut pipeline =
            Pipeline::with_components(config, generator, accept_everything(), PllScorer::mock(Some(1)));

        let report = pipeline.run().unwrap();
        assert_eq!(report.generation, GenerationStats { real: 0, mock: 10, skipped: 0 });
        assert_eq!(report.state, TerminalState::Exported);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(PipelineState::Aborted.to_string(), "ABORTED");
        assert_eq!(PipelineState::Exported.to_string(), "EXPORTED");
    }
}
