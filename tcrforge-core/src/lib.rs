//! # tcrforge
//!
//! Candidate generation, environmental-survival filtering and
//! pseudo-log-likelihood ranking for T-cell receptor CDR3 design.
//!
//! ## Overview
//!
//! A design run takes a target and a seed and produces a ranked list of CDR3
//! candidates plus a docking job for the best of them:
//!
//! 1. **Generate**: extend a DNA seed with the Evo2 genomic model and
//!    translate the output, backfilling from a local random generator
//! 2. **Filter**: reject hydrophobic (tonic signaling risk) and
//!    deamidation-prone (motif) candidates
//! 3. **Rank**: score survivors by masked-token pseudo-log-likelihood
//! 4. **Export**: write the ranked table and the top-N docking hand-off
//!
//! Both external models are optional. Without an API credential generation
//! is local; without a reachable scoring service ranking is mock and marked
//! as such.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tcrforge_core::{Pipeline, config::PipelineConfig};
//!
//! let config = PipelineConfig::from_path("config.yaml")?;
//! let mut pipeline = Pipeline::from_config(config)?;
//! let report = pipeline.run()?;
//!
//! println!("{}: {} survivors", report.state, report.filter.survivors);
//! # Ok::<(), tcrforge_core::types::TcrForgeError>(())
//! ```
//!
//! ## Architecture
//!
//! Runs move through a type-state machine, so a stage can only be reached
//! with the previous stage's output:
//!
//! ```text
//! INIT -> GENERATED -> FILTERED -> ABORTED
//!                              \-> RANKED -> EXPORTED
//! ```
//!
//! See [`pipeline::DesignRun`].
//!
//! ## Module Organization
//!
//! - [`config`]: YAML run configuration
//! - [`sequence`]: alphabets, seed normalization, DNA translation
//! - [`generation`]: Evo2 client, local fallback, [`generation::SequenceGenerator`]
//! - [`filter`]: GRAVY and motif survival rules
//! - [`scoring`]: masked-LM boundary and [`scoring::PllScorer`]
//! - [`pipeline`]: stage orchestration
//! - [`output`]: CSV writers for results and docking jobs
//! - [`worker`]: order-preserving worker pool
//! - [`types`]: core data types and [`types::TcrForgeError`]
//!
//! ## Error Handling
//!
//! Only configuration problems and I/O failures surface as
//! [`TcrForgeError`](types::TcrForgeError). Everything else degrades:
//!
//! - transport failures switch generation to the local fallback
//! - an unreachable scoring model switches ranking to mock mode
//! - bad candidates are skipped, rejected or sentinel-scored
//! - an empty survivor set ends the run as aborted, not as an error

pub mod config;
pub mod constants;
pub mod filter;
pub mod generation;
pub mod output;
pub mod pipeline;
pub mod results;
pub mod scoring;
pub mod sequence;
pub mod types;
pub mod worker;

pub use pipeline::Pipeline;
