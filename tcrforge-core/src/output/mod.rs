//! Result export.
//!
//! Writers for the two tabular artifacts an exported run leaves behind.
//!
//! ## Formats
//!
//! - **Candidates**: `CDR3,BERT_PLL_Score,Status`, one row per ranked
//!   candidate, best first
//! - **Docking jobs**: `id,cdr3_sequence,target`, one row per top-N
//!   candidate with ids `candidate_1`, `candidate_2`, ...
//!
//! ## Examples
//!
//! ```rust
//! use tcrforge_core::output::{ExportFormat, write_results};
//! use tcrforge_core::types::{RankedResult, ScoreStatus, ScoredCandidate, ScoringMode, Sequence};
//!
//! let ranked = RankedResult::from_unsorted(
//!     vec![ScoredCandidate {
//!         sequence: Sequence::new("CASSLGQETQYF")?,
//!         score: -0.42,
//!         status: ScoreStatus::Ranked,
//!     }],
//!     ScoringMode::Model,
//! );
//!
//! let mut out = Vec::new();
//! write_results(&mut out, &ranked, &ExportFormat::Candidates)?;
//! assert_eq!(String::from_utf8(out)?, "CDR3,BERT_PLL_Score,Status\nCASSLGQETQYF,-0.42,Ranked\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::constants::{CANDIDATES_FILE, DOCKING_JOBS_DIR, DOCKING_OUTPUT_DIR};
use crate::results::ExportPaths;
use crate::types::{RankedResult, TcrForgeError};

mod formats {
    use std::io::Write;

    use csv::{Terminator, WriterBuilder};

    pub mod candidates;
    pub mod docking;

    /// CSV writer with `\n` line endings and quoting only where needed.
    pub fn table_writer<W: Write>(writer: W) -> csv::Writer<W> {
        WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(writer)
    }
}

pub use formats::candidates::{CANDIDATES_HEADER, write_candidates_format};
pub use formats::docking::{DOCKING_HEADER, write_docking_format};

/// Which artifact to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportFormat {
    /// Full ranked table
    Candidates,
    /// Top-N hand-off for the docking tool
    DockingJobs { target: String, top_n: usize },
}

/// Writes `ranked` in the requested format.
///
/// # Errors
///
/// Returns [`TcrForgeError::IoError`] or [`TcrForgeError::Csv`] if writing
/// fails.
pub fn write_results<W: Write>(
    writer: &mut W,
    ranked: &RankedResult,
    format: &ExportFormat,
) -> Result<(), TcrForgeError> {
    match format {
        ExportFormat::Candidates => write_candidates_format(writer, ranked),
        ExportFormat::DockingJobs { target, top_n } => {
            write_docking_format(writer, ranked, target, *top_n)
        }
    }
}

/// File-system-safe form of a target name.
#[must_use]
pub fn job_file_stem(target: &str) -> Cow<'_, str> {
    let safe = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.');
    if target.chars().all(safe) && !target.is_empty() {
        Cow::Borrowed(target)
    } else {
        Cow::Owned(
            target
                .chars()
                .map(|c| if safe(c) { c } else { '_' })
                .collect(),
        )
    }
}

/// Writes both artifacts under `results_dir`:
///
/// - `{results_dir}/candidates.csv`
/// - `{results_dir}/docking_jobs/{target}_job.csv`
///
/// Directories are created as needed.
///
/// # Errors
///
/// Returns [`TcrForgeError::IoError`] if a directory or file cannot be
/// written.
pub fn export_results(
    results_dir: &Path,
    ranked: &RankedResult,
    target: &str,
    top_n: usize,
) -> Result<ExportPaths, TcrForgeError> {
    let jobs_dir = results_dir.join(DOCKING_JOBS_DIR);
    fs::create_dir_all(&jobs_dir)?;

    let paths = ExportPaths {
        candidates: results_dir.join(CANDIDATES_FILE),
        docking_job: jobs_dir.join(format!("{}_job.csv", job_file_stem(target))),
        docking_output: results_dir.join(DOCKING_OUTPUT_DIR),
    };

    write_file(&paths.candidates, ranked, &ExportFormat::Candidates)?;
    info!("Results saved to {}", paths.candidates.display());

    write_file(
        &paths.docking_job,
        ranked,
        &ExportFormat::DockingJobs {
            target: target.to_string(),
            top_n,
        },
    )?;
    info!("Docking job created: {}", paths.docking_job.display());

    Ok(paths)
}

fn write_file(path: &Path, ranked: &RankedResult, format: &ExportFormat) -> Result<(), TcrForgeError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_results(&mut writer, ranked, format)?;
    writer.flush()?;
    Ok(())
}
