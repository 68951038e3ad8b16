use std::io::Write;

use super::table_writer;
use crate::types::{RankedResult, TcrForgeError};

/// Column header of the ranked candidate table
pub const CANDIDATES_HEADER: &str = "CDR3,BERT_PLL_Score,Status";

/// Write the ranked candidate table, best first
pub fn write_candidates_format<W: Write>(
    writer: &mut W,
    ranked: &RankedResult,
) -> Result<(), TcrForgeError> {
    let mut table = table_writer(writer);
    table.write_record(CANDIDATES_HEADER.split(','))?;
    for candidate in &ranked.candidates {
        let score = candidate.score.to_string();
        let status = candidate.status.to_string();
        table.write_record([candidate.sequence.as_str(), score.as_str(), status.as_str()])?;
    }
    table.flush()?;
    Ok(())
}
