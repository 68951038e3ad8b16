use std::io::Write;

use super::table_writer;
use crate::types::{RankedResult, TcrForgeError};

/// Column header of the docking job table
pub const DOCKING_HEADER: &str = "id,cdr3_sequence,target";

/// Write one docking job per top candidate, ids starting at `candidate_1`
pub fn write_docking_format<W: Write>(
    writer: &mut W,
    ranked: &RankedResult,
    target: &str,
    top_n: usize,
) -> Result<(), TcrForgeError> {
    let mut table = table_writer(writer);
    table.write_record(DOCKING_HEADER.split(','))?;
    for (rank, candidate) in ranked.top(top_n).iter().enumerate() {
        let id = format!("candidate_{}", rank + 1);
        table.write_record([id.as_str(), candidate.sequence.as_str(), target])?;
    }
    table.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ScoreStatus, ScoredCandidate, ScoringMode, Sequence};

    fn ranked(n: usize) -> RankedResult {
        let pool = ["CASSF", "CASSL", "CASRD", "CASSQ", "CASSP", "CASSG", "CASSE"];
        RankedResult::from_unsorted(
            pool.iter()
                .take(n)
                .enumerate()
                .map(|(i, s)| ScoredCandidate {
                    sequence: Sequence::new(s).unwrap(),
                    score: -(i as f64),
                    status: ScoreStatus::Ranked,
                })
                .collect(),
            ScoringMode::Model,
        )
    }

    #[test]
    fn test_docking_top_n() {
        let mut buffer = Vec::new();
        write_docking_format(&mut buffer, &ranked(7), "KRAS_G12D", 5).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        insta::assert_snapshot!(output, @r"
        id,cdr3_sequence,target
        candidate_1,CASSF,KRAS_G12D
        candidate_2,CASSL,KRAS_G12D
        candidate_3,CASRD,KRAS_G12D
        candidate_4,CASSQ,KRAS_G12D
        candidate_5,CASSP,KRAS_G12D
        ");
    }

    #[test]
    fn test_docking_fewer_than_top_n() {
        let mut buffer = Vec::new();
        write_docking_format(&mut buffer, &ranked(2), "HLA-A*02:01", 5).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output.lines().count(), 3);
        assert_eq!(output.lines().last(), Some("candidate_2,CASSL,HLA-A*02:01"));
    }

    #[test]
    fn test_docking_quotes_target_with_comma() {
        let mut buffer = Vec::new();
        write_docking_format(&mut buffer, &ranked(1), "MAGE-A4, HLA-A2", 5).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output.lines().nth(1), Some("candidate_1,CASSF,\"MAGE-A4, HLA-A2\""));
    }

    #[test]
    fn test_docking_escapes_quotes_in_target() {
        let mut buffer = Vec::new();
        write_docking_format(&mut buffer, &ranked(1), "KRAS \"G12D\"", 1).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output, "id,cdr3_sequence,target\ncandidate_1,CASSF,\"KRAS \"\"G12D\"\"\"\n");
    }
}
