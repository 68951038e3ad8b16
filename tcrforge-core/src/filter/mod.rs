//! Environmental-survival filter.
//!
//! Every candidate runs through the same ordered rule list and stops at the
//! first rule it fails:
//!
//! 1. **Tonic signaling risk**: GRAVY above the threshold (default 0.5)
//! 2. **Motif stability**: any banned dipeptide present (default `NG`, `NS`)
//!
//! Candidates that cannot be scored at all (foreign characters) are rejected
//! rather than raised as errors. The filter is a pure function of its rules
//! and input, so repeated calls give identical survivors and reasons.
//!
//! ## Examples
//!
//! ```rust
//! use tcrforge_core::filter::SurvivalFilter;
//!
//! let filter = SurvivalFilter::default();
//! let outcome = filter.apply_all(&["CASSLGQETQYF", "WAAAAAAAAAAAAAAAAAC", "CASNGQETQYF"]);
//!
//! assert_eq!(outcome.survivors.len(), 1);
//! assert!(outcome.rejections[0].contains("Tonic Signaling"));
//! assert!(outcome.rejections[1].contains("Unstable Motif (NG)"));
//! ```

pub mod hydropathy;

use std::sync::Arc;

pub use hydropathy::{gravy, kyte_doolittle};

use crate::config::TmeConstraint;
use crate::constants::{DEFAULT_BANNED_MOTIFS, DEFAULT_GRAVY_THRESHOLD};
use crate::types::{FilterDecision, Sequence};
use crate::worker::WorkerPool;

/// Message attached to candidates that pass every rule
pub const PASSED: &str = "Passed";

/// A single survival check.
#[derive(Debug, Clone, PartialEq)]
pub enum SurvivalRule {
    /// Hydrophobic CDR3s drive antigen-independent signaling and exhaustion
    TonicSignalingRisk { threshold: f64 },
    /// Deamidation/isomerization-prone motifs degrade in the acidic TME
    MotifBan { motifs: Vec<String> },
}

impl SurvivalRule {
    /// `Ok` if the candidate survives, otherwise the rejection message.
    ///
    /// # Errors
    ///
    /// The rejection message when the rule fails.
    pub fn check(&self, sequence: &Sequence) -> Result<(), String> {
        match self {
            Self::TonicSignalingRisk { threshold } => {
                let score = gravy(sequence);
                if score > *threshold {
                    Err(format!(
                        "Rejected: High Tonic Signaling Risk (GRAVY: {score:.2})"
                    ))
                } else {
                    Ok(())
                }
            }
            Self::MotifBan { motifs } => match motifs
                .iter()
                .find(|motif| sequence.as_str().contains(motif.as_str()))
            {
                Some(motif) => Err(format!("Rejected: Unstable Motif ({motif})")),
                None => Ok(()),
            },
        }
    }
}

/// Result of filtering one batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterOutcome {
    /// Accepted candidates in input order
    pub survivors: Vec<Sequence>,
    /// One message per rejected candidate, in input order
    pub rejections: Vec<String>,
    /// One decision per input candidate, in input order
    pub decisions: Vec<FilterDecision>,
}

impl FilterOutcome {
    /// Percentage of candidates removed (0 for an empty batch).
    #[must_use]
    pub fn rejection_rate(&self) -> f64 {
        if self.decisions.is_empty() {
            0.0
        } else {
            (1.0 - self.survivors.len() as f64 / self.decisions.len() as f64) * 100.0
        }
    }
}

/// Applies the ordered survival rules to candidate batches.
#[derive(Debug, Clone)]
pub struct SurvivalFilter {
    rules: Vec<SurvivalRule>,
    pool: Arc<WorkerPool>,
}

impl Default for SurvivalFilter {
    fn default() -> Self {
        Self::from_constraints(&[])
    }
}

impl SurvivalFilter {
    /// Builds the rule list from configured constraints.
    ///
    /// The first `tonic_signaling_risk` entry sets the GRAVY threshold
    /// (default 0.5); the first `motif_ban` entry sets the banned motifs
    /// (default `NG`, `NS`). Rules always run hydropathy first.
    #[must_use]
    pub fn from_constraints(constraints: &[TmeConstraint]) -> Self {
        let threshold = constraints
            .iter()
            .find_map(|c| match c {
                TmeConstraint::TonicSignalingRisk { threshold } => Some(*threshold),
                TmeConstraint::MotifBan { .. } => None,
            })
            .unwrap_or(DEFAULT_GRAVY_THRESHOLD);

        let motifs = constraints
            .iter()
            .find_map(|c| match c {
                TmeConstraint::MotifBan { motifs } => Some(
                    motifs
                        .iter()
                        .map(|m| m.trim().to_ascii_uppercase())
                        .collect::<Vec<_>>(),
                ),
                TmeConstraint::TonicSignalingRisk { .. } => None,
            })
            .unwrap_or_else(|| DEFAULT_BANNED_MOTIFS.iter().map(|m| (*m).to_string()).collect());

        Self::with_rules(vec![
            SurvivalRule::TonicSignalingRisk { threshold },
            SurvivalRule::MotifBan { motifs },
        ])
    }

    /// Uses `rules` verbatim, in the given order.
    #[must_use]
    pub fn with_rules(rules: Vec<SurvivalRule>) -> Self {
        Self {
            rules,
            pool: Arc::new(WorkerPool::global()),
        }
    }

    /// Runs per-candidate checks on `pool` instead of rayon's global pool.
    #[must_use]
    pub fn with_pool(mut self, pool: Arc<WorkerPool>) -> Self {
        self.pool = pool;
        self
    }

    #[must_use]
    pub fn rules(&self) -> &[SurvivalRule] {
        &self.rules
    }

    /// Decides a single candidate.
    #[must_use]
    pub fn evaluate(&self, candidate: &str) -> FilterDecision {
        let reason = match Sequence::new(candidate) {
            Ok(sequence) => self
                .rules
                .iter()
                .find_map(|rule| rule.check(&sequence).err())
                .unwrap_or_else(|| PASSED.to_string()),
            Err(_) => "Rejected: Unscorable Sequence (invalid residues)".to_string(),
        };

        FilterDecision {
            sequence: candidate.to_string(),
            passed: reason == PASSED,
            reason,
        }
    }

    /// Filters a batch. Survivors and rejections keep input order.
    pub fn apply_all<S>(&self, candidates: &[S]) -> FilterOutcome
    where
        S: AsRef<str> + Sync,
    {
        let decisions = self
            .pool
            .map_indexed(candidates, |_, candidate| self.evaluate(candidate.as_ref()));

        let mut outcome = FilterOutcome::default();
        for decision in &decisions {
            if decision.passed {
                // evaluate() only passes sequences that validated
                if let Ok(sequence) = Sequence::new(&decision.sequence) {
                    outcome.survivors.push(sequence);
                }
            } else {
                outcome.rejections.push(decision.reason.clone());
            }
        }
        outcome.decisions = decisions;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let filter = SurvivalFilter::default();
        assert_eq!(
            filter.rules(),
            &[
                SurvivalRule::TonicSignalingRisk { threshold: 0.5 },
                SurvivalRule::MotifBan {
                    motifs: vec!["NG".to_string(), "NS".to_string()]
                },
            ]
        );
    }

    #[test]
    fn test_constraints_override_defaults_regardless_of_order() {
        let filter = SurvivalFilter::from_constraints(&[
            TmeConstraint::MotifBan {
                motifs: vec!["dg".to_string()],
            },
            TmeConstraint::TonicSignalingRisk { threshold: -1.0 },
        ]);
        assert_eq!(
            filter.rules(),
            &[
                SurvivalRule::TonicSignalingRisk { threshold: -1.0 },
                SurvivalRule::MotifBan {
                    motifs: vec!["DG".to_string()]
                },
            ]
        );
    }

    #[test]
    fn test_hydrophobic_sequence_rejected_for_tonic_signaling() {
        let decision = SurvivalFilter::default().evaluate("WAAAAAAAAAAAAAAAAAC");
        assert!(!decision.passed);
        assert!(decision.reason.contains("Tonic Signaling"));
        assert_eq!(decision.reason, "Rejected: High Tonic Signaling Risk (GRAVY: 1.69)");
    }

    #[test]
    fn test_motif_rule_rejects_after_hydropathy_passes() {
        let decision = SurvivalFilter::default().evaluate("CASSDNGQETQYF");
        assert!(!decision.passed);
        assert_eq!(decision.reason, "Rejected: Unstable Motif (NG)");
    }

    #[test]
    fn test_hydropathy_reported_first_when_both_fail() {
        // Hydrophobic and carrying NG: the first rule names the rejection
        let decision = SurvivalFilter::default().evaluate("LLLLLLNGLLLL");
        assert!(decision.reason.contains("Tonic Signaling"));
    }

    #[test]
    fn test_invalid_characters_rejected_not_raised() {
        let filter = SurvivalFilter::default();
        for bad in ["CASX", "", "CAS*QY"] {
            let decision = filter.evaluate(bad);
            assert!(!decision.passed);
            assert!(decision.reason.contains("Unscorable"));
        }
    }

    #[test]
    fn test_apply_all_preserves_order_and_counts() {
        let filter = SurvivalFilter::default();
        let candidates = vec![
            "CASSLGQETQYF",
            "WAAAAAAAAAAAAAAAAAC",
            "CASRDSYEQYF",
            "CASNSQETQYF",
            "CASSPTGELFY",
        ];
        let outcome = filter.apply_all(&candidates);

        let survivors: Vec<_> = outcome.survivors.iter().map(Sequence::as_str).collect();
        assert_eq!(survivors, vec!["CASSLGQETQYF", "CASRDSYEQYF", "CASSPTGELFY"]);
        assert_eq!(outcome.rejections.len(), 2);
        assert!(outcome.rejections[0].contains("Tonic Signaling"));
        assert_eq!(outcome.rejections[1], "Rejected: Unstable Motif (NS)");
        assert_eq!(outcome.decisions.len(), candidates.len());
        assert!((outcome.rejection_rate() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_all_is_deterministic() {
        let filter = SurvivalFilter::default().with_pool(Arc::new(WorkerPool::new(Some(3)).unwrap()));
        let candidates: Vec<String> = [
            "CASSLGQETQYF",
            "WAAAAAAAAAAAAAAAAAC",
            "CASNGQETQYF",
            "CAXX",
            "CASSIRSSYEQYF",
        ]
        .iter()
        .cycle()
        .take(60)
        .map(|s| (*s).to_string())
        .collect();

        let first = filter.apply_all(&candidates);
        let second = filter.apply_all(&candidates);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_batch() {
        let outcome = SurvivalFilter::default().apply_all::<&str>(&[]);
        assert!(outcome.survivors.is_empty());
        assert!(outcome.rejections.is_empty());
        assert_eq!(outcome.rejection_rate(), 0.0);
    }
}
