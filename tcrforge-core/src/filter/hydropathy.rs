//! Kyte-Doolittle hydropathy and GRAVY.

use crate::types::Sequence;

/// Kyte-Doolittle (1982) hydropathy for one residue.
///
/// `None` for anything outside the 20 standard amino acids.
#[must_use]
pub fn kyte_doolittle(residue: u8) -> Option<f64> {
    let value = match residue.to_ascii_uppercase() {
        b'A' => 1.8,
        b'C' => 2.5,
        b'D' => -3.5,
        b'E' => -3.5,
        b'F' => 2.8,
        b'G' => -0.4,
        b'H' => -3.2,
        b'I' => 4.5,
        b'K' => -3.9,
        b'L' => 3.8,
        b'M' => 1.9,
        b'N' => -3.5,
        b'P' => -1.6,
        b'Q' => -3.5,
        b'R' => -4.5,
        b'S' => -0.8,
        b'T' => -0.7,
        b'V' => 4.2,
        b'W' => -0.9,
        b'Y' => -1.3,
        _ => return None,
    };
    Some(value)
}

/// Grand average of hydropathy: mean Kyte-Doolittle value over all residues.
///
/// Positive values are hydrophobic ("sticky"), negative values hydrophilic.
///
/// ```rust
/// use tcrforge_core::filter::gravy;
/// use tcrforge_core::types::Sequence;
///
/// let seq = Sequence::new("AAAAA").unwrap();
/// assert!((gravy(&seq) - 1.8).abs() < 1e-12);
/// ```
#[must_use]
pub fn gravy(sequence: &Sequence) -> f64 {
    let total: f64 = sequence
        .as_bytes()
        .iter()
        .filter_map(|&residue| kyte_doolittle(residue))
        .sum();
    total / sequence.len() as f64
}
