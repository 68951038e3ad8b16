use crate::constants::{CODON_LENGTH, MIN_PROTEIN_LENGTH};
use crate::sequence::alphabet::clean_dna;
use crate::types::{Sequence, SkipReason};

/// Marker for stop codons in [`STANDARD_CODE`]
const STOP: u8 = b'*';

// Codon order: AAA, AAC, AAG, AAT, ACA, ..., TTG, TTT (A=0, C=1, G=2, T=3)

/// Standard genetic code (NCBI table 1).
const STANDARD_CODE: [u8; 64] = [
    b'K', b'N', b'K', b'N', b'T', b'T', b'T', b'T', b'R', b'S', b'R', b'S',
    b'I', b'I', b'M', b'I', b'Q', b'H', b'Q', b'H', b'P', b'P', b'P', b'P',
    b'R', b'R', b'R', b'R', b'L', b'L', b'L', b'L', b'E', b'D', b'E', b'D',
    b'A', b'A', b'A', b'A', b'G', b'G', b'G', b'G', b'V', b'V', b'V', b'V',
    b'*', b'Y', b'*', b'Y', b'S', b'S', b'S', b'S', b'*', b'C', b'W', b'C',
    b'L', b'F', b'L', b'F',
];

const fn base_index(b: u8) -> Option<usize> {
    match b.to_ascii_uppercase() {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

fn codon_index(codon: &[u8]) -> Option<usize> {
    if codon.len() != CODON_LENGTH {
        return None;
    }
    Some(base_index(codon[0])? * 16 + base_index(codon[1])? * 4 + base_index(codon[2])?)
}

/// Amino acid for a single codon, `*` for stops.
///
/// Returns `None` for anything that is not exactly three nucleotides.
#[must_use]
pub fn translate_codon(codon: &[u8]) -> Option<u8> {
    codon_index(codon).map(|idx| STANDARD_CODE[idx])
}

/// Translates `dna` in frame 0 up to the first stop codon.
///
/// Non-nucleotide characters are removed first. Trailing bases that do not
/// fill a codon are ignored. The result may be shorter than
/// [`MIN_PROTEIN_LENGTH`]; use [`translate`] for candidate-level checks.
///
/// # Errors
///
/// [`SkipReason::NoCodons`] when fewer than three nucleotides remain.
pub fn translate_to_stop(dna: &str) -> Result<String, SkipReason> {
    let cleaned = clean_dna(dna);
    if cleaned.len() < CODON_LENGTH {
        return Err(SkipReason::NoCodons(cleaned.len()));
    }

    let mut protein = String::with_capacity(cleaned.len() / CODON_LENGTH);
    for codon in cleaned.as_bytes().chunks_exact(CODON_LENGTH) {
        let residue = translate_codon(codon).ok_or_else(|| {
            SkipReason::MalformedCodon(String::from_utf8_lossy(codon).into_owned())
        })?;
        if residue == STOP {
            break;
        }
        protein.push(char::from(residue));
    }
    Ok(protein)
}

/// Turns one raw generated DNA fragment into a candidate protein.
///
/// # Errors
///
/// Any [`SkipReason`]: empty input, no complete codon, a malformed triplet,
/// or a protein shorter than [`MIN_PROTEIN_LENGTH`]. A failure only drops
/// this fragment.
pub fn translate(dna: &str) -> Result<Sequence, SkipReason> {
    if dna.trim().is_empty() {
        return Err(SkipReason::EmptyOutput);
    }
    let protein = translate_to_stop(dna)?;
    if protein.len() < MIN_PROTEIN_LENGTH {
        return Err(SkipReason::TooShort {
            protein,
            minimum: MIN_PROTEIN_LENGTH,
        });
    }
    Sequence::new(&protein).map_err(|_| SkipReason::InvalidResidue(protein))
}
