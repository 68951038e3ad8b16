use bio::alphabets::{dna, protein, Alphabet};
use std::sync::OnceLock;

use crate::constants::DEFAULT_DNA_SEED;

fn dna_alphabet() -> &'static Alphabet {
    static DNA: OnceLock<Alphabet> = OnceLock::new();
    DNA.get_or_init(dna::alphabet)
}

fn protein_alphabet() -> &'static Alphabet {
    static PROTEIN: OnceLock<Alphabet> = OnceLock::new();
    PROTEIN.get_or_init(protein::alphabet)
}

/// Whether every byte is one of `ACGT` (either case). Empty input is not DNA.
#[must_use]
pub fn is_dna(text: &[u8]) -> bool {
    !text.is_empty() && dna_alphabet().is_word(text)
}

/// Whether every byte is one of the 20 standard residues (either case).
#[must_use]
pub fn is_protein(text: &[u8]) -> bool {
    !text.is_empty() && protein_alphabet().is_word(text)
}

/// Drops everything that is not a nucleotide and upper-cases the rest.
///
/// ```rust
/// use tcrforge_core::sequence::clean_dna;
///
/// assert_eq!(clean_dna("tg c-GC\nN"), "TGCGC");
/// ```
#[must_use]
pub fn clean_dna(raw: &str) -> String {
    raw.bytes()
        .filter(|b| dna_alphabet().is_word(std::iter::once(*b)))
        .map(|b| char::from(b.to_ascii_uppercase()))
        .collect()
}

/// Normalizes a generation seed to DNA.
///
/// A seed containing any non-nucleotide character is treated as protein and
/// replaced by [`DEFAULT_DNA_SEED`]. DNA seeds are upper-cased.
///
/// ```rust
/// use tcrforge_core::sequence::normalize_seed;
///
/// assert_eq!(normalize_seed("CAS"), "TGCGCCAGC");
/// assert_eq!(normalize_seed("acgt"), "ACGT");
/// ```
#[must_use]
pub fn normalize_seed(seed: &str) -> String {
    let trimmed = seed.trim();
    if is_dna(trimmed.as_bytes()) {
        trimmed.to_ascii_uppercase()
    } else {
        DEFAULT_DNA_SEED.to_string()
    }
}
