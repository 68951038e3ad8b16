//! Local random candidate generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::FallbackConfig;
use crate::constants::{AMINO_ACIDS, FLANK_END, FLANK_START};
use crate::types::Sequence;

/// Layout of a locally generated candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackShape {
    /// `min..=max` i.i.d. residues
    Plain { min: usize, max: usize },
    /// `W`, then `min..=max` i.i.d. residues, then `C`
    Flanked { min: usize, max: usize },
}

impl FallbackShape {
    #[must_use]
    pub fn from_config(config: &FallbackConfig) -> Self {
        let (min, max) = config.length_range();
        if config.flanked {
            Self::Flanked { min, max }
        } else {
            Self::Plain { min, max }
        }
    }

    fn core_range(self) -> (usize, usize) {
        match self {
            Self::Plain { min, max } | Self::Flanked { min, max } => (min, max),
        }
    }
}

/// Draws candidates uniformly from the amino-acid alphabet.
///
/// Seeded runs are reproducible: the same seed and shape always give the
/// same sequence of candidates.
#[derive(Debug, Clone)]
pub struct FallbackGenerator {
    rng: StdRng,
    shape: FallbackShape,
}

impl FallbackGenerator {
    /// A generator seeded with `seed`, or from OS entropy for `None`.
    #[must_use]
    pub fn new(shape: FallbackShape, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, shape }
    }

    #[must_use]
    pub const fn shape(&self) -> FallbackShape {
        self.shape
    }

    /// One random candidate.
    pub fn next_sequence(&mut self) -> Sequence {
        let (min, max) = self.shape.core_range();
        let length = self.rng.gen_range(min..=max);

        let mut residues = Vec::with_capacity(length + 2);
        if matches!(self.shape, FallbackShape::Flanked { .. }) {
            residues.push(FLANK_START);
        }
        residues.extend((0..length).map(|_| AMINO_ACIDS[self.rng.gen_range(0..AMINO_ACIDS.len())]));
        if matches!(self.shape, FallbackShape::Flanked { .. }) {
            residues.push(FLANK_END);
        }

        Sequence::from_standard_residues(residues)
    }

    /// `count` random candidates.
    pub fn generate(&mut self, count: usize) -> Vec<Sequence> {
        (0..count).map(|_| self.next_sequence()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::alphabet::is_protein;

    #[test]
    fn test_plain_lengths_within_range() {
        let mut generator = FallbackGenerator::new(FallbackShape::Plain { min: 10, max: 20 }, Some(7));
        for seq in generator.generate(200) {
            assert!((10..=20).contains(&seq.len()), "{seq}");
            assert!(is_protein(seq.as_bytes()));
        }
    }

    #[test]
    fn test_flanked_anchors() {
        let mut generator =
            FallbackGenerator::new(FallbackShape::Flanked { min: 16, max: 22 }, Some(7));
        for seq in generator.generate(100) {
            let s = seq.as_str();
            assert!(s.starts_with('W') && s.ends_with('C'), "{s}");
            assert!((18..=24).contains(&seq.len()));
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let shape = FallbackShape::Plain { min: 10, max: 20 };
        let first = FallbackGenerator::new(shape, Some(42)).generate(25);
        let second = FallbackGenerator::new(shape, Some(42)).generate(25);
        assert_eq!(first, second);

        let other = FallbackGenerator::new(shape, Some(43)).generate(25);
        assert_ne!(first, other);
    }

    #[test]
    fn test_shape_from_config() {
        let config = FallbackConfig {
            flanked: true,
            ..FallbackConfig::default()
        };
        assert_eq!(
            FallbackShape::from_config(&config),
            FallbackShape::Flanked { min: 16, max: 22 }
        );
        assert_eq!(
            FallbackShape::from_config(&FallbackConfig::default()),
            FallbackShape::Plain { min: 10, max: 20 }
        );
    }
}
