//! Masked-scoring boundary: tokens, vocabulary and the model trait.

use std::collections::HashMap;
use std::fmt;

use crate::constants::{AMINO_ACIDS, END_TOKEN, MASK_TOKEN, START_TOKEN};
use crate::types::{Sequence, TcrForgeError};

/// One position in a framed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Start,
    End,
    Mask,
    Residue(u8),
}

impl Token {
    /// `[START] r1 .. rL [END]`
    #[must_use]
    pub fn frame(sequence: &Sequence) -> Vec<Self> {
        let mut tokens = Vec::with_capacity(sequence.len() + 2);
        tokens.push(Self::Start);
        tokens.extend(sequence.as_bytes().iter().map(|&r| Self::Residue(r)));
        tokens.push(Self::End);
        tokens
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str(START_TOKEN),
            Self::End => f.write_str(END_TOKEN),
            Self::Mask => f.write_str(MASK_TOKEN),
            Self::Residue(r) => write!(f, "{}", char::from(*r)),
        }
    }
}

/// Ordered token labels of a scoring model.
///
/// Index `i` of every probability vector the model returns refers to label
/// `i` here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// # Errors
    ///
    /// [`TcrForgeError::ModelUnavailable`] if any of the 20 standard residues
    /// is missing or a label repeats.
    pub fn new(labels: Vec<String>) -> Result<Self, TcrForgeError> {
        let mut index = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), i).is_some() {
                return Err(TcrForgeError::ModelUnavailable(format!(
                    "duplicate vocabulary entry '{label}'"
                )));
            }
        }

        let vocabulary = Self { labels, index };
        if let Some(&missing) = AMINO_ACIDS
            .iter()
            .find(|&&r| vocabulary.index_of(Token::Residue(r)).is_none())
        {
            return Err(TcrForgeError::ModelUnavailable(format!(
                "vocabulary has no entry for residue '{}'",
                char::from(missing)
            )));
        }
        Ok(vocabulary)
    }

    /// Framing tokens followed by the 20 residues.
    #[must_use]
    pub fn standard() -> Self {
        let labels: Vec<String> = [Token::Start, Token::End, Token::Mask]
            .into_iter()
            .chain(AMINO_ACIDS.iter().map(|&r| Token::Residue(r)))
            .map(|t| t.to_string())
            .collect();
        let index = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();
        Self { labels, index }
    }

    #[must_use]
    pub fn index_of(&self, token: Token) -> Option<usize> {
        self.index.get(&token.to_string()).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// A masked-token model queried one position at a time.
pub trait MaskedLanguageModel: Send + Sync {
    fn vocabulary(&self) -> &Vocabulary;

    /// Distribution over [`MaskedLanguageModel::vocabulary`] for the token
    /// at `position`, which the caller has replaced with [`Token::Mask`].
    ///
    /// # Errors
    ///
    /// Any [`TcrForgeError`]; the caller sentinel-scores the sequence.
    fn predict_masked(&self, tokens: &[Token], position: usize) -> Result<Vec<f64>, TcrForgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_adds_markers() {
        let seq = Sequence::new("CAS").unwrap();
        assert_eq!(
            Token::frame(&seq),
            vec![
                Token::Start,
                Token::Residue(b'C'),
                Token::Residue(b'A'),
                Token::Residue(b'S'),
                Token::End
            ]
        );
    }

    #[test]
    fn test_token_labels() {
        assert_eq!(Token::Mask.to_string(), "[MASK]");
        assert_eq!(Token::Residue(b'W').to_string(), "W");
    }

    #[test]
    fn test_standard_vocabulary() {
        let vocab = Vocabulary::standard();
        assert_eq!(vocab.len(), 23);
        assert_eq!(vocab.index_of(Token::Mask), Some(2));
        assert_eq!(vocab.index_of(Token::Residue(b'A')), Some(3));
        assert_eq!(Vocabulary::new(vocab.labels().to_vec()).unwrap(), vocab);
    }

    #[test]
    fn test_vocabulary_requires_all_residues() {
        let labels: Vec<String> = "ACDEFGHIKLMNPQRSTVW".chars().map(String::from).collect();
        assert!(matches!(
            Vocabulary::new(labels),
            Err(TcrForgeError::ModelUnavailable(msg)) if msg.contains("'Y'")
        ));
    }

    #[test]
    fn test_vocabulary_rejects_duplicates() {
        let mut labels: Vec<String> = AMINO_ACIDS.iter().map(|&r| char::from(r).to_string()).collect();
        labels.push("A".to_string());
        assert!(Vocabulary::new(labels).is_err());
    }
}
