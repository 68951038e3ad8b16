//! Alphabet handling and DNA → protein translation.
//!
//! Generated candidates cross an alphabet boundary: the generative model
//! speaks DNA, the filter and ranker speak protein. This module owns that
//! boundary.
//!
//! ## Modules
//!
//! - [`alphabet`]: DNA/protein alphabet checks and seed normalization
//! - [`translation`]: codon table and the candidate translator
//!
//! ## Examples
//!
//! ```rust
//! use tcrforge_core::sequence::{translate, translate_to_stop};
//!
//! // Stop codon TAG ends translation
//! assert_eq!(translate_to_stop("TGCGCCAGCTAG"), Ok("CAS".to_string()));
//!
//! // Candidates shorter than five residues are skipped
//! assert!(translate("TGCGCCAGCTAG").is_err());
//! assert_eq!(translate("TGCGCCAGCAGCTTCTAA").unwrap().as_str(), "CASSF");
//! ```

pub mod alphabet;
pub mod translation;

pub use alphabet::*;
pub use translation::*;
