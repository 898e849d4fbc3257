//! Similarity & Duplication Engine (C7, spec §4.7): fuses exact-hash,
//! cosine, token-Jaccard, and structural fingerprint scores into
//! classified duplicate groups.

pub mod application;
pub mod domain;

pub use application::{DuplicateEngine, DuplicateReport, DuplicateStats, SimilarityMatch};
pub use domain::{classify_pair, jaccard, sim_struct, sim_tok, structural_tokens, tokenize};
