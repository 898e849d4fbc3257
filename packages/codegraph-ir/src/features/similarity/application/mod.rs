pub mod duplicate_engine;

pub use duplicate_engine::{DuplicateEngine, DuplicateReport, DuplicateStats, SimilarityMatch};
