pub mod extract_usecase;

pub use extract_usecase::{resolve_references, ExtractionOutcome, Extractor};
