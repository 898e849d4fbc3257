//! C1 — File Scanner (spec §4.1).
//!
//! Walks the project root and returns a stable, ordered list of
//! candidate files under the include/exclude rules, without opening
//! file contents.

pub mod application;
pub mod infrastructure;

pub use application::scan_usecase::{ScanOutcome, Scanner};
pub use infrastructure::walker::ScannedFile;
