//! Scanner use-case: wires `Config` into a deterministic filesystem walk.

use crate::config::Config;
use crate::features::scanner::infrastructure::walker::{self, ScannedFile, WalkOptions};
use std::path::Path;
use tracing::info;

pub struct ScanOutcome {
    pub files: Vec<ScannedFile>,
    pub skipped_entries: usize,
}

/// File Scanner (C1). Deterministic for a given filesystem snapshot;
/// never opens file contents (spec §4.1).
pub struct Scanner<'a> {
    config: &'a Config,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn scan(&self, root: impl AsRef<Path>) -> ScanOutcome {
        let opts = WalkOptions::new(
            root.as_ref(),
            &self.config.include_globs,
            &self.config.exclude_globs,
            self.config.max_file_bytes,
            false,
        );
        let result = walker::walk(&opts);
        info!(
            found = result.files.len(),
            skipped = result.skipped_entries,
            "scanner: pass complete"
        );
        ScanOutcome {
            files: result.files,
            skipped_entries: result.skipped_entries,
        }
    }
}
