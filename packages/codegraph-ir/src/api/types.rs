//! Query API result types (spec §6).

use crate::domain::ChangeCounts;
use crate::shared::models::Span;

/// Outcome of one `Engine::ingest` pass (spec §4.2/§7: per-stage
/// `{processed, skipped, failed}` counts, plus the ledger's own
/// added/modified/deleted/unchanged classification).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub counts: ChangeCounts,
    pub scan_skipped: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub parse_failures: usize,
    pub units_embedded: usize,
    pub units_cache_hits: usize,
    pub units_failed: usize,
    /// `false` when the embedding run exceeded `max_error_rate`: the
    /// unit/edge state for this pass is already written, but the
    /// ledger commit for the affected paths is withheld so the next
    /// `ingest` reprocesses them (spec §4.5/§7 Failure).
    pub embedding_succeeded: bool,
    /// `true` if a cancellation signal stopped the pass before every
    /// classified file was processed (spec §5).
    pub cancelled: bool,
}

/// One hit from `Engine::search` (spec §6).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub unit_id: String,
    pub file_path: String,
    pub span: Span,
    pub snippet: String,
    pub score: f64,
    pub match_type: String,
}
