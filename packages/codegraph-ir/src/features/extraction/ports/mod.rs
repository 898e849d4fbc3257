//! Unit Extractor port (spec §4.3).
//!
//! "Each language plugin implements: `parse(source) -> AST`,
//! `walk(AST) -> units`, `calls(unit) -> names`, `imports(file) ->
//! module_refs`." Here that contract is a single `LanguagePlugin`
//! trait producing units, edges (contains only — calls/extends/
//! implements are resolved in a second pass, see `PendingReference`)
//! and pending references in one pass over the parsed tree, since a
//! tree-sitter `Tree` already makes `calls`/`imports` trivial
//! sub-traversals rather than needing separate entry points.

use crate::domain::{Edge, Unit};
use crate::features::extraction::domain::PendingReference;
use crate::shared::models::Result;
use crate::shared::ports::Language;

/// The output of walking one file's AST.
#[derive(Debug, Default)]
pub struct WalkOutput {
    pub units: Vec<Unit>,
    /// Edges fully resolved within this file alone (`contains`, and
    /// intra-file `extends`/`implements`/`calls` when the target unit
    /// was also found in this file).
    pub edges: Vec<Edge>,
    /// Name-only references that still need a second pass against the
    /// full project unit table (spec §4.3).
    pub pending: Vec<PendingReference>,
    /// Raw import specifiers found in the file (module_refs), for
    /// callers that want the list without edge semantics.
    pub imports: Vec<String>,
}

/// A language-specific parsing plugin (spec §4.3).
pub trait LanguagePlugin: Send + Sync {
    fn language(&self) -> Language;

    /// Parse source into a tree-sitter tree. Non-fatal per file: the
    /// caller falls back to the line-window block extractor on error
    /// (spec §4.3 Failure).
    fn parse(&self, source: &str) -> Result<tree_sitter::Tree>;

    /// Walk a parsed tree into units, edges, and pending references.
    fn walk(&self, tree: &tree_sitter::Tree, source: &str, file_path: &str) -> WalkOutput;
}
