//! `Unit` entity (spec §3) — a semantically meaningful code region.

use crate::shared::models::ids::unit_id as compute_unit_id;
use crate::shared::ports::Language;
use serde::{Deserialize, Serialize};

/// The four unit kinds the extractor produces (spec §1, glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Class,
    Method,
    Function,
    Block,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Class => "class",
            UnitKind::Method => "method",
            UnitKind::Function => "function",
            UnitKind::Block => "block",
        }
    }
}

/// A code unit: class, method, function, or brace-delimited block.
///
/// `unit_id = hash(file_path, kind, qualified_name, start_line)` (spec §3):
/// stable across runs while the span is still identifiable, but it
/// changes when the owning file is renamed (spec scenario 3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub unit_id: String,
    pub file_path: String,
    pub kind: UnitKind,
    pub name: String,
    pub qualified_name: String,
    pub start_line: u32,
    pub end_line: u32,
    pub signature: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub parent_class: Option<String>,
    pub language: Language,
    /// Implementation-defined; not load-bearing for any correctness
    /// invariant (spec §9 Open Questions).
    pub complexity: u32,
    pub calls_to: Vec<CallTarget>,
    /// Raw (pre-normalization) source text for this unit's span.
    pub raw_text: String,
    /// SHA-256 of the normalized text (spec §3); the basis of exact-dup detection.
    pub normalized_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_hint: Option<String>,
}

/// A statically resolvable (best-effort, not sound) call target.
///
/// `dst_unit_id` is `None` until the second-pass name resolution (spec
/// §4.3 "Edge extraction") fills it in; `unresolved` stays `true` for
/// name-only matches per REDESIGN FLAGS §9 ("purely name-based... must
/// label such edges as unresolved: true rather than silently collapsing
/// them").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTarget {
    pub name: String,
    pub dst_unit_id: Option<String>,
    pub unresolved: bool,
}

impl Unit {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        file_path: impl Into<String>,
        kind: UnitKind,
        name: impl Into<String>,
        qualified_name: impl Into<String>,
        start_line: u32,
        end_line: u32,
        language: Language,
        raw_text: impl Into<String>,
        normalized_hash: impl Into<String>,
    ) -> Self {
        let file_path = file_path.into();
        let qualified_name = qualified_name.into();
        let unit_id = compute_unit_id(&file_path, kind.as_str(), &qualified_name, start_line);
        Self {
            unit_id,
            file_path,
            kind,
            name: name.into(),
            qualified_name,
            start_line,
            end_line,
            signature: None,
            parameters: Vec::new(),
            return_type: None,
            parent_class: None,
            language,
            complexity: 1,
            calls_to: Vec::new(),
            raw_text: raw_text.into(),
            normalized_hash: normalized_hash.into(),
        }
    }

    pub fn line_count(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}
