//! Name-only references awaiting second-pass resolution (spec §4.3
//! "Edge extraction": "Name-only call targets are resolved against the
//! unit table in a second pass").
//!
//! Extended here to `extends`/`implements` as well as `calls`, since
//! all three are name-based lookups against the same unit table and
//! share the identical ambiguity problem (REDESIGN FLAGS §9: "Call
//! resolution is purely name-based... must label such edges as
//! unresolved: true rather than silently collapsing them").

use crate::domain::EdgeKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReference {
    pub src_unit_id: String,
    pub name: String,
    pub kind: EdgeKind,
}

impl PendingReference {
    pub fn new(src_unit_id: impl Into<String>, name: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            src_unit_id: src_unit_id.into(),
            name: name.into(),
            kind,
        }
    }
}
