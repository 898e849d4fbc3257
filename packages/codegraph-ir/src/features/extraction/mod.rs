//! C3 — Unit Extractor (spec §4.3).
//!
//! Parses changed files into typed units (class, method, function,
//! block) with source spans, signatures, and best-effort callees,
//! polymorphic over eight languages via `LanguagePlugin` (spec's
//! REDESIGN FLAGS §9 "tagged variant plus a dispatch table").

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{resolve_references, ExtractionOutcome, Extractor};
pub use domain::PendingReference;
pub use ports::{LanguagePlugin, WalkOutput};
