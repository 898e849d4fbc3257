//! Core entities shared across every feature (spec §3: File, Unit,
//! Embedding, Edge, DuplicateGroup, ChangeRecord).

pub mod change;
pub mod duplicate;
pub mod edge;
pub mod embedding;
pub mod file;
pub mod unit;

pub use change::{ChangeCounts, ChangeRecord, ChangeStatus};
pub use duplicate::{DuplicateGroup, DuplicateType};
pub use edge::{Edge, EdgeKind};
pub use embedding::Embedding;
pub use file::File;
pub use unit::{CallTarget, Parameter, Unit, UnitKind};
