//! C2 — Change Ledger (spec §4.2).

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::ledger_usecase::{ChangeLedger, ClassifyOutcome};
pub use domain::ports::{LedgerStore, UnitsStore};
pub use infrastructure::memory_ledger::MemoryLedgerStore;
pub use infrastructure::memory_units_store::MemoryUnitsStore;
