//! Change Ledger domain types. The ledger's own entities (`ChangeRecord`,
//! `ChangeCounts`) live in `crate::domain` since other features (the
//! pipeline, the API) need them too; this module only adds the port.

pub mod ports;

pub use ports::{LedgerStore, UnitsStore};
