pub mod memory_ledger;
pub mod memory_units_store;
