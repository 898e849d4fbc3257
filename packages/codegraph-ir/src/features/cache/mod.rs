//! C5 — Multi-tier Cache (spec §4.4).

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::TieredCache;
pub use domain::{embedding_key, parsed_key};
pub use infrastructure::{InMemoryTier, MokaTier};
pub use ports::CacheTier;
