//! Shared primitives: error types, ids, spans, and the `Language` port.

pub mod models;
pub mod ports;
