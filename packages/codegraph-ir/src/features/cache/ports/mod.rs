//! Cache tier port (spec §4.4).
//!
//! Each tier is content-addressed, byte-oriented, and may be absent or
//! unreachable without blocking the pipeline ("graceful degradation").

use crate::shared::models::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CacheTier: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Human-readable tier name for logging/degradation tracking.
    fn name(&self) -> &'static str;
}
