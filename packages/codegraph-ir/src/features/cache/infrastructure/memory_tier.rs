//! In-process cache tiers.
//!
//! `MokaTier` is the L1 in-process map (spec §4.4). `InMemoryTier` is a
//! plain `DashMap`-backed stand-in used as the default L2/L3 in tests
//! and benchmarks; `codegraph-storage` provides the real on-disk L2.

use crate::features::cache::ports::CacheTier;
use crate::shared::models::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use moka::sync::Cache as MokaCache;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct MokaTier {
    cache: MokaCache<String, Vec<u8>>,
}

impl MokaTier {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: MokaCache::new(max_capacity),
        }
    }
}

impl Default for MokaTier {
    fn default() -> Self {
        Self::new(50_000)
    }
}

#[async_trait]
impl CacheTier for MokaTier {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.cache.get(key))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.cache.insert(key.to_string(), value);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "l1_memory"
    }
}

#[derive(Default)]
pub struct InMemoryTier {
    store: DashMap<String, Vec<u8>>,
    /// Lets tests simulate an unreachable tier without removing it —
    /// mirrors what a real L3 connection failure marks for the rest
    /// of the pass (spec §4.4 Degradation).
    available: Arc<AtomicBool>,
    tier_name: &'static str,
}

impl InMemoryTier {
    pub fn new(tier_name: &'static str) -> Self {
        Self {
            store: DashMap::new(),
            available: Arc::new(AtomicBool::new(true)),
            tier_name,
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheTier for InMemoryTier {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(crate::shared::models::CodegraphError::cache(format!(
                "{} tier unavailable",
                self.tier_name
            )));
        }
        Ok(self.store.get(key).map(|v| v.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(crate::shared::models::CodegraphError::cache(format!(
                "{} tier unavailable",
                self.tier_name
            )));
        }
        self.store.insert(key.to_string(), value);
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.tier_name
    }
}
