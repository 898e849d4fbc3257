//! Multi-tier cache facade (C5, spec §4.4).
//!
//! Probes L1 -> L2 -> L3, promoting on hit; writes fan out to every
//! currently-reachable tier. A remote (L3) probe is bounded by a
//! strict timeout and, on failure, the tier is marked unavailable for
//! the remainder of the pass ("graceful degradation"). Concurrent
//! misses for the same key coalesce onto a single producer
//! (single-flight) via a per-key `tokio::sync::Mutex`.

use crate::features::cache::ports::CacheTier;
use crate::shared::models::Result;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tracing::warn;

pub struct TieredCache {
    l1: Arc<dyn CacheTier>,
    l2: Option<Arc<dyn CacheTier>>,
    l3: Option<Arc<dyn CacheTier>>,
    l3_timeout: Duration,
    l3_available: std::sync::atomic::AtomicBool,
    in_flight: DashMap<String, Arc<AsyncMutex<()>>>,
}

impl TieredCache {
    pub fn new(l1: Arc<dyn CacheTier>, l2: Option<Arc<dyn CacheTier>>, l3: Option<Arc<dyn CacheTier>>, l3_timeout_ms: u64) -> Self {
        Self {
            l1,
            l2,
            l3,
            l3_timeout: Duration::from_millis(l3_timeout_ms),
            l3_available: std::sync::atomic::AtomicBool::new(true),
            in_flight: DashMap::new(),
        }
    }

    /// Read-through lookup. Returns `Ok(None)` on a clean miss across
    /// every reachable tier; tier errors are swallowed (never blocks
    /// the pipeline, spec §4.4) except that they prevent promotion.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Ok(Some(v)) = self.l1.get(key).await {
            return Ok(Some(v));
        }

        if let Some(l2) = &self.l2 {
            if let Ok(Some(v)) = l2.get(key).await {
                let _ = self.l1.set(key, v.clone()).await;
                return Ok(Some(v));
            }
        }

        if let Some(l3) = &self.l3 {
            if self.l3_available.load(std::sync::atomic::Ordering::SeqCst) {
                match tokio::time::timeout(self.l3_timeout, l3.get(key)).await {
                    Ok(Ok(Some(v))) => {
                        let _ = self.l1.set(key, v.clone()).await;
                        if let Some(l2) = &self.l2 {
                            let _ = l2.set(key, v.clone()).await;
                        }
                        return Ok(Some(v));
                    }
                    Ok(Ok(None)) => {}
                    Ok(Err(e)) => {
                        warn!(error = %e, "cache: l3 tier error, marking unavailable for this pass");
                        self.l3_available.store(false, std::sync::atomic::Ordering::SeqCst);
                    }
                    Err(_) => {
                        warn!(timeout_ms = self.l3_timeout.as_millis() as u64, "cache: l3 probe timed out, marking unavailable for this pass");
                        self.l3_available.store(false, std::sync::atomic::Ordering::SeqCst);
                    }
                }
            }
        }

        Ok(None)
    }

    /// Write-through to every currently-reachable tier.
    pub async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let _ = self.l1.set(key, value.clone()).await;
        if let Some(l2) = &self.l2 {
            let _ = l2.set(key, value.clone()).await;
        }
        if self.l3_available.load(std::sync::atomic::Ordering::SeqCst) {
            if let Some(l3) = &self.l3 {
                let _ = tokio::time::timeout(self.l3_timeout, l3.set(key, value)).await;
            }
        }
        Ok(())
    }

    /// Single-flight get-or-compute: concurrent misses for the same
    /// key coalesce on the same in-flight producer (spec §4.4
    /// Consistency). `compute` runs at most once per key at a time.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> Result<Vec<u8>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<u8>>>,
    {
        if let Some(hit) = self.get(key).await? {
            return Ok(hit);
        }

        let lock = self
            .in_flight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Re-check now that we hold the per-key lock: another caller
        // may have just finished computing this value.
        if let Some(hit) = self.get(key).await? {
            self.in_flight.remove(key);
            return Ok(hit);
        }

        let value = compute().await?;
        self.set(key, value.clone()).await?;
        self.in_flight.remove(key);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::cache::infrastructure::{InMemoryTier, MokaTier};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> TieredCache {
        TieredCache::new(
            Arc::new(MokaTier::default()),
            Some(Arc::new(InMemoryTier::new("l2_test"))),
            Some(Arc::new(InMemoryTier::new("l3_test"))),
            500,
        )
    }

    #[tokio::test]
    async fn miss_then_compute_then_hit() {
        let c = cache();
        let v = c.get_or_compute("k", || async { Ok(vec![1, 2, 3]) }).await.unwrap();
        assert_eq!(v, vec![1, 2, 3]);
        let hit = c.get("k").await.unwrap();
        assert_eq!(hit, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn compute_runs_once_under_single_flight() {
        let c = Arc::new(cache());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let c = c.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                c.get_or_compute("shared-key", || {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(vec![42])
                    }
                })
                .await
                .unwrap()
            }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap(), vec![42]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unreachable_l3_degrades_without_blocking() {
        let l3 = Arc::new(InMemoryTier::new("l3"));
        l3.set_available(false);
        let c = TieredCache::new(Arc::new(MokaTier::default()), None, Some(l3), 50);
        let result = c.get("missing").await;
        assert_eq!(result.unwrap(), None);
    }
}
