use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic cache-wide counters. Not `Clone`, matching the original's
/// deleted copy constructor — share through an `Arc`.
#[derive(Default)]
pub struct CacheStats {
    pub total_connections: AtomicU64,
    pub active_connections: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
    pub evictions: AtomicU64,
    pub reconnections: AtomicU64,
    pub health_check_failures: AtomicU64,
    pub total_lookups: AtomicU64,
}

impl CacheStats {
    pub fn record_hit(&self) {
        self.total_lookups.fetch_add(1, Ordering::Relaxed);
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.total_lookups.fetch_add(1, Ordering::Relaxed);
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.total_lookups.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            self.cache_hits.load(Ordering::Relaxed) as f64 / total as f64
        }
    }
}
