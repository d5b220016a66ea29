use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Cumulative pipeline counters plus derived rates exposed to callers
/// monitoring pipeline health.
pub struct PipelineStats {
    start: Instant,
    transactions_processed: AtomicU64,
    batches_processed: AtomicU64,
    failed_transactions: AtomicU64,
    failed_batches: AtomicU64,
    total_batch_time_micros: AtomicU64,
}

impl PipelineStats {
    pub fn new() -> Self {
        PipelineStats {
            start: Instant::now(),
            transactions_processed: AtomicU64::new(0),
            batches_processed: AtomicU64::new(0),
            failed_transactions: AtomicU64::new(0),
            failed_batches: AtomicU64::new(0),
            total_batch_time_micros: AtomicU64::new(0),
        }
    }

    pub fn record_batch(&self, succeeded: u64, failed: u64, batch_time_micros: u64, batch_failed: bool) {
        self.transactions_processed.fetch_add(succeeded, Ordering::Relaxed);
        self.failed_transactions.fetch_add(failed, Ordering::Relaxed);
        self.batches_processed.fetch_add(1, Ordering::Relaxed);
        self.total_batch_time_micros
            .fetch_add(batch_time_micros, Ordering::Relaxed);
        if batch_failed {
            self.failed_batches.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn transactions_processed(&self) -> u64 {
        self.transactions_processed.load(Ordering::Relaxed)
    }

    pub fn batches_processed(&self) -> u64 {
        self.batches_processed.load(Ordering::Relaxed)
    }

    pub fn failed_transactions(&self) -> u64 {
        self.failed_transactions.load(Ordering::Relaxed)
    }

    pub fn failed_batches(&self) -> u64 {
        self.failed_batches.load(Ordering::Relaxed)
    }

    pub fn avg_batch_time_micros(&self) -> f64 {
        let batches = self.batches_processed();
        if batches == 0 {
            return 0.0;
        }
        self.total_batch_time_micros.load(Ordering::Relaxed) as f64 / batches as f64
    }

    pub fn tps(&self) -> f64 {
        let uptime_s = self.start.elapsed().as_secs_f64();
        if uptime_s <= 0.0 {
            return 0.0;
        }
        self.transactions_processed() as f64 / uptime_s
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_batch_accumulates_counters() {
        let stats = PipelineStats::new();
        stats.record_batch(60, 4, 1_500, false);
        stats.record_batch(64, 0, 900, false);
        assert_eq!(stats.transactions_processed(), 124);
        assert_eq!(stats.failed_transactions(), 4);
        assert_eq!(stats.batches_processed(), 2);
        assert_eq!(stats.failed_batches(), 0);
        assert_eq!(stats.avg_batch_time_micros(), 1_200.0);
    }

    #[test]
    fn record_batch_counts_failed_batches() {
        let stats = PipelineStats::new();
        stats.record_batch(0, 64, 500, true);
        assert_eq!(stats.failed_batches(), 1);
    }

    #[test]
    fn tps_is_zero_with_no_transactions() {
        let stats = PipelineStats::new();
        assert_eq!(stats.tps(), 0.0);
    }
}
