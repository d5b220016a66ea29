use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic transport counters. Deliberately not `Clone` — mirrors the
/// original's deleted copy constructor so callers share one instance
/// through an `Arc`.
#[derive(Default)]
pub struct BatchStats {
    pub packets_sent: AtomicU64,
    pub packets_received: AtomicU64,
    pub batches_sent: AtomicU64,
    pub batches_received: AtomicU64,
    pub total_bytes_sent: AtomicU64,
    pub total_bytes_received: AtomicU64,
    pub dropped_packets: AtomicU64,
    pub queue_full_errors: AtomicU64,
}

impl BatchStats {
    pub fn record_send(&self, packets: u64, bytes: u64) {
        self.packets_sent.fetch_add(packets, Ordering::Relaxed);
        self.total_bytes_sent.fetch_add(bytes, Ordering::Relaxed);
        self.batches_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_receive(&self, packets: u64, bytes: u64) {
        self.packets_received.fetch_add(packets, Ordering::Relaxed);
        self.total_bytes_received.fetch_add(bytes, Ordering::Relaxed);
        self.batches_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_queue_full(&self) {
        self.queue_full_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self, count: u64) {
        self.dropped_packets.fetch_add(count, Ordering::Relaxed);
    }

    pub fn avg_packets_per_batch(&self) -> f64 {
        let batches = self.batches_sent.load(Ordering::Relaxed);
        if batches == 0 {
            0.0
        } else {
            self.packets_sent.load(Ordering::Relaxed) as f64 / batches as f64
        }
    }

    /// Throughput in packets/sec. Like the original, this is a simplified
    /// snapshot of the running total, not a windowed rate.
    pub fn throughput_pps(&self) -> u64 {
        self.packets_sent.load(Ordering::Relaxed)
    }
}
