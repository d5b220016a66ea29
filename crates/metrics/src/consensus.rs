// Lockout algebra, Tower, and fork choice metrics (C2-C4).
use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge};

pub struct ConsensusMetrics {
    pub votes_processed: IntCounter,
    pub lockout_violations: IntCounter,
    pub slots_rooted: IntCounter,
    pub head_changes: IntCounter,
    pub fork_choice_latency_ms: Histogram,
    pub weight_cache_hits: IntCounter,
    pub weight_cache_misses: IntCounter,
    pub active_forks: IntGauge,
}

impl ConsensusMetrics {
    fn new() -> Self {
        ConsensusMetrics {
            votes_processed: register_int_counter!(
                "vcore_consensus_votes_processed_total",
                "Votes accepted by add_vote"
            )
            .expect("register votes_processed"),

            lockout_violations: register_int_counter!(
                "vcore_consensus_lockout_violations_total",
                "Votes rejected for violating an existing lockout"
            )
            .expect("register lockout_violations"),

            slots_rooted: register_int_counter!(
                "vcore_consensus_slots_rooted_total",
                "Slots that crossed the rooting threshold"
            )
            .expect("register slots_rooted"),

            head_changes: register_int_counter!(
                "vcore_consensus_head_changes_total",
                "Number of times get_head returned a different block than before"
            )
            .expect("register head_changes"),

            fork_choice_latency_ms: register_histogram!(
                "vcore_consensus_fork_choice_latency_ms",
                "Wall-clock time spent computing fork weights per call",
                vec![0.1, 0.5, 1.0, 5.0, 10.0, 50.0, 100.0]
            )
            .expect("register fork_choice_latency_ms"),

            weight_cache_hits: register_int_counter!(
                "vcore_consensus_weight_cache_hits_total",
                "weight_cache lookups served without recomputation"
            )
            .expect("register weight_cache_hits"),

            weight_cache_misses: register_int_counter!(
                "vcore_consensus_weight_cache_misses_total",
                "weight_cache lookups that required recomputation"
            )
            .expect("register weight_cache_misses"),

            active_forks: register_int_gauge!(
                "vcore_consensus_active_forks",
                "Number of live forks tracked in the block graph"
            )
            .expect("register active_forks"),
        }
    }
}

pub static CONSENSUS_METRICS: Lazy<ConsensusMetrics> = Lazy::new(ConsensusMetrics::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_counters() {
        CONSENSUS_METRICS.votes_processed.inc();
        CONSENSUS_METRICS.lockout_violations.inc();
        CONSENSUS_METRICS.head_changes.inc_by(2);
        CONSENSUS_METRICS.fork_choice_latency_ms.observe(1.5);
        CONSENSUS_METRICS.active_forks.set(3);
    }
}
