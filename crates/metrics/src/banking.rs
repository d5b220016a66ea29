// Banking pipeline metrics (C5): intake, batch builder, validate/execute/commit stages.
use once_cell::sync::Lazy;
use prometheus::{register_gauge, register_histogram, register_int_counter, register_int_gauge, Gauge, Histogram, IntCounter, IntGauge};

pub struct BankingMetrics {
    pub tx_submitted: IntCounter,
    pub tx_completed: IntCounter,
    pub tx_failed: IntCounter,
    pub batches_sealed: IntCounter,
    pub batches_failed: IntCounter,
    pub batch_commit_latency_ms: Histogram,
    pub intake_queue_depth: IntGauge,
    pub suggested_batch_size: IntGauge,
    pub pipeline_tps: Gauge,
}

impl BankingMetrics {
    fn new() -> Self {
        BankingMetrics {
            tx_submitted: register_int_counter!(
                "vcore_banking_tx_submitted_total",
                "Transactions accepted into the intake queue"
            )
            .expect("register tx_submitted"),

            tx_completed: register_int_counter!(
                "vcore_banking_tx_completed_total",
                "Transactions that committed successfully through all three stages"
            )
            .expect("register tx_completed"),

            tx_failed: register_int_counter!(
                "vcore_banking_tx_failed_total",
                "Transactions that failed validation or execution"
            )
            .expect("register tx_failed"),

            batches_sealed: register_int_counter!(
                "vcore_banking_batches_sealed_total",
                "Batches sealed by the batch builder"
            )
            .expect("register batches_sealed"),

            batches_failed: register_int_counter!(
                "vcore_banking_batches_failed_total",
                "Batches that terminated in the FAILED state"
            )
            .expect("register batches_failed"),

            batch_commit_latency_ms: register_histogram!(
                "vcore_banking_batch_commit_latency_ms",
                "Time from batch seal to commit (or failure), in milliseconds",
                vec![1.0, 5.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0]
            )
            .expect("register batch_commit_latency_ms"),

            intake_queue_depth: register_int_gauge!(
                "vcore_banking_intake_queue_depth",
                "Transactions currently waiting in the intake queue"
            )
            .expect("register intake_queue_depth"),

            suggested_batch_size: register_int_gauge!(
                "vcore_banking_suggested_batch_size",
                "Current adaptive batch size suggested by the resource monitor"
            )
            .expect("register suggested_batch_size"),

            pipeline_tps: register_gauge!(
                "vcore_banking_pipeline_tps",
                "Transactions committed per second since pipeline start"
            )
            .expect("register pipeline_tps"),
        }
    }
}

pub static BANKING_METRICS: Lazy<BankingMetrics> = Lazy::new(BankingMetrics::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_banking_metrics() {
        BANKING_METRICS.tx_submitted.inc_by(64);
        BANKING_METRICS.tx_completed.inc_by(60);
        BANKING_METRICS.tx_failed.inc_by(4);
        BANKING_METRICS.batches_sealed.inc();
        BANKING_METRICS.batch_commit_latency_ms.observe(12.0);
        BANKING_METRICS.intake_queue_depth.set(128);
        BANKING_METRICS.pipeline_tps.set(950.0);
    }
}
