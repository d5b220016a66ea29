// Fault tolerance fabric metrics (C1): circuit breaker, degradation manager, retry policy.
use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge};

pub struct FaultMetrics {
    pub circuit_breaker_opens: IntCounter,
    pub circuit_breaker_state: IntGauge,
    pub degradation_level: IntGauge,
    pub retry_attempts: IntCounter,
    pub retries_exhausted: IntCounter,
    pub checkpoint_saves: IntCounter,
    pub checkpoint_restores: IntCounter,
    pub retry_backoff_ms: Histogram,
}

impl FaultMetrics {
    fn new() -> Self {
        FaultMetrics {
            circuit_breaker_opens: register_int_counter!(
                "vcore_fault_circuit_breaker_opens_total",
                "Number of times a circuit breaker transitioned to OPEN"
            )
            .expect("register circuit_breaker_opens"),

            circuit_breaker_state: register_int_gauge!(
                "vcore_fault_circuit_breaker_state",
                "Current circuit breaker state (0=closed, 1=half-open, 2=open)"
            )
            .expect("register circuit_breaker_state"),

            degradation_level: register_int_gauge!(
                "vcore_fault_degradation_level",
                "Current degradation manager level (0=normal, higher=more degraded)"
            )
            .expect("register degradation_level"),

            retry_attempts: register_int_counter!(
                "vcore_fault_retry_attempts_total",
                "Total retry attempts issued by the retry policy"
            )
            .expect("register retry_attempts"),

            retries_exhausted: register_int_counter!(
                "vcore_fault_retries_exhausted_total",
                "Retry sequences that exhausted max_attempts without success"
            )
            .expect("register retries_exhausted"),

            checkpoint_saves: register_int_counter!(
                "vcore_fault_checkpoint_saves_total",
                "Checkpoints written to disk"
            )
            .expect("register checkpoint_saves"),

            checkpoint_restores: register_int_counter!(
                "vcore_fault_checkpoint_restores_total",
                "Checkpoints restored on startup"
            )
            .expect("register checkpoint_restores"),

            retry_backoff_ms: register_histogram!(
                "vcore_fault_retry_backoff_ms",
                "Computed backoff delay before a retry attempt, in milliseconds",
                vec![1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0]
            )
            .expect("register retry_backoff_ms"),
        }
    }
}

pub static FAULT_METRICS: Lazy<FaultMetrics> = Lazy::new(FaultMetrics::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_fault_metrics() {
        FAULT_METRICS.circuit_breaker_opens.inc();
        FAULT_METRICS.circuit_breaker_state.set(2);
        FAULT_METRICS.degradation_level.set(1);
        FAULT_METRICS.retry_attempts.inc_by(3);
        FAULT_METRICS.retry_backoff_ms.observe(200.0);
    }
}
