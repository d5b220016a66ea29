// ============================================================================
// VALIDATOR CORE METRICS - Observability & Instrumentation
// ============================================================================
// PURPOSE: Prometheus metrics for the nine validator core components
//
// KEY METRICS:
// - Fault fabric (C1): circuit breaker state, degradation level, retries
// - Consensus (C2-C4): lockout violations, votes processed, head changes
// - Banking (C5): tx throughput, batch latency, intake queue depth
// - Data availability (C6/C7): shreds broadcast/received, reconstruction
// - Networking (C8/C9): UDP batching, connection cache hit rate
//
// USAGE:
//   BANKING_METRICS.tx_completed.inc();
//   NET_METRICS.udp_batch_size.observe(64.0);
// ============================================================================

pub mod banking;
pub mod consensus;
pub mod da;
pub mod exporter;
pub mod fault;
pub mod net;

pub use banking::BANKING_METRICS;
pub use consensus::CONSENSUS_METRICS;
pub use da::DA_METRICS;
pub use fault::FAULT_METRICS;
pub use net::NET_METRICS;
