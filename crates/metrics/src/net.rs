// UDP batch transport and connection cache metrics (C8/C9).
use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge};

pub struct NetMetrics {
    // UDP transport (C8)
    pub udp_packets_sent: IntCounter,
    pub udp_packets_received: IntCounter,
    pub udp_batches_sent: IntCounter,
    pub udp_bytes_sent: IntCounter,
    pub udp_bytes_received: IntCounter,
    pub udp_dropped_packets: IntCounter,
    pub udp_queue_full_errors: IntCounter,
    pub udp_batch_size: Histogram,

    // Connection cache (C9)
    pub conncache_hits: IntCounter,
    pub conncache_misses: IntCounter,
    pub conncache_evictions: IntCounter,
    pub conncache_reconnections: IntCounter,
    pub conncache_health_check_failures: IntCounter,
    pub conncache_active_connections: IntGauge,
}

impl NetMetrics {
    fn new() -> Self {
        NetMetrics {
            udp_packets_sent: register_int_counter!(
                "vcore_net_udp_packets_sent_total",
                "Packets handed off to sendmmsg/sendto"
            )
            .expect("register udp_packets_sent"),

            udp_packets_received: register_int_counter!(
                "vcore_net_udp_packets_received_total",
                "Packets pulled off the wire by receiver workers"
            )
            .expect("register udp_packets_received"),

            udp_batches_sent: register_int_counter!(
                "vcore_net_udp_batches_sent_total",
                "Sender batches flushed (one sendmmsg call or fallback loop each)"
            )
            .expect("register udp_batches_sent"),

            udp_bytes_sent: register_int_counter!(
                "vcore_net_udp_bytes_sent_total",
                "Total bytes sent"
            )
            .expect("register udp_bytes_sent"),

            udp_bytes_received: register_int_counter!(
                "vcore_net_udp_bytes_received_total",
                "Total bytes received"
            )
            .expect("register udp_bytes_received"),

            udp_dropped_packets: register_int_counter!(
                "vcore_net_udp_dropped_packets_total",
                "Packets dropped after a transport-layer send failure"
            )
            .expect("register udp_dropped_packets"),

            udp_queue_full_errors: register_int_counter!(
                "vcore_net_udp_queue_full_errors_total",
                "queue_packet calls rejected because buffer_pool_size was exceeded"
            )
            .expect("register udp_queue_full_errors"),

            udp_batch_size: register_histogram!(
                "vcore_net_udp_batch_size",
                "Packets per drained sender batch",
                vec![1.0, 8.0, 16.0, 32.0, 64.0, 128.0, 256.0]
            )
            .expect("register udp_batch_size"),

            conncache_hits: register_int_counter!(
                "vcore_net_conncache_hits_total",
                "get_or_create calls served from the existing table"
            )
            .expect("register conncache_hits"),

            conncache_misses: register_int_counter!(
                "vcore_net_conncache_misses_total",
                "get_or_create calls that invoked the connection factory"
            )
            .expect("register conncache_misses"),

            conncache_evictions: register_int_counter!(
                "vcore_net_conncache_evictions_total",
                "Entries evicted by the reaper loop (TTL expiry or FAILED state)"
            )
            .expect("register conncache_evictions"),

            conncache_reconnections: register_int_counter!(
                "vcore_net_conncache_reconnections_total",
                "Successful reconnect attempts"
            )
            .expect("register conncache_reconnections"),

            conncache_health_check_failures: register_int_counter!(
                "vcore_net_conncache_health_check_failures_total",
                "Health checks that demoted a connection to UNHEALTHY"
            )
            .expect("register conncache_health_check_failures"),

            conncache_active_connections: register_int_gauge!(
                "vcore_net_conncache_active_connections",
                "Entries currently held in the connection table"
            )
            .expect("register conncache_active_connections"),
        }
    }
}

pub static NET_METRICS: Lazy<NetMetrics> = Lazy::new(NetMetrics::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_net_metrics() {
        NET_METRICS.udp_packets_sent.inc_by(128);
        NET_METRICS.udp_batch_size.observe(64.0);
        NET_METRICS.conncache_hits.inc();
        NET_METRICS.conncache_misses.inc();
        NET_METRICS.conncache_active_connections.set(12);
    }
}
