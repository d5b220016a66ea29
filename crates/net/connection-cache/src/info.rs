use crate::state::ConnectionState;
use std::time::{Duration, Instant};

/// Per-connection health and lifecycle record. `socket_handle` is the raw
/// descriptor returned by the connection factory; `None` until a
/// successful connect.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub connection_id: String,
    pub remote_address: String,
    pub remote_port: u16,
    pub state: ConnectionState,
    pub socket_handle: Option<i32>,

    pub successful_sends: u64,
    pub failed_sends: u64,
    pub last_successful_send: Option<Instant>,
    pub last_failed_send: Option<Instant>,
    pub avg_latency: Duration,
    pub last_health_check: Instant,
    pub created_at: Instant,
    pub last_used: Instant,

    pub reconnect_attempts: u32,
    pub next_reconnect_time: Instant,
}

impl ConnectionInfo {
    pub fn new(connection_id: String, remote_address: String, remote_port: u16) -> Self {
        let now = Instant::now();
        ConnectionInfo {
            connection_id,
            remote_address,
            remote_port,
            state: ConnectionState::Disconnected,
            socket_handle: None,
            successful_sends: 0,
            failed_sends: 0,
            last_successful_send: None,
            last_failed_send: None,
            avg_latency: Duration::ZERO,
            last_health_check: now,
            created_at: now,
            last_used: now,
            reconnect_attempts: 0,
            next_reconnect_time: now,
        }
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.successful_sends + self.failed_sends;
        if total == 0 {
            0.0
        } else {
            self.successful_sends as f64 / total as f64
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.state == ConnectionState::Connected && self.success_rate() > 0.95
    }

    pub fn record_success(&mut self, latency: Duration) {
        self.successful_sends += 1;
        self.last_successful_send = Some(Instant::now());
        self.last_used = self.last_successful_send.unwrap();
        // 9:1 exponential moving average, weighted toward history.
        self.avg_latency = if self.avg_latency.is_zero() {
            latency
        } else {
            (self.avg_latency * 9 + latency) / 10
        };
    }

    pub fn record_failure(&mut self) {
        self.failed_sends += 1;
        self.last_failed_send = Some(Instant::now());
        self.last_used = self.last_failed_send.unwrap();
    }
}
