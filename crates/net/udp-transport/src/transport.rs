use crate::packet::Packet;
use crate::queue::PacketQueue;
use crate::socket_ops::{recv_batch_fallback, recv_batch_mmsg, send_batch_fallback, send_batch_mmsg};
use crate::stats::BatchStats;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use vcore_types::ValidatorCoreConfig;

const MAX_PACKET_SIZE: usize = 1500;
/// Upper bound on how long `shutdown` waits for sender/receiver threads to
/// notice the stop flag and exit on their own before it gives up waiting
/// and joins anyway.
const SHUTDOWN_DRAIN_BUDGET: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to bind udp socket: {0}")]
    Bind(#[from] std::io::Error),
}

#[derive(Clone, Debug)]
pub struct UdpTransportConfig {
    pub max_batch_size: usize,
    pub batch_timeout: Duration,
    pub buffer_pool_size: usize,
    pub sender_workers: usize,
    pub receiver_workers: usize,
}

impl From<&ValidatorCoreConfig> for UdpTransportConfig {
    fn from(cfg: &ValidatorCoreConfig) -> Self {
        UdpTransportConfig {
            max_batch_size: cfg.udp_max_batch_size,
            batch_timeout: Duration::from_millis(1),
            buffer_pool_size: cfg.udp_buffer_pool_size,
            sender_workers: 8,
            receiver_workers: 8,
        }
    }
}

impl Default for UdpTransportConfig {
    fn default() -> Self {
        UdpTransportConfig::from(&ValidatorCoreConfig::default())
    }
}

/// Lock-free-dequeue priority-queued UDP batch transport. Owns one bound
/// socket and a pool of sender/receiver worker threads; packets enqueued
/// via `queue_packet` are drained in priority order and sent in
/// `sendmmsg` batches where the OS supports it.
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    config: UdpTransportConfig,
    send_queue: Arc<PacketQueue>,
    stats: Arc<BatchStats>,
    stop: Arc<AtomicBool>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl UdpTransport {
    pub fn bind(addr: &str, config: UdpTransportConfig) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;
        Ok(UdpTransport {
            socket: Arc::new(socket),
            send_queue: Arc::new(PacketQueue::new(config.buffer_pool_size)),
            stats: Arc::new(BatchStats::default()),
            stop: Arc::new(AtomicBool::new(false)),
            threads: Mutex::new(Vec::new()),
            config,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.socket.local_addr()
    }

    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }

    /// Enqueues `packet` for sending. Returns `false` and bumps
    /// `queue_full_errors` once `buffer_pool_size` packets are already
    /// queued; the caller decides whether to retry or drop.
    pub fn queue_packet(&self, packet: Packet) -> bool {
        if self.send_queue.enqueue(packet) {
            true
        } else {
            self.stats.record_queue_full();
            vcore_metrics::NET_METRICS.udp_queue_full_errors.inc();
            false
        }
    }

    /// Spawns `sender_workers` sender threads and `receiver_workers`
    /// receiver threads. `on_receive` is invoked with each drained batch
    /// of inbound packets from a receiver worker.
    pub fn start<F>(&self, on_receive: F)
    where
        F: Fn(Vec<Packet>) + Send + Sync + 'static,
    {
        let on_receive = Arc::new(on_receive);
        let mut threads = self.threads.lock().unwrap();

        for _ in 0..self.config.sender_workers {
            let socket = Arc::clone(&self.socket);
            let queue = Arc::clone(&self.send_queue);
            let stats = Arc::clone(&self.stats);
            let stop = Arc::clone(&self.stop);
            let max_batch = self.config.max_batch_size;
            let timeout = self.config.batch_timeout;
            threads.push(std::thread::spawn(move || {
                sender_loop(&socket, &queue, &stats, &stop, max_batch, timeout)
            }));
        }

        for _ in 0..self.config.receiver_workers {
            let socket = Arc::clone(&self.socket);
            let stats = Arc::clone(&self.stats);
            let stop = Arc::clone(&self.stop);
            let max_batch = self.config.max_batch_size;
            let callback = Arc::clone(&on_receive);
            threads.push(std::thread::spawn(move || {
                receiver_loop(&socket, &stats, &stop, max_batch, callback.as_ref())
            }));
        }
    }

    /// Drains and sends whatever is currently queued, bypassing the
    /// sender workers' wait. Used once during shutdown, and available to
    /// callers who need a synchronous flush.
    pub fn flush_batches(&self) {
        loop {
            let batch = self.send_queue.drain_batch(self.config.max_batch_size, Duration::from_millis(0));
            if batch.is_empty() {
                break;
            }
            send_batch(&self.socket, &self.stats, &batch);
        }
    }

    /// Sets the stop flag, wakes all workers, flushes any packets still
    /// queued, then joins every worker thread.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.send_queue.notify_all();
        std::thread::sleep(SHUTDOWN_DRAIN_BUDGET.min(Duration::from_millis(50)));
        self.flush_batches();

        let mut threads = self.threads.lock().unwrap();
        for handle in threads.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn send_batch(socket: &UdpSocket, stats: &BatchStats, batch: &[Packet]) {
    let bytes: u64 = batch.iter().map(|p| p.data.len() as u64).sum();
    let sent = match send_batch_mmsg(socket, batch) {
        Ok(sent) if sent == batch.len() => {
            stats.record_send(sent as u64, bytes);
            sent
        }
        Ok(sent) => {
            debug!("sendmmsg sent {}/{} packets, falling back for the rest", sent, batch.len());
            let fallback_sent = send_batch_fallback(socket, &batch[sent..]);
            stats.record_send((sent + fallback_sent) as u64, bytes);
            sent + fallback_sent
        }
        Err(e) => {
            warn!("sendmmsg unavailable or failed ({e}), using per-packet fallback");
            let sent = send_batch_fallback(socket, batch);
            stats.record_send(sent as u64, bytes);
            sent
        }
    };
    vcore_metrics::NET_METRICS.udp_packets_sent.inc_by(sent as u64);
    vcore_metrics::NET_METRICS.udp_bytes_sent.inc_by(bytes);
    vcore_metrics::NET_METRICS.udp_batches_sent.inc();
    vcore_metrics::NET_METRICS.udp_batch_size.observe(batch.len() as f64);
}

fn sender_loop(
    socket: &UdpSocket,
    queue: &PacketQueue,
    stats: &BatchStats,
    stop: &AtomicBool,
    max_batch: usize,
    timeout: Duration,
) {
    while !stop.load(Ordering::SeqCst) {
        let batch = queue.drain_batch(max_batch, timeout);
        if batch.is_empty() {
            continue;
        }
        send_batch(socket, stats, &batch);
    }
}

fn receiver_loop<F: Fn(Vec<Packet>)>(
    socket: &UdpSocket,
    stats: &BatchStats,
    stop: &AtomicBool,
    max_batch: usize,
    on_receive: &F,
) {
    while !stop.load(Ordering::SeqCst) {
        let batch = match recv_batch_mmsg(socket, max_batch, MAX_PACKET_SIZE) {
            Ok(batch) => batch,
            Err(_) => recv_batch_fallback(socket, max_batch, MAX_PACKET_SIZE),
        };
        if batch.is_empty() {
            std::thread::sleep(Duration::from_micros(200));
            continue;
        }
        let bytes: u64 = batch.iter().map(|p| p.data.len() as u64).sum();
        stats.record_receive(batch.len() as u64, bytes);
        vcore_metrics::NET_METRICS.udp_packets_received.inc_by(batch.len() as u64);
        vcore_metrics::NET_METRICS.udp_bytes_received.inc_by(bytes);
        on_receive(batch);
    }
}
