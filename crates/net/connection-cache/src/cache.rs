use crate::config::CacheConfig;
use crate::factory::{default_connection_factory, ConnectionFactory};
use crate::info::ConnectionInfo;
use crate::state::ConnectionState;
use crate::stats::CacheStats;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

fn connection_id(address: &str, port: u16) -> String {
    format!("{address}:{port}")
}

/// Map keyed by `address:port` to `ConnectionInfo`, backed by health,
/// reaper, and (optional) reconnect daemon threads.
pub struct ConnectionCache {
    entries: Mutex<HashMap<String, Arc<Mutex<ConnectionInfo>>>>,
    config: CacheConfig,
    stats: Arc<CacheStats>,
    factory: ConnectionFactory,
    stop: Arc<AtomicBool>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl ConnectionCache {
    pub fn new(config: CacheConfig) -> Self {
        ConnectionCache {
            entries: Mutex::new(HashMap::new()),
            config,
            stats: Arc::new(CacheStats::default()),
            factory: Arc::new(default_connection_factory),
            stop: Arc::new(AtomicBool::new(false)),
            threads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_factory(config: CacheConfig, factory: ConnectionFactory) -> Self {
        ConnectionCache {
            factory,
            ..ConnectionCache::new(config)
        }
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the existing entry for `address:port` (cache hit) or
    /// invokes the connection factory and inserts a new one (cache
    /// miss), `CONNECTING` transitioning to `CONNECTED` on success or
    /// `FAILED` on factory failure.
    pub fn get_or_create(&self, address: &str, port: u16) -> Arc<Mutex<ConnectionInfo>> {
        let id = connection_id(address, port);
        {
            let entries = self.entries.lock().unwrap();
            if let Some(entry) = entries.get(&id) {
                self.stats.record_hit();
                vcore_metrics::NET_METRICS.conncache_hits.inc();
                entry.lock().unwrap().last_used = Instant::now();
                return Arc::clone(entry);
            }
        }

        self.stats.record_miss();
        vcore_metrics::NET_METRICS.conncache_misses.inc();
        let mut info = ConnectionInfo::new(id.clone(), address.to_string(), port);
        info.state = ConnectionState::Connecting;

        match (self.factory)(address, port) {
            Some(handle) => {
                info.socket_handle = Some(handle);
                info.state = ConnectionState::Connected;
                debug!("connected to {id}");
            }
            None => {
                info.state = ConnectionState::Failed;
                warn!("failed to connect to {id}");
            }
        }

        let entry = Arc::new(Mutex::new(info));
        let mut entries = self.entries.lock().unwrap();
        // Another caller may have raced us to create the same entry.
        let entry = entries.entry(id).or_insert(entry).clone();
        self.stats.total_connections.fetch_add(1, Ordering::Relaxed);
        self.stats.active_connections.store(entries.len() as u64, Ordering::Relaxed);
        vcore_metrics::NET_METRICS
            .conncache_active_connections
            .set(entries.len() as i64);
        entry
    }

    pub fn get(&self, id: &str) -> Option<Arc<Mutex<ConnectionInfo>>> {
        self.entries.lock().unwrap().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> bool {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.remove(id) {
            close_handle(&entry);
            self.stats.active_connections.store(entries.len() as u64, Ordering::Relaxed);
            vcore_metrics::NET_METRICS
                .conncache_active_connections
                .set(entries.len() as i64);
            true
        } else {
            false
        }
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap();
        for entry in entries.values() {
            close_handle(entry);
        }
        entries.clear();
    }

    /// Records a successful send and, if the connection had been marked
    /// `UNHEALTHY`, promotes it back to `CONNECTED` once its success rate
    /// recovers above the healthy cutoff.
    pub fn mark_send_success(&self, id: &str, latency: Duration) {
        if let Some(entry) = self.get(id) {
            let mut info = entry.lock().unwrap();
            info.record_success(latency);
            if info.state == ConnectionState::Unhealthy && info.is_healthy() {
                info.state = ConnectionState::Connected;
            }
        }
    }

    /// Records a failed send and demotes the connection to `UNHEALTHY`
    /// immediately once its success rate drops below
    /// `config.unhealthy_threshold`, without waiting for the next health
    /// monitor sweep.
    pub fn mark_send_failure(&self, id: &str) {
        if let Some(entry) = self.get(id) {
            let mut info = entry.lock().unwrap();
            info.record_failure();
            if info.success_rate() < self.config.unhealthy_threshold {
                info.state = ConnectionState::Unhealthy;
            }
        }
    }

    pub fn is_connection_healthy(&self, id: &str) -> bool {
        self.get(id).map(|e| e.lock().unwrap().is_healthy()).unwrap_or(false)
    }

    fn all_entries(&self) -> Vec<Arc<Mutex<ConnectionInfo>>> {
        self.entries.lock().unwrap().values().cloned().collect()
    }

    /// Spawns the health monitor, reaper, and (if `enable_auto_reconnect`)
    /// reconnect daemon loops. Threads are joined by `shutdown`.
    pub fn start_background_loops(self: &Arc<Self>) {
        let mut threads = self.threads.lock().unwrap();

        let cache = Arc::clone(self);
        threads.push(std::thread::spawn(move || health_monitor_loop(cache)));

        let cache = Arc::clone(self);
        threads.push(std::thread::spawn(move || reaper_loop(cache)));

        if self.config.enable_auto_reconnect {
            let cache = Arc::clone(self);
            threads.push(std::thread::spawn(move || reconnect_loop(cache)));
        }
    }

    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
        let mut threads = self.threads.lock().unwrap();
        for handle in threads.drain(..) {
            let _ = handle.join();
        }
        self.clear();
    }
}

impl Drop for ConnectionCache {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn close_handle(entry: &Arc<Mutex<ConnectionInfo>>) {
    if let Some(fd) = entry.lock().unwrap().socket_handle.take() {
        unsafe {
            libc::close(fd);
        }
    }
}

fn health_monitor_loop(cache: Arc<ConnectionCache>) {
    while !cache.stop.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
        if cache.stop.load(Ordering::SeqCst) {
            break;
        }
        for entry in cache.all_entries() {
            let mut info = entry.lock().unwrap();
            if info.last_health_check.elapsed() < cache.config.health_check_interval {
                continue;
            }
            info.last_health_check = Instant::now();
            let healthy = info.state == ConnectionState::Connected && info.success_rate() > 0.95;
            if !healthy && info.state == ConnectionState::Connected {
                info.state = ConnectionState::Unhealthy;
                cache.stats.health_check_failures.fetch_add(1, Ordering::Relaxed);
                vcore_metrics::NET_METRICS.conncache_health_check_failures.inc();
            }
        }
    }
}

fn reaper_loop(cache: Arc<ConnectionCache>) {
    while !cache.stop.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
        if cache.stop.load(Ordering::SeqCst) {
            break;
        }
        let stale: Vec<String> = {
            let entries = cache.entries.lock().unwrap();
            entries
                .iter()
                .filter(|(_, entry)| {
                    let info = entry.lock().unwrap();
                    info.last_used.elapsed() > cache.config.connection_ttl
                        || info.state == ConnectionState::Failed
                })
                .map(|(id, _)| id.clone())
                .collect()
        };
        for id in stale {
            if cache.remove(&id) {
                cache.stats.evictions.fetch_add(1, Ordering::Relaxed);
                vcore_metrics::NET_METRICS.conncache_evictions.inc();
            }
        }
    }
}

fn reconnect_loop(cache: Arc<ConnectionCache>) {
    while !cache.stop.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
        if cache.stop.load(Ordering::SeqCst) {
            break;
        }
        for entry in cache.all_entries() {
            let (address, port, should_attempt) = {
                let info = entry.lock().unwrap();
                let eligible = matches!(info.state, ConnectionState::Unhealthy | ConnectionState::Failed)
                    && info.reconnect_attempts < cache.config.max_reconnect_attempts
                    && Instant::now() >= info.next_reconnect_time;
                (info.remote_address.clone(), info.remote_port, eligible)
            };
            if !should_attempt {
                continue;
            }
            entry.lock().unwrap().state = ConnectionState::Reconnecting;
            match (cache.factory)(&address, port) {
                Some(handle) => {
                    let mut info = entry.lock().unwrap();
                    info.socket_handle = Some(handle);
                    info.state = ConnectionState::Connected;
                    info.reconnect_attempts = 0;
                    info.successful_sends = 0;
                    info.failed_sends = 0;
                    cache.stats.reconnections.fetch_add(1, Ordering::Relaxed);
                    vcore_metrics::NET_METRICS.conncache_reconnections.inc();
                }
                None => {
                    let mut info = entry.lock().unwrap();
                    info.reconnect_attempts += 1;
                    info.next_reconnect_time =
                        Instant::now() + cache.config.reconnect_delay(info.reconnect_attempts);
                    info.state = ConnectionState::Failed;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always_succeeds(_: &str, _: u16) -> Option<i32> {
        Some(42)
    }

    fn always_fails(_: &str, _: u16) -> Option<i32> {
        None
    }

    #[test]
    fn get_or_create_is_a_miss_then_a_hit() {
        let cache = ConnectionCache::with_factory(CacheConfig::default(), Arc::new(always_succeeds));
        let first = cache.get_or_create("10.0.0.1", 8001);
        assert_eq!(first.lock().unwrap().state, ConnectionState::Connected);
        assert_eq!(cache.stats().cache_misses.load(Ordering::Relaxed), 1);

        let second = cache.get_or_create("10.0.0.1", 8001);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().cache_hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn failed_factory_marks_connection_failed() {
        let cache = ConnectionCache::with_factory(CacheConfig::default(), Arc::new(always_fails));
        let entry = cache.get_or_create("10.0.0.2", 8002);
        assert_eq!(entry.lock().unwrap().state, ConnectionState::Failed);
    }

    #[test]
    fn mark_send_success_and_failure_update_rate() {
        let cache = ConnectionCache::with_factory(CacheConfig::default(), Arc::new(always_succeeds));
        let entry = cache.get_or_create("10.0.0.3", 8003);
        let id = entry.lock().unwrap().connection_id.clone();

        cache.mark_send_success(&id, Duration::from_millis(5));
        cache.mark_send_success(&id, Duration::from_millis(5));
        cache.mark_send_failure(&id);

        let info = entry.lock().unwrap();
        assert_eq!(info.successful_sends, 2);
        assert_eq!(info.failed_sends, 1);
        assert!((info.success_rate() - (2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn remove_evicts_and_closes_handle() {
        let cache = ConnectionCache::with_factory(CacheConfig::default(), Arc::new(always_succeeds));
        let entry = cache.get_or_create("10.0.0.4", 8004);
        let id = entry.lock().unwrap().connection_id.clone();
        assert!(cache.remove(&id));
        assert!(cache.get(&id).is_none());
    }
}
