use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use sysinfo::{Pid, ProcessRefreshKind, RefreshKind, System};

const SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Background sampler for this process's CPU utilization and RSS, driving
/// the batch builder's overload throttle.
pub struct ResourceMonitor {
    inner: Arc<Inner>,
    handle: Option<JoinHandle<()>>,
}

struct Inner {
    cpu_pct_bits: AtomicU32,
    rss_mb: AtomicU64,
    cpu_overload_pct: f32,
    rss_overload_mb: u64,
    stop: AtomicBool,
}

impl ResourceMonitor {
    pub fn start(cpu_overload_pct: f32, rss_overload_mb: u64) -> Self {
        let inner = Arc::new(Inner {
            cpu_pct_bits: AtomicU32::new(0),
            rss_mb: AtomicU64::new(0),
            cpu_overload_pct,
            rss_overload_mb,
            stop: AtomicBool::new(false),
        });
        let sampler = Arc::clone(&inner);
        let handle = thread::spawn(move || sample_loop(sampler));
        ResourceMonitor {
            inner,
            handle: Some(handle),
        }
    }

    pub fn cpu_pct(&self) -> f32 {
        f32::from_bits(self.inner.cpu_pct_bits.load(Ordering::Relaxed))
    }

    pub fn rss_mb(&self) -> u64 {
        self.inner.rss_mb.load(Ordering::Relaxed)
    }

    pub fn is_overloaded(&self) -> bool {
        self.cpu_pct() > self.inner.cpu_overload_pct || self.rss_mb() > self.inner.rss_overload_mb
    }

    pub fn shutdown(&mut self) {
        self.inner.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ResourceMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn sample_loop(inner: Arc<Inner>) {
    let pid = Pid::from(std::process::id() as usize);
    let refresh = RefreshKind::new().with_processes(ProcessRefreshKind::everything());
    let mut sys = System::new_with_specifics(refresh);
    while !inner.stop.load(Ordering::Acquire) {
        sys.refresh_process(pid);
        if let Some(process) = sys.process(pid) {
            inner
                .cpu_pct_bits
                .store(process.cpu_usage().to_bits(), Ordering::Relaxed);
            inner
                .rss_mb
                .store(process.memory() / (1024 * 1024), Ordering::Relaxed);
        }
        thread::sleep(SAMPLE_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_and_shuts_down_cleanly() {
        let mut monitor = ResourceMonitor::start(80.0, 1024);
        thread::sleep(Duration::from_millis(50));
        monitor.shutdown();
    }

    #[test]
    fn default_thresholds_are_not_immediately_overloaded() {
        let mut monitor = ResourceMonitor::start(80.0, 1_000_000);
        thread::sleep(Duration::from_millis(50));
        assert!(!monitor.is_overloaded());
        monitor.shutdown();
    }
}
