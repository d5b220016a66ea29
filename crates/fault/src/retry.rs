use rand::Rng;
use std::time::Duration;
use vcore_types::{CoreError, Result};

const RETRYABLE_SUBSTRINGS: &[&str] = &[
    "timeout",
    "connection",
    "network",
    "temporary",
    "transient",
    "unavailable",
    "busy",
    "overloaded",
    "rate limit",
    "throttle",
];

/// Parameters controlling `retry_with_backoff`. Mirrors the named
/// constructors the original fault tolerance module exposes for its three
/// common call sites.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(5000),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    pub fn rpc_default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(2000),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }

    pub fn network_default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(5000),
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }

    pub fn storage_default() -> Self {
        RetryPolicy {
            max_attempts: 4,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_millis(10_000),
            backoff_multiplier: 1.5,
            jitter_factor: 0.1,
        }
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32 - 2);
        let capped_ms = base_ms.min(self.max_delay.as_millis() as f64);
        let jitter_bound = ((capped_ms * self.jitter_factor) as i64).clamp(1, 1000);
        let jitter = rand::thread_rng().gen_range(-jitter_bound..=jitter_bound);
        let jittered_ms = (capped_ms as i64 + jitter).max(0) as u64;
        Duration::from_millis(jittered_ms)
    }
}

/// True if `message` contains (case-insensitively) one of the retryable
/// vocabulary substrings.
pub fn is_retryable_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    RETRYABLE_SUBSTRINGS.iter().any(|s| lower.contains(s))
}

/// Executes `operation` up to `policy.max_attempts` times, sleeping a
/// jittered, exponentially increasing delay between attempts. Never sleeps
/// after the final attempt. Returns the last result (ok or the last error).
///
/// Blocks the calling thread during retry delays — unsafe to call from a
/// hot path or a thread pool worker; use `retry_with_backoff_async` there.
pub fn retry_with_backoff<F, T>(mut operation: F, policy: &RetryPolicy) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut last_err = CoreError::Transient("max retry attempts exceeded".into());
    for attempt in 1..=policy.max_attempts {
        match operation() {
            Ok(value) => return Ok(value),
            Err(e) => {
                vcore_metrics::FAULT_METRICS.retry_attempts.inc();
                if attempt == policy.max_attempts {
                    vcore_metrics::FAULT_METRICS.retries_exhausted.inc();
                    return Err(e);
                }
                last_err = e;
                let delay = policy.delay_for_attempt(attempt);
                vcore_metrics::FAULT_METRICS
                    .retry_backoff_ms
                    .observe(delay.as_millis() as f64);
                std::thread::sleep(delay);
            }
        }
    }
    Err(last_err)
}

/// Async sibling of `retry_with_backoff`: suspends rather than blocks the
/// executor thread between attempts.
pub async fn retry_with_backoff_async<F, Fut, T>(mut operation: F, policy: &RetryPolicy) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_err = CoreError::Transient("max retry attempts exceeded".into());
    for attempt in 1..=policy.max_attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                vcore_metrics::FAULT_METRICS.retry_attempts.inc();
                if attempt == policy.max_attempts {
                    vcore_metrics::FAULT_METRICS.retries_exhausted.inc();
                    return Err(e);
                }
                last_err = e;
                let delay = policy.delay_for_attempt(attempt);
                vcore_metrics::FAULT_METRICS
                    .retry_backoff_ms
                    .observe(delay.as_millis() as f64);
                tokio::time::sleep(delay).await;
            }
        }
    }
    Err(last_err)
}
