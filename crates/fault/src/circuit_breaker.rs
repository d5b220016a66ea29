use std::sync::Mutex;
use std::time::{Duration, Instant};
use vcore_types::{CoreError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout: Duration,
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        CircuitBreakerConfig {
            failure_threshold: 5,
            timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

fn circuit_state_gauge(state: CircuitState) -> i64 {
    match state {
        CircuitState::Closed => 0,
        CircuitState::HalfOpen => 1,
        CircuitState::Open => 2,
    }
}

struct Inner {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_failure_time: Option<Instant>,
}

/// Three-state breaker guarding a dependency. All transitions and counters
/// are mutated under a single lock acquisition per `execute` call — there
/// is no time-of-check/time-of-use gap between the pre-call state check
/// and the post-call counter update.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        CircuitBreaker {
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                last_failure_time: None,
            }),
        }
    }

    pub fn get_state(&self) -> CircuitState {
        self.inner.lock().unwrap().state
    }

    pub fn get_failure_count(&self) -> u32 {
        self.inner.lock().unwrap().failure_count
    }

    /// Runs `operation` through the breaker. Fails fast with `CircuitOpen`
    /// while the breaker is open and the timeout has not elapsed. Holds a
    /// single lock acquisition across the pre-call check, the call itself,
    /// and the post-call counter update, so no other caller can observe or
    /// mutate state in between.
    pub fn execute<F, T>(&self, operation: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let mut guard = self.inner.lock().unwrap();

        if guard.state == CircuitState::Open {
            let elapsed = guard
                .last_failure_time
                .map(|t| t.elapsed())
                .unwrap_or(Duration::MAX);
            if elapsed < self.config.timeout {
                return Err(CoreError::CircuitOpen("circuit breaker is open".into()));
            }
            guard.state = CircuitState::HalfOpen;
            guard.success_count = 0;
        }

        let result = operation();

        match &result {
            Ok(_) => Self::on_success(&mut guard, &self.config),
            Err(_) => Self::on_failure(&mut guard, &self.config),
        }
        result
    }

    fn on_success(guard: &mut Inner, config: &CircuitBreakerConfig) {
        match guard.state {
            CircuitState::HalfOpen => {
                guard.success_count += 1;
                if guard.success_count >= config.success_threshold {
                    guard.state = CircuitState::Closed;
                    guard.failure_count = 0;
                    guard.success_count = 0;
                }
            }
            CircuitState::Closed => {
                guard.failure_count = 0;
            }
            CircuitState::Open => {}
        }
        vcore_metrics::FAULT_METRICS
            .circuit_breaker_state
            .set(circuit_state_gauge(guard.state));
    }

    fn on_failure(guard: &mut Inner, config: &CircuitBreakerConfig) {
        guard.last_failure_time = Some(Instant::now());
        match guard.state {
            CircuitState::HalfOpen => {
                guard.state = CircuitState::Open;
                guard.success_count = 0;
            }
            CircuitState::Closed => {
                guard.failure_count += 1;
                if guard.failure_count >= config.failure_threshold {
                    guard.state = CircuitState::Open;
                }
            }
            CircuitState::Open => {}
        }
        if guard.state == CircuitState::Open {
            vcore_metrics::FAULT_METRICS.circuit_breaker_opens.inc();
        }
        vcore_metrics::FAULT_METRICS
            .circuit_breaker_state
            .set(circuit_state_gauge(guard.state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn failing() -> Result<()> {
        Err(CoreError::Transient("dependency down".into()))
    }

    fn ok() -> Result<()> {
        Ok(())
    }

    #[test]
    fn opens_after_threshold_consecutive_failures() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 3,
            timeout: Duration::from_millis(100),
            success_threshold: 2,
        });
        for _ in 0..3 {
            let _ = breaker.execute(failing);
        }
        assert_eq!(breaker.get_state(), CircuitState::Open);
    }

    #[test]
    fn open_circuit_fails_fast_within_timeout() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            timeout: Duration::from_millis(200),
            success_threshold: 1,
        });
        let _ = breaker.execute(failing);
        assert_eq!(breaker.get_state(), CircuitState::Open);
        let result = breaker.execute(ok);
        assert!(matches!(result, Err(CoreError::CircuitOpen(_))));
    }

    #[test]
    fn full_cycle_from_open_through_half_open_to_closed() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 3,
            timeout: Duration::from_millis(100),
            success_threshold: 2,
        });
        for _ in 0..5 {
            let _ = breaker.execute(failing);
        }
        assert_eq!(breaker.get_state(), CircuitState::Open);

        let result = breaker.execute(ok);
        assert!(matches!(result, Err(CoreError::CircuitOpen(_))));

        thread::sleep(Duration::from_millis(150));

        breaker.execute(ok).unwrap();
        assert_eq!(breaker.get_state(), CircuitState::HalfOpen);
        breaker.execute(ok).unwrap();
        assert_eq!(breaker.get_state(), CircuitState::Closed);
    }

    #[test]
    fn half_open_failure_reopens_circuit() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            timeout: Duration::from_millis(50),
            success_threshold: 2,
        });
        let _ = breaker.execute(failing);
        thread::sleep(Duration::from_millis(60));
        let _ = breaker.execute(failing);
        assert_eq!(breaker.get_state(), CircuitState::Open);
    }
}
