use std::time::Duration;
use vcore_types::ValidatorCoreConfig;

#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub max_connections: usize,
    pub connection_ttl: Duration,
    pub health_check_interval: Duration,
    pub reconnect_base_delay: Duration,
    pub max_reconnect_attempts: u32,
    pub enable_auto_reconnect: bool,
    pub unhealthy_threshold: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            max_connections: 10_000,
            connection_ttl: Duration::from_secs(300),
            health_check_interval: Duration::from_secs(10),
            reconnect_base_delay: Duration::from_secs(1),
            max_reconnect_attempts: 5,
            enable_auto_reconnect: true,
            unhealthy_threshold: 0.8,
        }
    }
}

impl From<&ValidatorCoreConfig> for CacheConfig {
    fn from(cfg: &ValidatorCoreConfig) -> Self {
        CacheConfig {
            connection_ttl: cfg.connection_ttl(),
            health_check_interval: cfg.health_check_interval(),
            ..CacheConfig::default()
        }
    }
}

impl CacheConfig {
    /// `next_reconnect_time = now + base_delay * 2^min(attempts, 5)`.
    pub fn reconnect_delay(&self, attempts: u32) -> Duration {
        let exp = attempts.min(5);
        self.reconnect_base_delay * 2u32.saturating_pow(exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = CacheConfig::default();
        assert_eq!(cfg.connection_ttl, Duration::from_secs(300));
        assert_eq!(cfg.health_check_interval, Duration::from_secs(10));
        assert_eq!(cfg.max_reconnect_attempts, 5);
    }

    #[test]
    fn reconnect_delay_doubles_and_caps_exponent() {
        let cfg = CacheConfig::default();
        assert_eq!(cfg.reconnect_delay(0), Duration::from_secs(1));
        assert_eq!(cfg.reconnect_delay(1), Duration::from_secs(2));
        assert_eq!(cfg.reconnect_delay(5), Duration::from_secs(32));
        assert_eq!(cfg.reconnect_delay(10), Duration::from_secs(32));
    }
}
