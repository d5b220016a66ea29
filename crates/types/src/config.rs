use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration surface for the whole validator core.
/// Every field has a sensible default so a missing config file is not an
/// error — components run with the defaults below.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorCoreConfig {
    pub optimistic_confirmation_threshold_pct: u8,
    pub rooting_threshold_pct: u8,
    pub max_lockout_distance: u32,
    pub weight_cache_ttl_ms: u64,
    pub max_cache_entries: usize,

    pub batch_size: usize,
    pub batch_timeout_ms: u64,
    pub parallel_stages: usize,

    pub turbine_data_fanout: usize,
    pub turbine_forward_fanout: usize,
    pub max_retransmit_peers: usize,
    pub max_retransmit_attempts: u32,

    pub udp_max_batch_size: usize,
    pub udp_buffer_pool_size: usize,

    pub connection_ttl_secs: u64,
    pub health_check_interval_secs: u64,
}

impl Default for ValidatorCoreConfig {
    fn default() -> Self {
        ValidatorCoreConfig {
            optimistic_confirmation_threshold_pct: 67,
            rooting_threshold_pct: 67,
            max_lockout_distance: 32,
            weight_cache_ttl_ms: 500,
            max_cache_entries: 10_000,

            batch_size: 64,
            batch_timeout_ms: 100,
            parallel_stages: 4,

            turbine_data_fanout: 8,
            turbine_forward_fanout: 16,
            max_retransmit_peers: 4,
            max_retransmit_attempts: 3,

            udp_max_batch_size: 128,
            udp_buffer_pool_size: 1024,

            connection_ttl_secs: 300,
            health_check_interval_secs: 10,
        }
    }
}

impl ValidatorCoreConfig {
    /// Loads a TOML config from `path`, falling back to defaults for any
    /// field the file omits. A missing file is not an error: this returns
    /// `Ok(Self::default())`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CoreError::InvalidInput(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&raw)
            .map_err(|e| CoreError::InvalidInput(format!("parsing {}: {e}", path.display())))
    }

    pub fn weight_cache_ttl(&self) -> Duration {
        Duration::from_millis(self.weight_cache_ttl_ms)
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_millis(self.batch_timeout_ms)
    }

    pub fn connection_ttl(&self) -> Duration {
        Duration::from_secs(self.connection_ttl_secs)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs)
    }
}
