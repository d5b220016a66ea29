// ============================================================================
// VALIDATOR CORE CONNECTION CACHE (C9)
// ============================================================================
// PURPOSE: address:port -> ConnectionInfo cache with health monitoring,
// TTL-based eviction, and exponential-backoff auto-reconnect, sitting in
// front of the UDP batch transport (C8).
// ============================================================================

pub mod cache;
pub mod config;
pub mod factory;
pub mod info;
pub mod state;
pub mod stats;

pub use cache::ConnectionCache;
pub use config::CacheConfig;
pub use factory::{default_connection_factory, ConnectionFactory};
pub use info::ConnectionInfo;
pub use state::ConnectionState;
pub use stats::CacheStats;
