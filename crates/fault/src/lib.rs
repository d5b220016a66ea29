// ============================================================================
// VALIDATOR CORE FAULT FABRIC
// ============================================================================
// PURPOSE: Retry/backoff, circuit breaker, graceful degradation, and
// checkpoint/recovery primitives shared by every other component.
// ============================================================================

pub mod checkpoint;
pub mod circuit_breaker;
pub mod degradation;
pub mod retry;

pub use checkpoint::{Checkpoint, FileCheckpoint, RecoveryManager};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use degradation::{
    is_operation_type_allowed, parse_operation_type, DegradationManager, DegradationMode,
    OperationType,
};
pub use retry::{is_retryable_error, retry_with_backoff, retry_with_backoff_async, RetryPolicy};
