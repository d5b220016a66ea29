use thiserror::Error;

/// Error kinds shared across the validator core. `NotFound` is
/// deliberately absent: query APIs return `Option`/empty collections, never
/// this enum, when a key or fork is simply unknown.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("transient failure: {0}")]
    Transient(String),

    #[error("circuit open: {0}")]
    CircuitOpen(String),

    #[error("operation degraded: {0}")]
    Degraded(String),

    #[error("fatal invariant violation: {0}")]
    Fatal(String),
}

impl CoreError {
    /// Matches the retryable vocabulary used by the fault fabric's retry
    /// helpers: transient failures (and only those) are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Transient(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_is_retryable() {
        assert!(CoreError::Transient("x".into()).is_retryable());
        assert!(!CoreError::InvalidInput("x".into()).is_retryable());
        assert!(!CoreError::Fatal("x".into()).is_retryable());
    }
}
