use thiserror::Error;

/// Errors raised by the resilience primitives in this crate, reconstructed
/// to the shape `circuit_breaker.rs` and `rate_limiter.rs` expect.
#[derive(Debug, Clone, Error)]
pub enum ResilienceError {
    #[error("circuit breaker is open")]
    CircuitOpen,

    #[error("transient error: {0}")]
    Transient(String),

    #[error("permanent error: {0}")]
    Permanent(String),

    #[error("rate limit exceeded")]
    RateLimitExceeded,
}

impl ResilienceError {
    /// Whether the circuit breaker should retry this error with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, ResilienceError::Transient(_))
    }

    /// Whether this error should be returned immediately without tripping
    /// the breaker or consuming a retry attempt.
    pub fn is_permanent(&self) -> bool {
        matches!(self, ResilienceError::Permanent(_))
    }

    /// Whether a bare `call` (no retries) should count this as a failure
    /// toward the breaker's threshold.
    pub fn should_trip_breaker(&self) -> bool {
        !matches!(self, ResilienceError::Permanent(_))
    }
}
