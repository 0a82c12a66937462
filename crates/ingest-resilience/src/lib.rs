//! Pure-logic fault tolerance primitives used by the ingestion components.
//!
//! # Overview
//!
//! - **Circuit Breaker**: fails fast when the upstream API or SDE host is
//!   unhealthy, with exponential backoff retries for transient errors.
//! - **Rate Limiter**: sleep-based request pacing, kept as a documented
//!   alternative to the Bulk Alliance Importer's own fixed schedule (see
//!   `pacing`) and available behind the `governor-impl` feature for a
//!   proper token-bucket implementation.
//! - **Pacing**: the named constants and schedule the Bulk Alliance
//!   Importer and Keyed-Cache Import Pipeline actually run on.
//!
//! This crate is pure logic with zero knowledge of storage systems,
//! network protocols, or application-specific concerns.
//!
//! # Example
//!
//! ```no_run
//! use ingest_resilience::{CircuitBreaker, CircuitBreakerConfig, ResilienceError};
//!
//! # async fn example() -> Result<(), ResilienceError> {
//! let breaker = CircuitBreaker::new(CircuitBreakerConfig::default());
//! let result = breaker.execute(|| async {
//!     Ok::<_, ResilienceError>(42)
//! }).await?;
//! # Ok(())
//! # }
//! ```

pub mod circuit_breaker;
pub mod error;
pub mod pacing;
pub mod rate_limiter;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use error::ResilienceError;
pub use rate_limiter::RateLimiter;

#[cfg(feature = "governor-impl")]
pub use rate_limiter::governor_impl::GovernorRateLimiter;

/// Convenience re-exports for call sites that use most of this crate.
pub mod prelude {
    pub use super::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
    pub use super::error::ResilienceError;
    pub use super::pacing;
    pub use super::rate_limiter::RateLimiter;
}
