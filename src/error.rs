//! # Errors
//!
//! $$
//! \text{fetch}\to\text{estimate}\to\text{solve}
//! $$
//!
//! Failure taxonomy shared by every stage of the allocation pipeline.

use thiserror::Error;

/// Errors surfaced by the allocation pipeline.
///
/// Every variant is propagated to the caller unmodified: the pipeline never
/// retries, never falls back to default weights and never returns a partial
/// report.
#[derive(Debug, Error)]
pub enum AllocationError {
  /// The price provider returned no usable history.
  #[error("price provider returned no usable history")]
  NoData,

  /// Too few observations remain after cleaning for covariance estimation.
  #[error("insufficient history: need at least {required} observations, got {actual}")]
  InsufficientData {
    /// Minimum number of observations the operation needs.
    required: usize,
    /// Number of observations actually available.
    actual: usize,
  },

  /// The constraint set of an optimization problem is empty.
  #[error("optimization problem is infeasible: {0}")]
  Infeasible(String),

  /// The numeric solver reported a non-optimal terminal status.
  #[error("optimizer did not converge: {0}")]
  DidNotConverge(String),

  /// Transport or protocol failure at the price-provider boundary.
  #[error("price provider failure: {0}")]
  Provider(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AllocationError>;
