//! Observability infrastructure for request metrics and tracing
//!
//! ## Design Principles
//!
//! 1. **Poison Recovery**: the latency window mutex recovers from poisoning
//!    instead of propagating a panic into the request path.
//!
//! 2. **Ring Buffer**: `VecDeque` for O(1) eviction of the oldest sample.
//!
//! 3. **Lock-free counters**: totals live in atomics so `snapshot` never waits
//!    on a writer for them.

pub mod logging;
pub mod metrics;

/// Metrics error type
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Empty data set - cannot calculate aggregate metric
    #[error("Empty data: cannot calculate {metric}")]
    EmptyData {
        /// Metric name that failed (e.g., "P95", "average")
        metric: &'static str,
    },

    /// Percentile outside `0.0..=1.0`
    #[error("Invalid percentile {value}: expected a value between 0 and 1")]
    InvalidPercentile {
        /// Requested percentile
        value: f64,
    },
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;
