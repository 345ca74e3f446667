//! Rolling request metrics for the API pipeline
//!
//! Every completed attempt (including one rejected with 401 and then
//! replayed) is recorded once. The latency window keeps the most recent
//! [`LATENCY_WINDOW`] samples.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::observability::{MetricsError, MetricsResult};

/// Maximum number of latency samples retained.
pub const LATENCY_WINDOW: usize = 100;

#[derive(Debug, Default)]
struct LatencyWindow {
    samples: VecDeque<Duration>,
    average: Duration,
}

impl LatencyWindow {
    fn push(&mut self, latency: Duration) {
        self.samples.push_back(latency);
        if self.samples.len() > LATENCY_WINDOW {
            self.samples.pop_front();
        }
        let total: Duration = self.samples.iter().sum();
        self.average = total / self.samples.len() as u32;
    }
}

/// Point-in-time copy of [`RequestMetrics`].
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub error_count: u64,
    /// Oldest first
    pub recent_latencies: Vec<Duration>,
    /// Mean of `recent_latencies`
    pub average_latency: Duration,
    /// `error_count / total_requests`, or 0 when nothing was recorded
    pub error_rate: f64,
    /// Requests dispatched but not yet finished
    pub in_flight: usize,
}

/// Counters and latency window shared by every call on one client.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    total_requests: AtomicU64,
    error_count: AtomicU64,
    window: Mutex<LatencyWindow>,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed attempt.
    pub fn record(&self, latency: Duration, is_error: bool) -> MetricsResult<()> {
        self.lock_window().push(latency);
        self.total_requests.fetch_add(1, Ordering::SeqCst);
        if is_error {
            self.error_count.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::SeqCst)
    }

    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::SeqCst)
    }

    /// Mean of the window. Errors when nothing has been recorded.
    pub fn average_latency(&self) -> MetricsResult<Duration> {
        let window = self.lock_window();
        if window.samples.is_empty() {
            return Err(MetricsError::EmptyData { metric: "average" });
        }
        Ok(window.average)
    }

    /// Nearest-rank percentile over the window, `percentile` in `0.0..=1.0`.
    pub fn latency_percentile(&self, percentile: f64) -> MetricsResult<Duration> {
        if !(0.0..=1.0).contains(&percentile) {
            return Err(MetricsError::InvalidPercentile { value: percentile });
        }

        let mut sorted: Vec<Duration> = {
            let window = self.lock_window();
            if window.samples.is_empty() {
                return Err(MetricsError::EmptyData { metric: "percentile" });
            }
            window.samples.iter().copied().collect()
        };
        sorted.sort_unstable();

        let rank = ((sorted.len() as f64) * percentile).ceil() as usize;
        let index = rank.saturating_sub(1).min(sorted.len() - 1);
        Ok(sorted[index])
    }

    /// Copy out the current state. `in_flight` comes from the request tracker.
    pub fn snapshot(&self, in_flight: usize) -> MetricsSnapshot {
        let (recent_latencies, average_latency) = {
            let window = self.lock_window();
            (window.samples.iter().copied().collect(), window.average)
        };
        let total_requests = self.total_requests();
        let error_count = self.error_count();
        let error_rate =
            if total_requests == 0 { 0.0 } else { error_count as f64 / total_requests as f64 };

        MetricsSnapshot {
            total_requests,
            error_count,
            recent_latencies,
            average_latency,
            error_rate,
            in_flight,
        }
    }

    fn lock_window(&self) -> MutexGuard<'_, LatencyWindow> {
        match self.window.lock() {
            Ok(guard) => guard,
            Err(poison_err) => {
                tracing::warn!(
                    metric = "RequestMetrics::window",
                    "Mutex poisoned during latency access, recovering data"
                );
                poison_err.into_inner()
            }
        }
    }
}
