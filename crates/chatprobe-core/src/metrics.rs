//! Latency metrics derived from a detection session.

use std::time::{Duration, Instant};

/// Latency measurements for one scoped detection.
///
/// Immutable once constructed; only the latency scope's finalize step
/// builds one. `time_to_first_change` is absent when no change was ever
/// observed (empty timeline, including the failure path of a wrapped
/// detection).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyMetrics {
    start: Instant,
    time_to_first_change: Option<Duration>,
    time_to_completion: Duration,
    change_count: usize,
}

impl LatencyMetrics {
    /// Derive metrics from the scope start, the first observed change (if
    /// any), the session end, and the number of observed changes.
    ///
    /// Durations saturate at zero, so a first change stamped marginally
    /// before the scope start (clock coalescing at subscription) reads as
    /// 0ms rather than panicking.
    pub fn new(
        start: Instant,
        first_change: Option<Instant>,
        end: Instant,
        change_count: usize,
    ) -> Self {
        Self {
            start,
            time_to_first_change: first_change.map(|at| at.saturating_duration_since(start)),
            time_to_completion: end.saturating_duration_since(start),
            change_count,
        }
    }

    /// When the measurement scope was opened.
    pub fn start(&self) -> Instant {
        self.start
    }

    /// Elapsed from scope start to the first observed change (TTFT analog).
    pub fn time_to_first_change(&self) -> Option<Duration> {
        self.time_to_first_change
    }

    /// Elapsed from scope start to session end, regardless of outcome.
    pub fn time_to_completion(&self) -> Duration {
        self.time_to_completion
    }

    /// Number of observed content mutations.
    pub fn change_count(&self) -> usize {
        self.change_count
    }
}
