//! Scoped latency measurement around a detection session.
//!
//! [`LatencyScope::begin`] is called before the action that triggers
//! streaming (the button click, the Enter key). The scope guard owns the
//! start timestamp; its finalize step is the only constructor of a
//! [`LatencyMetrics`], runs exactly once, and is guaranteed on every exit
//! path — explicitly from a completed detection, or from `Drop` when the
//! wrapped detection failed or the caller bailed early. The paired
//! [`MetricsHandle`] refuses to answer until finalization has happened,
//! so there is no mid-flight read of a partially composed measurement.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use thiserror::Error;

use chatprobe_core::{ConfigError, LatencyMetrics, QuiescenceResult, Timeline, WaitSettings};

use crate::detector::wait_for_completion;
use crate::region::{RegionSubscription, monotonic_now};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatencyError {
    #[error("latency metrics are not finalized until the measurement scope exits")]
    NotFinalized,
}

// ---------------------------------------------------------------------------
// Shared slot
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum MetricsSlot {
    Pending,
    Finalized(LatencyMetrics),
}

fn lock_slot(slot: &Mutex<MetricsSlot>) -> std::sync::MutexGuard<'_, MetricsSlot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read-side handle to the metrics of one scope.
///
/// Cheap to clone; valid after the scope has finalized (explicitly or by
/// drop), an error before that.
#[derive(Debug, Clone)]
pub struct MetricsHandle {
    slot: Arc<Mutex<MetricsSlot>>,
}

impl MetricsHandle {
    pub fn get(&self) -> Result<LatencyMetrics, LatencyError> {
        match *lock_slot(&self.slot) {
            MetricsSlot::Pending => Err(LatencyError::NotFinalized),
            MetricsSlot::Finalized(metrics) => Ok(metrics),
        }
    }
}

// ---------------------------------------------------------------------------
// LatencyScope
// ---------------------------------------------------------------------------

/// Guard for one latency measurement.
pub struct LatencyScope {
    start: Instant,
    slot: Arc<Mutex<MetricsSlot>>,
    finalized: bool,
}

impl LatencyScope {
    /// Open a measurement scope; call before triggering the streaming
    /// action so time-to-first-change is anchored correctly.
    pub fn begin() -> (Self, MetricsHandle) {
        let slot = Arc::new(Mutex::new(MetricsSlot::Pending));
        (
            Self {
                start: monotonic_now(),
                slot: Arc::clone(&slot),
                finalized: false,
            },
            MetricsHandle { slot },
        )
    }

    /// When the scope was opened.
    pub fn start(&self) -> Instant {
        self.start
    }

    /// Finalize from a finished session's timeline.
    ///
    /// Idempotent: the first call fixes the metrics; later calls (and the
    /// drop guard) return the already-stored value without re-reading the
    /// clock, so elapsed time is never double counted.
    pub fn finalize_with(&mut self, timeline: &Timeline) -> LatencyMetrics {
        self.finalize_inner(timeline.first_change_at(), timeline.len())
    }

    fn finalize_inner(&mut self, first_change: Option<Instant>, change_count: usize) -> LatencyMetrics {
        let mut slot = lock_slot(&self.slot);
        if let MetricsSlot::Finalized(metrics) = *slot {
            return metrics;
        }
        let metrics = LatencyMetrics::new(self.start, first_change, monotonic_now(), change_count);
        *slot = MetricsSlot::Finalized(metrics);
        self.finalized = true;
        metrics
    }

    /// Run a detection inside this scope and finalize from its timeline.
    ///
    /// The scope suspends only around the wrapped detection call. On a
    /// configuration error the scope is still finalized (by drop) with no
    /// first change and the elapsed time to the failure.
    pub async fn measure(
        mut self,
        subscription: RegionSubscription,
        settings: WaitSettings,
    ) -> Result<(QuiescenceResult, LatencyMetrics), ConfigError> {
        let result = wait_for_completion(subscription, settings).await?;
        let metrics = self.finalize_with(result.timeline());
        Ok((result, metrics))
    }
}

impl Drop for LatencyScope {
    fn drop(&mut self) {
        if !self.finalized {
            self.finalize_inner(None, 0);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::region_channel;
    use tokio::time::{Duration, sleep};

    fn settings(settle_ms: u64, max_ms: u64, poll_ms: u64) -> WaitSettings {
        WaitSettings::new(
            Duration::from_millis(settle_ms),
            Duration::from_millis(max_ms),
        )
        .with_poll_interval(Duration::from_millis(poll_ms))
    }

    // ── Read-before-finalize ────────────────────────────────────────

    #[tokio::test]
    async fn handle_refuses_before_finalize() {
        let (_scope, handle) = LatencyScope::begin();
        assert_eq!(handle.get(), Err(LatencyError::NotFinalized));
    }

    #[tokio::test]
    async fn drop_finalizes_with_no_first_change() {
        let handle = {
            let (scope, handle) = LatencyScope::begin();
            drop(scope);
            handle
        };
        let metrics = handle.get().expect("finalized by drop");
        assert!(metrics.time_to_first_change().is_none());
        assert_eq!(metrics.change_count(), 0);
    }

    // ── Exactly-once ────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn finalize_is_idempotent() {
        let (mut scope, handle) = LatencyScope::begin();
        let t0 = scope.start();

        let mut timeline = Timeline::new(t0);
        timeline.push(chatprobe_core::ChangeEvent::new(t0, "x"));

        let first = scope.finalize_with(&timeline);

        // Let the clock move, then finalize again — nothing may change.
        sleep(Duration::from_millis(250)).await;
        let second = scope.finalize_with(&timeline);
        drop(scope);

        assert_eq!(first, second);
        assert_eq!(handle.get().expect("finalized"), first);
    }

    // ── Scoped measurement ──────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn measure_reports_ttfc_and_completion() {
        let (tx, sub) = region_channel("", 16);
        let (scope, handle) = LatencyScope::begin();

        // The "click": streaming starts now.
        tokio::spawn(async move {
            tx.notify("H");
            sleep(Duration::from_millis(50)).await;
            tx.notify("He");
            sleep(Duration::from_millis(50)).await;
            tx.notify("Hello");
        });

        let (result, metrics) = scope
            .measure(sub, settings(100, 2000, 100))
            .await
            .expect("valid settings");

        assert!(result.is_completed());
        assert_eq!(result.final_text(), "Hello");
        assert_eq!(metrics.time_to_first_change(), Some(Duration::ZERO));
        assert_eq!(metrics.time_to_completion(), Duration::from_millis(200));
        assert_eq!(metrics.change_count(), 3);
        assert_eq!(handle.get().expect("finalized"), metrics);
    }

    #[tokio::test(start_paused = true)]
    async fn measure_covers_timeout_outcome() {
        let (_tx, sub) = region_channel("quiet page", 16);
        let (scope, _handle) = LatencyScope::begin();

        let (result, metrics) = scope
            .measure(sub, settings(100, 500, 100))
            .await
            .expect("valid settings");

        assert!(result.is_timed_out());
        assert!(metrics.time_to_first_change().is_none());
        assert_eq!(metrics.time_to_completion(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn measure_failure_path_still_finalizes() {
        let (_tx, sub) = region_channel("", 4);
        let (scope, handle) = LatencyScope::begin();

        let err = scope
            .measure(sub, settings(0, 500, 50))
            .await
            .expect_err("zero settle rejected");
        assert_eq!(err, ConfigError::ZeroSettle);

        // Scope was consumed and dropped by the failed measure — the
        // handle must still resolve, with no first change.
        let metrics = handle.get().expect("finalized on failure path");
        assert!(metrics.time_to_first_change().is_none());
    }

    // ── Monotonicity ────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn ttfc_never_exceeds_completion() {
        let (tx, sub) = region_channel("", 16);
        let (scope, _handle) = LatencyScope::begin();

        tokio::spawn(async move {
            sleep(Duration::from_millis(120)).await;
            tx.notify("late first token");
        });

        let (_result, metrics) = scope
            .measure(sub, settings(100, 2000, 40))
            .await
            .expect("valid settings");

        let ttfc = metrics.time_to_first_change().expect("one change observed");
        assert!(ttfc <= metrics.time_to_completion());
        assert!(ttfc >= Duration::from_millis(120));
    }
}
