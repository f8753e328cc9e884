//! Quiescence detector: decides when a streaming region has stopped
//! changing.
//!
//! The intake side is the driver pushing change events into the region
//! channel; the decision side is a single cooperative timer loop that
//! drains the queue without blocking and re-evaluates two clocks each
//! tick: inactivity since the last event (settlement) and elapsed since
//! subscription (timeout). One producer, one consumer, one timeline per
//! session.

use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::{Duration, interval};

use chatprobe_core::{ConfigError, QuiescenceResult, Timeline, WaitSettings};

use crate::region::{RegionSubscription, monotonic_now};

/// Wait until the observed region settles or the wait cap elapses.
///
/// Settlement: at least one change observed, then no new event for
/// `settings.settle`. Timeout: `settings.max_wait` elapsed since the
/// session started without settlement — including the zero-event case,
/// where the result carries the unchanged initial snapshot. A stream
/// that never starts is a timeout, not an error.
///
/// Settings are validated before any waiting; an invalid configuration
/// fails synchronously. The wait suspends the caller only — the channel
/// keeps accepting driver events throughout. Dropping the returned future
/// drops the subscription, which closes the channel and cancels the
/// session.
pub async fn wait_for_completion(
    mut subscription: RegionSubscription,
    settings: WaitSettings,
) -> Result<QuiescenceResult, ConfigError> {
    settings.validate()?;

    let started_at = monotonic_now();
    let mut timeline = Timeline::new(started_at);
    let mut ticker = interval(settings.poll_interval);

    loop {
        ticker.tick().await;

        // Drain everything queued since the last tick. A closed channel
        // only stops new events; settlement and timeout still decide.
        loop {
            match subscription.try_next() {
                Ok(event) => timeline.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        let now = monotonic_now();

        // Settlement first: on a tick where both windows have elapsed,
        // the observed text is complete, not truncated.
        if let Some(last) = timeline.last_change_at()
            && now.duration_since(last) >= settings.settle
        {
            tracing::debug!(
                events = timeline.len(),
                elapsed_ms = now.duration_since(started_at).as_millis() as u64,
                "stream settled"
            );
            return Ok(QuiescenceResult::settled(
                timeline,
                subscription.initial_snapshot(),
            ));
        }

        if now.duration_since(started_at) >= settings.max_wait {
            tracing::debug!(
                events = timeline.len(),
                max_wait_ms = settings.max_wait.as_millis() as u64,
                "wait cap elapsed before settlement"
            );
            return Ok(QuiescenceResult::timed_out(
                timeline,
                subscription.initial_snapshot(),
            ));
        }
    }
}

/// Convenience: wait with a given settle window and cap at the default
/// poll granularity.
pub async fn wait_until_settled(
    subscription: RegionSubscription,
    settle: Duration,
    max_wait: Duration,
) -> Result<QuiescenceResult, ConfigError> {
    wait_for_completion(subscription, WaitSettings::new(settle, max_wait)).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
