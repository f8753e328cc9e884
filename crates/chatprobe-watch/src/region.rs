//! Region subscription channel: the boundary between the automation
//! driver and a detection session.
//!
//! The driver registers its in-page change observation however it likes
//! (mutation observer injection, CDP events, polling); all the core
//! requires is that each observed mutation lands in [`RegionSender::notify`].
//! The paired [`RegionSubscription`] is owned by exactly one detection
//! session. Dropping it closes the channel, which is how a session is
//! cancelled — the driver side sees the closure on its next notify and
//! releases its registration. Dropping twice is naturally a no-op.

use std::time::Instant;

use tokio::sync::mpsc;

use chatprobe_core::ChangeEvent;

/// Default bound of the event queue between driver and detector.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Monotonic now, read through the tokio clock so tests driving a paused
/// runtime clock see consistent timestamps everywhere.
pub(crate) fn monotonic_now() -> Instant {
    tokio::time::Instant::now().into_std()
}

// ---------------------------------------------------------------------------
// Channel halves
// ---------------------------------------------------------------------------

/// What happened to a single change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Event queued for the detector.
    Delivered,
    /// Queue was full; the event was dropped. The channel may coalesce
    /// rapid changes — the detector's poll re-evaluation still observes
    /// the region's later state.
    Coalesced,
    /// The subscription was dropped; the session is over and the driver
    /// should release its registration.
    Closed,
}

/// Driver-side half: pushes timestamped change events.
#[derive(Debug, Clone)]
pub struct RegionSender {
    tx: mpsc::Sender<ChangeEvent>,
}

impl RegionSender {
    /// Record that the observed region now reads `snapshot`.
    ///
    /// Stamps the monotonic clock at the moment of notification and
    /// performs a non-blocking bounded send, so a slow consumer never
    /// stalls the driver.
    pub fn notify(&self, snapshot: impl Into<String>) -> NotifyOutcome {
        let event = ChangeEvent::new(monotonic_now(), snapshot);
        match self.tx.try_send(event) {
            Ok(()) => NotifyOutcome::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::trace!("region channel full, coalescing change event");
                NotifyOutcome::Coalesced
            }
            Err(mpsc::error::TrySendError::Closed(_)) => NotifyOutcome::Closed,
        }
    }

    /// True once the subscription side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer-side half: one detection session's event intake.
#[derive(Debug)]
pub struct RegionSubscription {
    initial_snapshot: String,
    events: mpsc::Receiver<ChangeEvent>,
}

impl RegionSubscription {
    /// Text of the region at subscription time. This is the final text of
    /// a session that never observes a change.
    pub fn initial_snapshot(&self) -> &str {
        &self.initial_snapshot
    }

    /// Pull one queued event without waiting.
    pub(crate) fn try_next(&mut self) -> Result<ChangeEvent, mpsc::error::TryRecvError> {
        self.events.try_recv()
    }
}

/// Create a bounded subscription channel for one observed region.
///
/// `initial_snapshot` is the region's text at subscription time.
pub fn region_channel(
    initial_snapshot: impl Into<String>,
    capacity: usize,
) -> (RegionSender, RegionSubscription) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        RegionSender { tx },
        RegionSubscription {
            initial_snapshot: initial_snapshot.into(),
            events: rx,
        },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
