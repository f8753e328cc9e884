//! Change-event timelines and quiescence outcomes.
//!
//! A [`Timeline`] is the append-only record of one detection session:
//! every observed content change, stamped with the driver's monotonic
//! clock. It is owned by exactly one session and frozen inside the
//! [`QuiescenceResult`] when the session ends.

use std::time::Instant;

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// One observed mutation of the watched region.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Monotonic timestamp at which the change was observed.
    pub at: Instant,
    /// Full text of the region after the change.
    pub snapshot: String,
}

impl ChangeEvent {
    pub fn new(at: Instant, snapshot: impl Into<String>) -> Self {
        Self {
            at,
            snapshot: snapshot.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// Append-only sequence of change events for one detection session.
///
/// Timestamps are non-decreasing: an event stamped earlier than its
/// predecessor (a misbehaving clock source) is clamped to the predecessor's
/// timestamp rather than breaking the invariant.
#[derive(Debug, Clone)]
pub struct Timeline {
    started_at: Instant,
    events: Vec<ChangeEvent>,
}

impl Timeline {
    /// Empty timeline anchored at the session start.
    pub fn new(started_at: Instant) -> Self {
        Self {
            started_at,
            events: Vec::new(),
        }
    }

    /// Append an event, clamping its timestamp to keep the sequence
    /// non-decreasing (floor: previous event, or session start).
    pub fn push(&mut self, mut event: ChangeEvent) {
        let floor = self
            .events
            .last()
            .map(|e| e.at)
            .unwrap_or(self.started_at);
        if event.at < floor {
            event.at = floor;
        }
        self.events.push(event);
    }

    /// When the session clock started (subscription time).
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the first observed change, if any.
    pub fn first_change_at(&self) -> Option<Instant> {
        self.events.first().map(|e| e.at)
    }

    /// Timestamp of the most recent change, if any.
    pub fn last_change_at(&self) -> Option<Instant> {
        self.events.last().map(|e| e.at)
    }

    /// Text of the most recent change, if any.
    pub fn last_snapshot(&self) -> Option<&str> {
        self.events.last().map(|e| e.snapshot.as_str())
    }
}

// ---------------------------------------------------------------------------
// QuiescenceResult
// ---------------------------------------------------------------------------

/// Outcome of one detection session.
///
/// Exactly one of `completed` / `timed out` holds; the factory functions
/// are the only constructors, so the invariant cannot be violated. The
/// final text is the last event's snapshot, falling back to the initial
/// snapshot when no change was ever observed — a stream that never starts
/// is a timeout, not an empty result.
#[derive(Debug, Clone)]
pub struct QuiescenceResult {
    final_text: String,
    timeline: Timeline,
    completed: bool,
}

impl QuiescenceResult {
    /// The stream settled: no new event for the configured inactivity span.
    pub fn settled(timeline: Timeline, initial_snapshot: &str) -> Self {
        let final_text = final_text_of(&timeline, initial_snapshot);
        Self {
            final_text,
            timeline,
            completed: true,
        }
    }

    /// The absolute cap elapsed before settlement.
    pub fn timed_out(timeline: Timeline, initial_snapshot: &str) -> Self {
        let final_text = final_text_of(&timeline, initial_snapshot);
        Self {
            final_text,
            timeline,
            completed: false,
        }
    }

    pub fn final_text(&self) -> &str {
        &self.final_text
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_timed_out(&self) -> bool {
        !self.completed
    }
}

fn final_text_of(timeline: &Timeline, initial_snapshot: &str) -> String {
    timeline
        .last_snapshot()
        .unwrap_or(initial_snapshot)
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
