//! Wait settings for quiescence detection.
//!
//! Defaults mirror the tuning that works for typical chat UIs: a one-second
//! inactivity window, a 30-second absolute cap, and 100ms re-check
//! granularity. All three are validated up front so a misconfigured wait
//! fails before any observation starts.

use std::time::Duration;

use crate::error::ConfigError;

/// Minimum inactivity span required to declare the stream settled.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(1000);

/// Absolute cap on total wait time.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(30);

/// Granularity at which settlement and timeout are re-evaluated.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Parameters governing a single quiescence-detection session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSettings {
    /// No-new-event span required before declaring completion.
    pub settle: Duration,
    /// Hard ceiling on the total wait; exceeding it yields a timeout outcome.
    pub max_wait: Duration,
    /// Tick granularity of the settlement/timeout check loop.
    pub poll_interval: Duration,
}

impl WaitSettings {
    /// Settings with an explicit settle window and cap, default poll interval.
    pub fn new(settle: Duration, max_wait: Duration) -> Self {
        Self {
            settle,
            max_wait,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Replace the poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Fail fast on invalid parameters, before any waiting begins.
    ///
    /// Requires `settle > 0`, `max_wait >= settle`, `poll_interval > 0`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settle.is_zero() {
            return Err(ConfigError::ZeroSettle);
        }
        if self.max_wait < self.settle {
            return Err(ConfigError::MaxWaitShorterThanSettle {
                settle: self.settle,
                max_wait: self.max_wait,
            });
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            settle: DEFAULT_SETTLE,
            max_wait: DEFAULT_MAX_WAIT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        assert!(WaitSettings::default().validate().is_ok());
    }

    #[test]
    fn zero_settle_rejected() {
        let s = WaitSettings::new(Duration::ZERO, Duration::from_secs(1));
        assert_eq!(s.validate(), Err(ConfigError::ZeroSettle));
    }

    #[test]
    fn max_wait_below_settle_rejected() {
        let s = WaitSettings::new(Duration::from_secs(2), Duration::from_secs(1));
        assert_eq!(
            s.validate(),
            Err(ConfigError::MaxWaitShorterThanSettle {
                settle: Duration::from_secs(2),
                max_wait: Duration::from_secs(1),
            })
        );
    }

    #[test]
    fn max_wait_equal_to_settle_allowed() {
        let s = WaitSettings::new(Duration::from_secs(2), Duration::from_secs(2));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let s = WaitSettings::new(Duration::from_secs(1), Duration::from_secs(2))
            .with_poll_interval(Duration::ZERO);
        assert_eq!(s.validate(), Err(ConfigError::ZeroPollInterval));
    }
}
