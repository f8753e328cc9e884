//! Configuration errors raised before any waiting or scoring begins.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("settle duration must be greater than zero")]
    ZeroSettle,

    #[error("max wait {max_wait:?} is shorter than settle duration {settle:?}")]
    MaxWaitShorterThanSettle {
        settle: Duration,
        max_wait: Duration,
    },

    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,

    #[error("{side} text for comparison is empty")]
    EmptyText { side: &'static str },
}
