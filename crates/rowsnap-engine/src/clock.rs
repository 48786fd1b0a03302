//! Shifted wall clock
//!
//! Lets a test pin "now" near a known instant while time keeps moving, so
//! timestamps the code under test writes can be checked with
//! [`Comparator::TimeAfter`](rowsnap_core::Comparator::TimeAfter) against a
//! recorded value.

use chrono::{DateTime, Duration, Utc};

/// Wall clock shifted by a fixed offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetClock {
    offset: Duration,
}

impl Default for OffsetClock {
    fn default() -> Self {
        Self {
            offset: Duration::zero(),
        }
    }
}

impl OffsetClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift the clock so that `now()` returns `t` at this instant
    pub fn reset_to(&mut self, t: DateTime<Utc>) {
        self.offset = t - Utc::now();
    }

    pub fn offset(&self) -> Duration {
        self.offset
    }

    pub fn now(&self) -> DateTime<Utc> {
        Utc::now() + self.offset
    }
}
