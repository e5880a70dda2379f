//! Observation time reconstruction.
//!
//! The source dataset's `time` coordinate carries offsets from a fixed
//! epoch rather than calendar timestamps. Offset index `n` maps to
//! `epoch + n * (7*365/12) days`, an approximate ~213-day step that is the
//! data contract of the upstream product. `7*365/12` days is exactly
//! 18 396 000 seconds, so reconstruction is exact integer arithmetic.

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Seconds per observation step: (7 * 365 / 12) days.
const STEP_SECONDS: i64 = 7 * 365 * 86_400 / 12;

/// Maps offset indices of a dataset's time coordinate to UTC timestamps.
#[derive(Debug, Clone, Copy)]
pub struct TimeAxis {
    epoch: DateTime<Utc>,
    step: Duration,
}

impl TimeAxis {
    pub fn new(epoch: DateTime<Utc>, step: Duration) -> Self {
        Self { epoch, step }
    }

    /// The axis used by the CMS fire-flux product: epoch 2010-01-01T00:00Z,
    /// one step per (7*365/12)-day observation interval.
    pub fn cms_flux_fire() -> Self {
        let epoch = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();
        Self::new(epoch, Duration::seconds(STEP_SECONDS))
    }

    /// Timestamp for offset index `n`.
    pub fn timestamp(&self, n: usize) -> DateTime<Utc> {
        self.epoch + self.step * n as i32
    }

    /// Reconstruct timestamps for `count` consecutive offsets starting at 0.
    pub fn reconstruct(&self, count: usize) -> Vec<DateTime<Utc>> {
        (0..count).map(|n| self.timestamp(n)).collect()
    }
}
