//! Simulation time in fixed-precision ticks.
//!
//! Every timestamp and span the tracker stores is an `i64` count of
//! 100-nanosecond ticks. Minutes and seconds are only produced at the edge, by
//! dividing the authoritative tick count by [`TICKS_PER_MINUTE`] /
//! [`TICKS_PER_SECOND`], so repeated queries never accumulate rounding drift.


use bevy::prelude::*;
use bitcode::{Decode, Encode};

/// 100 ns ticks per second.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// 100 ns ticks per minute. The only divisor used to report minutes.
pub const TICKS_PER_MINUTE: i64 = 60 * TICKS_PER_SECOND;

/// A point in simulation time, measured from session start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct SimTimestamp(pub i64);

impl SimTimestamp {
    pub const ZERO: SimTimestamp = SimTimestamp(0);

    pub fn from_minutes(minutes: i64) -> Self {
        Self(minutes * TICKS_PER_MINUTE)
    }

    pub fn from_seconds(seconds: i64) -> Self {
        Self(seconds * TICKS_PER_SECOND)
    }

    #[inline]
    pub fn ticks(self) -> i64 {
        self.0
    }

    /// Span from `earlier` to `self`. Negative when `earlier` is later.
    #[inline]
    pub fn since(self, earlier: SimTimestamp) -> SimDuration {
        SimDuration(self.0 - earlier.0)
    }

    #[inline]
    pub fn saturating_sub(self, span: SimDuration) -> SimTimestamp {
        SimTimestamp(self.0.saturating_sub(span.0))
    }

    #[inline]
    pub fn plus(self, span: SimDuration) -> SimTimestamp {
        SimTimestamp(self.0.saturating_add(span.0))
    }

    /// Minutes since session start, for logs and tooltips.
    pub fn as_minutes(self) -> f64 {
        self.0 as f64 / TICKS_PER_MINUTE as f64
    }
}

impl std::fmt::Display for SimTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total_secs = self.0.div_euclid(TICKS_PER_SECOND);
        let h = total_secs / 3600;
        let m = (total_secs % 3600) / 60;
        let s = total_secs % 60;
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}

/// A span of simulation time in ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct SimDuration(pub i64);

impl SimDuration {
    pub const ZERO: SimDuration = SimDuration(0);

    pub fn from_minutes(minutes: i64) -> Self {
        Self(minutes * TICKS_PER_MINUTE)
    }

    pub fn from_seconds(seconds: i64) -> Self {
        Self(seconds * TICKS_PER_SECOND)
    }

    #[inline]
    pub fn ticks(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_minutes(self) -> f64 {
        self.0 as f64 / TICKS_PER_MINUTE as f64
    }

    #[inline]
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / TICKS_PER_SECOND as f64
    }
}

impl std::fmt::Display for SimDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} min", self.as_minutes())
    }
}

/// Monotonic simulation clock supplied by the host.
///
/// The host writes `now` each frame (the driver on `advance`). `multiplier`
/// and `running` only pace the overlay's auto refresh. Only the value at call
/// time matters to the tracker.
#[derive(Resource, Debug, Clone)]
pub struct SimClock {
    pub now: SimTimestamp,
    /// Simulation speed (1x, 5x, 15x, 25x in the host UI).
    pub multiplier: u32,
    pub running: bool,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            now: SimTimestamp::ZERO,
            multiplier: 1,
            running: true,
        }
    }
}

impl SimClock {
    /// Jump to an absolute time. Going backwards is ignored.
    pub fn set(&mut self, now: SimTimestamp) {
        if now < self.now {
            warn!(
                "SimClock: ignoring backwards jump from {} to {}",
                self.now, now
            );
            return;
        }
        self.now = now;
    }
}
