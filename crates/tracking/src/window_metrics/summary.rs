//! Per-segment window summary computation.

use bevy::prelude::*;

use crate::occupancy::OccupancyInterval;
use crate::sim_time::{SimDuration, SimTimestamp, TICKS_PER_MINUTE, TICKS_PER_SECOND};

/// The time frame of one query: current time plus measuring and retention
/// lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsWindow {
    pub now: SimTimestamp,
    pub measuring: SimDuration,
    pub retention: SimDuration,
}

impl MetricsWindow {
    /// Builds a window, clamping negative lengths to zero and raising
    /// `retention` to `measuring` when it is shorter.
    pub fn new(now: SimTimestamp, measuring: SimDuration, retention: SimDuration) -> Self {
        let measuring = measuring.max(SimDuration::ZERO);
        let retention = if retention < measuring {
            warn!(
                "Retention {} is shorter than the measuring window {}, using the window length",
                retention, measuring
            );
            measuring
        } else {
            retention
        };
        Self {
            now,
            measuring,
            retention,
        }
    }

    /// `T - M`
    #[inline]
    pub fn start(&self) -> SimTimestamp {
        self.now.saturating_sub(self.measuring)
    }

    /// `T - R`: closed intervals ending before this are dropped.
    #[inline]
    pub fn expiry_horizon(&self) -> SimTimestamp {
        self.now.saturating_sub(self.retention)
    }
}

/// Aggregates for one segment over one window. Durations stay in ticks; the
/// accessor methods convert on demand.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowSummary {
    pub occupied: SimDuration,
    pub visits: u32,
    /// Sum of per-visit velocities (m/s) over complete visits in the window.
    velocity_sum: f64,
    velocity_samples: u32,
}

impl WindowSummary {
    pub fn occupied_minutes(&self) -> f64 {
        self.occupied.ticks() as f64 / TICKS_PER_MINUTE as f64
    }

    /// Occupied time per visit in minutes, 0 without visits.
    pub fn average_duration_minutes(&self) -> f64 {
        if self.visits == 0 {
            return 0.0;
        }
        self.occupied_minutes() / f64::from(self.visits)
    }

    /// Mean velocity in m/s over complete visits, 0 without any.
    pub fn average_velocity_mps(&self) -> f64 {
        if self.velocity_samples == 0 {
            return 0.0;
        }
        self.velocity_sum / f64::from(self.velocity_samples)
    }

    /// Fraction of the window the segment was occupied, 0 for an empty window.
    pub fn occupied_fraction(&self, window: &MetricsWindow) -> f64 {
        if window.measuring.ticks() <= 0 {
            return 0.0;
        }
        self.occupied.ticks() as f64 / window.measuring.ticks() as f64
    }
}

/// Computes the [`WindowSummary`] of `intervals` for `window`.
///
/// `segment_length_m` is added to each visit's payload (train length) to get
/// the distance travelled during a full traversal.
pub fn summarize<'a, I>(
    intervals: I,
    window: &MetricsWindow,
    segment_length_m: f32,
) -> WindowSummary
where
    I: IntoIterator<Item = &'a OccupancyInterval>,
{
    let now = window.now;
    let window_start = window.start();
    let mut summary = WindowSummary::default();
    let mut occupied_ticks: i64 = 0;

    for interval in intervals {
        let elapsed = interval.elapsed(now).ticks();

        if interval.start >= window_start {
            // Entirely inside the window
            occupied_ticks += elapsed;
            summary.visits += 1;

            if let Some(end) = interval.end {
                let ticks = end.since(interval.start).ticks();
                if ticks > 0 {
                    let seconds = ticks as f64 / TICKS_PER_SECOND as f64;
                    let distance = f64::from(segment_length_m) + f64::from(interval.payload);
                    summary.velocity_sum += distance / seconds;
                    summary.velocity_samples += 1;
                }
            }
        } else if interval.end.map_or(true, |end| end > window_start) {
            // Started before the window, only the part inside counts
            let outside = window_start.since(interval.start).ticks();
            occupied_ticks += elapsed - outside;
            summary.visits += 1;
        }
    }

    summary.occupied = SimDuration(occupied_ticks.max(0));
    summary
}
