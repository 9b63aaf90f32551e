//! Window queries on the tracker: sweep, then summarize.

use bevy::prelude::*;

use super::summary::{summarize, MetricsWindow, WindowSummary};
use super::sweep::sweep_expired;
use crate::occupancy::{OccupancyTracker, SegmentId, TrackerInconsistency};

impl OccupancyTracker {
    /// Sweeps expired intervals of `segment` and summarizes the rest over
    /// `window`. Unknown segments yield an all-zero summary.
    pub fn query(
        &mut self,
        segment: &SegmentId,
        window: &MetricsWindow,
        segment_length_m: f32,
    ) -> WindowSummary {
        let Some(intervals) = self.segments.get_mut(segment) else {
            warn!("{}", TrackerInconsistency::UnknownSegment(segment.clone()));
            return WindowSummary::default();
        };

        let removed = sweep_expired(intervals, window.expiry_horizon());
        if removed > 0 {
            debug!(
                "Segment {}: dropped {} interval(s) that ended before {}",
                segment,
                removed,
                window.expiry_horizon()
            );
        }

        summarize(intervals.iter(), window, segment_length_m)
    }

    /// Sweeps every segment without computing metrics. Returns the number of
    /// intervals removed.
    pub fn sweep_all(&mut self, window: &MetricsWindow) -> usize {
        let horizon = window.expiry_horizon();
        self.segments
            .values_mut()
            .map(|intervals| sweep_expired(intervals, horizon))
            .sum()
    }
}
