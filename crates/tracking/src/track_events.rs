//! Host-facing events and the systems that feed them into the tracker.
//!
//! Enter and exit reports share one event type so that a segment which is
//! left and re-entered within a single frame is applied in arrival order.

use bevy::prelude::*;

use crate::occupancy::{OccupancyTracker, SegmentId};
use crate::sim_time::SimClock;

/// An occupant moved onto `segment`.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentEntered {
    pub segment: SegmentId,
    /// Occupant length in metres.
    pub payload: f32,
}

/// An occupant left `segment`. The interval is only closed once
/// `occupants_remaining` reaches zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentExited {
    pub segment: SegmentId,
    pub occupants_remaining: u32,
}

/// One occupancy change reported by the host.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum OccupancyReport {
    Entered(SegmentEntered),
    Exited(SegmentExited),
}

impl From<SegmentEntered> for OccupancyReport {
    fn from(value: SegmentEntered) -> Self {
        Self::Entered(value)
    }
}

impl From<SegmentExited> for OccupancyReport {
    fn from(value: SegmentExited) -> Self {
        Self::Exited(value)
    }
}

/// Segments the host currently sees as occupied, sent after loading a save
/// or enabling the overlay mid-run.
#[derive(Event, Debug, Clone, Default)]
pub struct RecoverOccupancy {
    pub occupied: Vec<(SegmentId, f32)>,
}

/// The host session ended; all recorded occupancy is discarded.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ResetHeatmapSession;

/// Ordering of heatmap systems within `Update`.
///
/// ```text
/// Ingest  →  Present
/// ```
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum HeatmapSet {
    /// Apply host reports to the tracker.
    Ingest,
    /// Recompute colors from the tracker.
    Present,
}

pub fn apply_occupancy_reports(
    mut reports: EventReader<OccupancyReport>,
    clock: Res<SimClock>,
    mut tracker: ResMut<OccupancyTracker>,
) {
    let now = clock.now;
    for report in reports.read() {
        match report {
            OccupancyReport::Entered(entered) => {
                tracker.enter(&entered.segment, now, entered.payload);
            }
            OccupancyReport::Exited(exited) => {
                if exited.occupants_remaining > 0 {
                    debug!(
                        "Segment {} still has {} occupant(s), keeping it occupied",
                        exited.segment, exited.occupants_remaining
                    );
                    continue;
                }
                tracker.exit(&exited.segment, now);
            }
        }
    }
}

pub fn apply_recover_occupancy(
    mut events: EventReader<RecoverOccupancy>,
    clock: Res<SimClock>,
    mut tracker: ResMut<OccupancyTracker>,
) {
    for event in events.read() {
        let opened = tracker.recover_all(event.occupied.iter().cloned(), clock.now);
        if opened > 0 {
            info!("Recovered {} untracked occupied segment(s)", opened);
        }
    }
}

pub fn apply_session_reset(
    mut events: EventReader<ResetHeatmapSession>,
    mut tracker: ResMut<OccupancyTracker>,
) {
    if events.read().count() == 0 {
        return;
    }
    info!(
        "Heatmap session reset, discarding {} interval(s) on {} segment(s)",
        tracker.interval_count(),
        tracker.segment_count()
    );
    tracker.reset();
}
