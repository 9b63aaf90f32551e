//! Expiry sweep for one segment's interval list.

use std::collections::VecDeque;

use crate::occupancy::OccupancyInterval;
use crate::sim_time::SimTimestamp;

/// Removes closed intervals that ended before `horizon` and returns how many
/// were dropped.
///
/// Intervals are appended in start order and each one is closed before the
/// next opens, so end times are non-decreasing and the expired intervals form
/// a prefix. The sweep stops at the first interval that is open or still
/// inside the retention period.
pub fn sweep_expired(intervals: &mut VecDeque<OccupancyInterval>, horizon: SimTimestamp) -> usize {
    let mut removed = 0;
    while intervals
        .front()
        .and_then(|interval| interval.end)
        .is_some_and(|end| end < horizon)
    {
        intervals.pop_front();
        removed += 1;
    }
    removed
}
