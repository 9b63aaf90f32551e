//! The `OccupancyTracker` resource: enter/exit/recover mutations.

use std::collections::{HashMap, VecDeque};

use bevy::prelude::*;
use bitcode::{Decode, Encode};

use super::types::{
    EnterOutcome, ExitOutcome, OccupancyInterval, SegmentId, TrackerInconsistency,
};
use crate::sim_time::SimTimestamp;

/// Occupancy history of every segment seen this session.
#[derive(Resource, Debug, Clone, Default)]
pub struct OccupancyTracker {
    pub(crate) segments: HashMap<SegmentId, VecDeque<OccupancyInterval>>,
}

impl OccupancyTracker {
    /// Registers `segment` as occupied at `now`.
    pub fn enter(&mut self, segment: &SegmentId, now: SimTimestamp, payload: f32) -> EnterOutcome {
        self.enter_inner(segment, now, payload, false)
    }

    /// Registers `segment` as cleared at `now`.
    ///
    /// The caller must only report an exit once the host's occupant count for
    /// the segment has dropped to zero.
    pub fn exit(&mut self, segment: &SegmentId, now: SimTimestamp) -> ExitOutcome {
        let open = self
            .segments
            .get_mut(segment)
            .and_then(|intervals| intervals.back_mut())
            .filter(|interval| interval.is_open());

        let Some(interval) = open else {
            warn!("{}", TrackerInconsistency::ExitWithoutEnter(segment.clone()));
            return ExitOutcome::NotOccupied;
        };

        let end = if now < interval.start {
            warn!(
                "{}",
                TrackerInconsistency::ExitBeforeStart {
                    segment: segment.clone(),
                    start: interval.start,
                    exit: now,
                }
            );
            interval.start
        } else {
            now
        };
        interval.end = Some(end);
        let elapsed = interval.elapsed(end);
        info!(
            "Registered: segment {} is no longer occupied, it was occupied for {}",
            segment, elapsed
        );
        ExitOutcome::Closed { elapsed }
    }

    /// Opens intervals for segments that are occupied but were never reported,
    /// e.g. after a save was loaded mid-run. Returns how many were opened.
    pub fn recover_all<I>(&mut self, currently_occupied: I, now: SimTimestamp) -> usize
    where
        I: IntoIterator<Item = (SegmentId, f32)>,
    {
        currently_occupied
            .into_iter()
            .filter(|(segment, payload)| {
                self.enter_inner(segment, now, *payload, true) == EnterOutcome::Opened
            })
            .count()
    }

    fn enter_inner(
        &mut self,
        segment: &SegmentId,
        now: SimTimestamp,
        payload: f32,
        recovered: bool,
    ) -> EnterOutcome {
        let intervals = self.segments.entry(segment.clone()).or_default();

        if intervals.back().is_some_and(OccupancyInterval::is_open) {
            debug!("Segment {} is already tracked as occupied", segment);
            return EnterOutcome::AlreadyOccupied;
        }

        intervals.push_back(OccupancyInterval::open(now, payload));
        if recovered {
            warn!(
                "Found unregistered occupant on segment {}, the segment is now occupied",
                segment
            );
        } else {
            info!("Registered: segment {} is now occupied", segment);
        }
        EnterOutcome::Opened
    }

    /// Drops all history. Called when the owning session ends.
    pub fn reset(&mut self) {
        self.segments.clear();
    }

    pub fn intervals(&self, segment: &SegmentId) -> Option<&VecDeque<OccupancyInterval>> {
        self.segments.get(segment)
    }

    pub fn is_occupied(&self, segment: &SegmentId) -> bool {
        self.segments
            .get(segment)
            .and_then(VecDeque::back)
            .is_some_and(OccupancyInterval::is_open)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn interval_count(&self) -> usize {
        self.segments.values().map(VecDeque::len).sum()
    }

    pub fn segment_ids(&self) -> impl Iterator<Item = &SegmentId> {
        self.segments.keys()
    }

    /// Replaces the whole history with a restored snapshot.
    ///
    /// Snapshots come from disk, so ordering and the single-open-interval rule
    /// are re-established here: intervals are sorted by start and any open
    /// interval that is not the newest is closed where its successor starts.
    pub fn restore(&mut self, snapshot: TrackerSnapshot) {
        self.segments = snapshot
            .segments
            .into_iter()
            .map(|(id, mut intervals)| {
                intervals.sort_by_key(|interval| interval.start);
                let next_starts: Vec<SimTimestamp> =
                    intervals.iter().skip(1).map(|interval| interval.start).collect();
                for (interval, next_start) in intervals.iter_mut().zip(next_starts) {
                    if interval.is_open() {
                        warn!(
                            "Restored segment {} had a stale open {}, closing it at {}",
                            id, interval, next_start
                        );
                        interval.end = Some(next_start);
                    }
                }
                (id, intervals.into_iter().collect())
            })
            .collect();
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        let mut segments: Vec<(SegmentId, Vec<OccupancyInterval>)> = self
            .segments
            .iter()
            .map(|(id, intervals)| (id.clone(), intervals.iter().copied().collect()))
            .collect();
        segments.sort_by(|a, b| a.0.cmp(&b.0));
        TrackerSnapshot { segments }
    }
}

/// Serializable form of [`OccupancyTracker`], sorted by segment id.
#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct TrackerSnapshot {
    pub segments: Vec<(SegmentId, Vec<OccupancyInterval>)>,
}

impl crate::SnapshotSection for OccupancyTracker {
    const SECTION: &'static str = "occupancy_tracker";
    const VERSION: u32 = 1;

    fn encode_section(&self) -> Option<Vec<u8>> {
        // Nothing recorded yet
        if self.segments.is_empty() {
            return None;
        }
        Some(bitcode::encode(&self.snapshot()))
    }

    fn decode_section(bytes: &[u8]) -> Result<Self, bitcode::Error> {
        let snapshot: TrackerSnapshot = bitcode::decode(bytes)?;
        let mut tracker = Self::default();
        tracker.restore(snapshot);
        Ok(tracker)
    }
}
