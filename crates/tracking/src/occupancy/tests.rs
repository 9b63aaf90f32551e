use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::sim_time::SimTimestamp;

const NUM_STEPS: usize = 2000;
const SEED: u64 = 0x5EED_0CC0_7A11_2024;

fn t(minutes: i64) -> SimTimestamp {
    SimTimestamp::from_minutes(minutes)
}

fn open_count(tracker: &OccupancyTracker, id: &SegmentId) -> usize {
    tracker
        .intervals(id)
        .map(|list| list.iter().filter(|i| i.is_open()).count())
        .unwrap_or(0)
}

#[test]
fn test_enter_opens_interval() {
    let mut tracker = OccupancyTracker::default();
    let id = SegmentId::from("s1");
    assert_eq!(tracker.enter(&id, t(3), 25.0), EnterOutcome::Opened);
    assert!(tracker.is_occupied(&id));

    let interval = tracker.intervals(&id).and_then(|l| l.back()).copied();
    assert_eq!(interval, Some(OccupancyInterval::open(t(3), 25.0)));
}

#[test]
fn test_double_enter_is_noop() {
    let mut tracker = OccupancyTracker::default();
    let id = SegmentId::from("s1");
    tracker.enter(&id, t(0), 0.0);
    assert_eq!(tracker.enter(&id, t(1), 0.0), EnterOutcome::AlreadyOccupied);
    assert_eq!(tracker.interval_count(), 1);
    assert_eq!(tracker.intervals(&id).and_then(|l| l.back()).map(|i| i.start), Some(t(0)));
}

#[test]
fn test_exit_closes_and_reports_elapsed() {
    let mut tracker = OccupancyTracker::default();
    let id = SegmentId::from("s1");
    tracker.enter(&id, t(2), 0.0);
    let outcome = tracker.exit(&id, t(9));
    assert_eq!(
        outcome,
        ExitOutcome::Closed {
            elapsed: crate::sim_time::SimDuration::from_minutes(7)
        }
    );
    assert!(!tracker.is_occupied(&id));
}

#[test]
fn test_exit_without_enter_is_noop() {
    let mut tracker = OccupancyTracker::default();
    let id = SegmentId::from("ghost");
    assert_eq!(tracker.exit(&id, t(1)), ExitOutcome::NotOccupied);
    assert_eq!(tracker.segment_count(), 0);

    tracker.enter(&id, t(2), 0.0);
    tracker.exit(&id, t(3));
    assert_eq!(tracker.exit(&id, t(4)), ExitOutcome::NotOccupied);
    assert_eq!(tracker.intervals(&id).and_then(|l| l.back()).and_then(|i| i.end), Some(t(3)));
}

#[test]
fn test_exit_before_start_is_clamped() {
    let mut tracker = OccupancyTracker::default();
    let id = SegmentId::from("s1");
    tracker.enter(&id, t(10), 0.0);
    let outcome = tracker.exit(&id, t(8));
    assert_eq!(
        outcome,
        ExitOutcome::Closed {
            elapsed: crate::sim_time::SimDuration::ZERO
        }
    );
    let interval = tracker.intervals(&id).and_then(|l| l.back()).copied();
    assert_eq!(interval.and_then(|i| i.end), Some(t(10)));
}

#[test]
fn test_at_most_one_open_interval_under_any_sequence() {
    let ids: Vec<SegmentId> = (0..4).map(|i| SegmentId(format!("seg{i}"))).collect();
    let mut tracker = OccupancyTracker::default();
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut now = 0i64;

    for step in 0..NUM_STEPS {
        now += rng.gen_range(0..30);
        let id = &ids[rng.gen_range(0..ids.len())];
        let stamp = SimTimestamp::from_seconds(now);
        if rng.gen_bool(0.5) {
            tracker.enter(id, stamp, 0.0);
        } else {
            tracker.exit(id, stamp);
        }

        for id in &ids {
            assert!(open_count(&tracker, id) <= 1, "step {step}: two open intervals on {id}");
            if let Some(list) = tracker.intervals(id) {
                let last = list.len().saturating_sub(1);
                for (i, interval) in list.iter().enumerate() {
                    assert!(
                        !interval.is_open() || i == last,
                        "step {step}: open interval not last on {id}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_intervals_ordered_with_non_negative_duration() {
    let ids: Vec<SegmentId> = (0..3).map(|i| SegmentId(format!("seg{i}"))).collect();
    let mut tracker = OccupancyTracker::default();
    let mut rng = StdRng::seed_from_u64(SEED ^ 0xFF);
    let mut now = 0i64;

    for _ in 0..NUM_STEPS {
        now += rng.gen_range(0..120);
        let id = &ids[rng.gen_range(0..ids.len())];
        // Late exit reports arrive with a timestamp slightly in the past
        let jitter = rng.gen_range(0..60);
        if rng.gen_bool(0.5) {
            tracker.enter(id, SimTimestamp::from_seconds(now), rng.gen_range(0.0..200.0));
        } else {
            tracker.exit(id, SimTimestamp::from_seconds(now - jitter));
        }
    }

    for id in &ids {
        let Some(list) = tracker.intervals(id) else {
            continue;
        };
        let mut previous_end: Option<SimTimestamp> = None;
        for interval in list {
            if let Some(end) = interval.end {
                assert!(end >= interval.start, "{id}: {interval:?} ends before it starts");
            }
            if let Some(prev) = previous_end {
                assert!(interval.start >= prev, "{id}: {interval:?} overlaps predecessor");
            }
            previous_end = interval.end;
        }
    }
}

#[test]
fn test_recover_all_counts_new_intervals() {
    let mut tracker = OccupancyTracker::default();
    let a = SegmentId::from("a");
    let b = SegmentId::from("b");
    tracker.enter(&a, t(0), 0.0);

    let opened = tracker.recover_all(vec![(a.clone(), 0.0), (b.clone(), 80.0)], t(5));
    assert_eq!(opened, 1);
    assert_eq!(open_count(&tracker, &a), 1);
    assert_eq!(tracker.intervals(&a).and_then(|l| l.back()).map(|i| i.start), Some(t(0)));
    assert_eq!(tracker.intervals(&b).and_then(|l| l.back()).map(|i| i.payload), Some(80.0));
}

#[test]
fn test_reset_drops_everything() {
    let mut tracker = OccupancyTracker::default();
    tracker.enter(&"a".into(), t(0), 0.0);
    tracker.enter(&"b".into(), t(0), 0.0);
    tracker.reset();
    assert_eq!(tracker.segment_count(), 0);
    assert_eq!(tracker.interval_count(), 0);
}

#[test]
fn test_snapshot_is_sorted_by_segment() {
    let mut tracker = OccupancyTracker::default();
    for name in ["zeta", "alpha", "mid"] {
        tracker.enter(&name.into(), t(0), 0.0);
    }
    let names: Vec<_> = tracker
        .snapshot()
        .segments
        .iter()
        .map(|(id, _)| id.as_str().to_string())
        .collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn test_restore_closes_stale_open_intervals() {
    let id = SegmentId::from("s1");
    let snapshot = TrackerSnapshot {
        segments: vec![(
            id.clone(),
            vec![
                OccupancyInterval::open(t(20), 0.0),
                OccupancyInterval::open(t(5), 0.0),
                OccupancyInterval::closed(t(0), t(3), 0.0),
            ],
        )],
    };
    let mut tracker = OccupancyTracker::default();
    tracker.restore(snapshot);

    let list: Vec<_> = tracker.intervals(&id).into_iter().flatten().copied().collect();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].start, t(0));
    assert_eq!(list[1].end, Some(t(20)), "stale open interval closed at successor start");
    assert!(list[2].is_open());
    assert_eq!(open_count(&tracker, &id), 1);
}

#[test]
fn test_inconsistency_messages_name_segment() {
    let msg = TrackerInconsistency::ExitWithoutEnter("s9".into()).to_string();
    assert!(msg.contains("s9"), "got: {msg}");
    let msg = TrackerInconsistency::UnknownSegment("s7".into()).to_string();
    assert!(msg.contains("s7"), "got: {msg}");
}
