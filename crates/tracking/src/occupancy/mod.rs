//! Occupancy interval bookkeeping per track segment.
//!
//! The host reports when a segment becomes occupied and when its last occupant
//! leaves. Each report opens or closes an [`OccupancyInterval`] in the
//! [`OccupancyTracker`] resource. Intervals for one segment are kept in a
//! `VecDeque` in arrival order, which is also start-time order, and only the
//! window expiry sweep ever removes them.
//!
//! Key behaviors:
//! - A segment has at most one open interval, and it is always the newest one
//! - Duplicate enter reports for an occupied segment are silently ignored
//! - An exit without an open interval is logged as an inconsistency and ignored
//! - After a reload, `recover_all` re-opens intervals for every segment the host
//!   still reports as occupied

mod tracker;
mod types;

#[cfg(test)]
mod tests;

pub use tracker::{OccupancyTracker, TrackerSnapshot};
pub use types::{
    EnterOutcome, ExitOutcome, OccupancyInterval, SegmentId, TrackerInconsistency,
};
