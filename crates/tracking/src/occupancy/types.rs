//! Types for occupancy tracking.

use std::fmt;

use bitcode::{Decode, Encode};

use crate::sim_time::{SimDuration, SimTimestamp};

/// Opaque key identifying a track segment in the host world.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct SegmentId(pub String);

impl SegmentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SegmentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SegmentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One continuous stretch of time during which a segment was occupied.
#[derive(Debug, Clone, Copy, PartialEq, Encode, Decode)]
pub struct OccupancyInterval {
    pub start: SimTimestamp,
    /// `None` while the segment is still occupied.
    pub end: Option<SimTimestamp>,
    /// Length of the occupying train in metres. Only velocity metrics read it.
    pub payload: f32,
}

impl OccupancyInterval {
    pub fn open(start: SimTimestamp, payload: f32) -> Self {
        Self {
            start,
            end: None,
            payload,
        }
    }

    pub fn closed(start: SimTimestamp, end: SimTimestamp, payload: f32) -> Self {
        Self {
            start,
            end: Some(end.max(start)),
            payload,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Time occupied so far. Open intervals are measured up to `now`.
    #[inline]
    pub fn elapsed(&self, now: SimTimestamp) -> SimDuration {
        match self.end {
            Some(end) => end.since(self.start),
            None => now.since(self.start),
        }
    }
}

impl fmt::Display for OccupancyInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(
                f,
                "interval {}..{} ({})",
                self.start,
                end,
                end.since(self.start)
            ),
            None => write!(f, "interval {}..(open)", self.start),
        }
    }
}

/// Result of an enter report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterOutcome {
    /// A new open interval was appended.
    Opened,
    /// The segment already had an open interval; nothing changed.
    AlreadyOccupied,
}

/// Result of an exit report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The open interval was closed after being occupied for `elapsed`.
    Closed { elapsed: SimDuration },
    /// There was no open interval to close.
    NotOccupied,
}

/// Tracker states that indicate missed or out-of-order host reports.
///
/// These are logged and absorbed, never returned as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerInconsistency {
    /// An exit arrived for a segment with no open interval.
    ExitWithoutEnter(SegmentId),
    /// A metric was requested for a segment that was never occupied.
    UnknownSegment(SegmentId),
    /// An exit was reported at a time before the interval started.
    ExitBeforeStart {
        segment: SegmentId,
        start: SimTimestamp,
        exit: SimTimestamp,
    },
}

impl fmt::Display for TrackerInconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExitWithoutEnter(id) => write!(
                f,
                "an occupant left segment {id} but the segment was never registered as occupied"
            ),
            Self::UnknownSegment(id) => {
                write!(f, "segment {id} has no recorded occupancy")
            }
            Self::ExitBeforeStart {
                segment,
                start,
                exit,
            } => write!(
                f,
                "segment {segment} exit at {exit} precedes its start at {start}, clamping"
            ),
        }
    }
}
