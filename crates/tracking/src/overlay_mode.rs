//! Overlay modes and the table that drives them.
//!
//! Each mode is one row in [`MODE_TABLE`]: its persisted name, display label,
//! unit, default bounds and the function that extracts the raw metric from a
//! window summary and the segment's static attributes. Adding a mode means
//! adding a variant and a row; nothing else switches on the mode.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::normalize::Bounds;
use crate::segments::SegmentAttributes;
use crate::window_metrics::WindowSummary;

/// m/s to km/h
const MPS_TO_KMH: f64 = 3.6;

/// What the heatmap colors segments by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
pub enum OverlayMode {
    /// Minutes occupied within the measuring window.
    #[default]
    #[serde(rename = "time spent")]
    TimeSpent,
    /// Visits overlapping the measuring window.
    #[serde(rename = "visits")]
    Visits,
    /// Average minutes per visit within the window.
    #[serde(rename = "avg. duration")]
    AverageDuration,
    /// Average traversal speed of complete visits, km/h.
    #[serde(rename = "avg. speed")]
    AverageVelocity,
    /// Segment speed limit, km/h.
    #[serde(rename = "max. speed")]
    MaximumVelocity,
    /// Segment length, km.
    #[serde(rename = "node length")]
    NodeLength,
    /// Host lifetime visit counter.
    #[serde(rename = "total visits")]
    TotalVisits,
}

/// One row of the mode table.
pub struct ModeSpec {
    pub mode: OverlayMode,
    /// Stable name used in settings files and dropdowns.
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub default_bounds: Bounds,
    pub metric: fn(&WindowSummary, &SegmentAttributes) -> f64,
}

/// Indexed by `OverlayMode as usize`.
pub static MODE_TABLE: [ModeSpec; 7] = [
    ModeSpec {
        mode: OverlayMode::TimeSpent,
        name: "time spent",
        label: "Time spent",
        unit: "min",
        default_bounds: Bounds::new(0.0, 30.0),
        metric: |summary, _| summary.occupied_minutes(),
    },
    ModeSpec {
        mode: OverlayMode::Visits,
        name: "visits",
        label: "Visits",
        unit: "",
        default_bounds: Bounds::new(0.0, 5.0),
        metric: |summary, _| f64::from(summary.visits),
    },
    ModeSpec {
        mode: OverlayMode::AverageDuration,
        name: "avg. duration",
        label: "Average duration",
        unit: "min",
        default_bounds: Bounds::new(0.0, 10.0),
        metric: |summary, _| summary.average_duration_minutes(),
    },
    ModeSpec {
        mode: OverlayMode::AverageVelocity,
        name: "avg. speed",
        label: "Average speed",
        unit: "km/h",
        default_bounds: Bounds::new(0.0, 80.0),
        metric: |summary, _| summary.average_velocity_mps() * MPS_TO_KMH,
    },
    ModeSpec {
        mode: OverlayMode::MaximumVelocity,
        name: "max. speed",
        label: "Maximum speed",
        unit: "km/h",
        default_bounds: Bounds::new(0.0, 80.0),
        metric: |_, attributes| f64::from(attributes.speed_limit_mps) * MPS_TO_KMH,
    },
    ModeSpec {
        mode: OverlayMode::NodeLength,
        name: "node length",
        label: "Length",
        unit: "km",
        default_bounds: Bounds::new(0.0, 1.0),
        metric: |_, attributes| f64::from(attributes.length_m) / 1000.0,
    },
    ModeSpec {
        mode: OverlayMode::TotalVisits,
        name: "total visits",
        label: "Total visits",
        unit: "",
        default_bounds: Bounds::new(0.0, 5.0),
        metric: |_, attributes| f64::from(attributes.usage_count),
    },
];

impl OverlayMode {
    /// All modes in dropdown order.
    pub const ALL: [OverlayMode; 7] = [
        Self::TimeSpent,
        Self::Visits,
        Self::AverageDuration,
        Self::AverageVelocity,
        Self::MaximumVelocity,
        Self::NodeLength,
        Self::TotalVisits,
    ];

    #[inline]
    pub fn spec(self) -> &'static ModeSpec {
        &MODE_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn from_name(name: &str) -> Option<Self> {
        MODE_TABLE
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(name.trim()))
            .map(|spec| spec.mode)
    }

    /// Whether the metric depends on recorded occupancy rather than only on
    /// static segment attributes.
    pub fn uses_occupancy(self) -> bool {
        matches!(
            self,
            Self::TimeSpent | Self::Visits | Self::AverageDuration | Self::AverageVelocity
        )
    }

    pub fn metric(self, summary: &WindowSummary, attributes: &SegmentAttributes) -> f64 {
        (self.spec().metric)(summary, attributes)
    }

    /// Formats `value` with this mode's unit for tooltips.
    pub fn format_value(self, value: f64) -> String {
        let spec = self.spec();
        let number = match self {
            Self::Visits | Self::TotalVisits => format!("{}", value.round() as i64),
            Self::NodeLength => format!("{value:.2}"),
            _ => format!("{value:.1}"),
        };
        if spec.unit.is_empty() {
            number
        } else {
            format!("{number} {}", spec.unit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_discriminant() {
        for mode in OverlayMode::ALL {
            assert_eq!(mode.spec().mode, mode, "row for {mode:?} is out of order");
        }
    }

    #[test]
    fn test_names_are_unique_and_round_trip() {
        for mode in OverlayMode::ALL {
            assert_eq!(OverlayMode::from_name(mode.name()), Some(mode));
        }
        let mut names: Vec<_> = OverlayMode::ALL.iter().map(|m| m.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), OverlayMode::ALL.len());
    }

    #[test]
    fn test_from_name_unknown() {
        assert_eq!(OverlayMode::from_name("pollution"), None);
    }

    #[test]
    fn test_serde_uses_table_names() {
        for mode in OverlayMode::ALL {
            let json = serde_json::to_string(&mode).expect("serialize");
            assert_eq!(json, format!("\"{}\"", mode.name()));
        }
    }

    #[test]
    fn test_static_metrics_convert_units() {
        let attributes = SegmentAttributes {
            length_m: 1500.0,
            speed_limit_mps: 25.0,
            usage_count: 12,
        };
        let summary = WindowSummary::default();
        assert!((OverlayMode::NodeLength.metric(&summary, &attributes) - 1.5).abs() < 1e-9);
        assert!((OverlayMode::MaximumVelocity.metric(&summary, &attributes) - 90.0).abs() < 1e-4);
        assert_eq!(OverlayMode::TotalVisits.metric(&summary, &attributes), 12.0);
    }

    #[test]
    fn test_format_value_units() {
        assert_eq!(OverlayMode::TimeSpent.format_value(12.345), "12.3 min");
        assert_eq!(OverlayMode::Visits.format_value(3.0), "3");
        assert_eq!(OverlayMode::NodeLength.format_value(0.4), "0.40 km");
    }
}
