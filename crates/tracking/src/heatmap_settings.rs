//! Heatmap configuration: window lengths, per-mode bounds, active mode.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::normalize::Bounds;
use crate::overlay_mode::OverlayMode;
use crate::sim_time::{SimDuration, SimTimestamp};
use crate::window_metrics::MetricsWindow;

pub const DEFAULT_GRADIENT: &str = "cividis";
pub const DEFAULT_MEASURING_PERIOD_MINUTES: u32 = 30;
pub const DEFAULT_RETENTION_MINUTES: u32 = 60;
pub const DEFAULT_BUSYNESS_SCALE: f32 = 1.0;

/// Per-mode normalization bounds. Every mode always has an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeBounds {
    bounds: BTreeMap<OverlayMode, Bounds>,
}

impl Default for ModeBounds {
    fn default() -> Self {
        Self {
            bounds: OverlayMode::ALL
                .iter()
                .map(|&mode| (mode, mode.spec().default_bounds))
                .collect(),
        }
    }
}

impl ModeBounds {
    pub fn get(&self, mode: OverlayMode) -> Bounds {
        self.bounds
            .get(&mode)
            .copied()
            .unwrap_or(mode.spec().default_bounds)
    }

    pub fn set(&mut self, mode: OverlayMode, bounds: Bounds) {
        self.bounds.insert(mode, bounds);
    }

    pub fn set_minimum(&mut self, mode: OverlayMode, minimum: f32) {
        let mut bounds = self.get(mode);
        bounds.minimum = minimum;
        self.set(mode, bounds);
    }

    pub fn set_maximum(&mut self, mode: OverlayMode, maximum: f32) {
        let mut bounds = self.get(mode);
        bounds.maximum = maximum;
        self.set(mode, bounds);
    }

    pub fn iter(&self) -> impl Iterator<Item = (OverlayMode, Bounds)> + '_ {
        self.bounds.iter().map(|(&mode, &bounds)| (mode, bounds))
    }
}

/// User-facing heatmap settings, persisted to `settings.json`.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct HeatmapSettings {
    pub gradient_name: String,
    pub measuring_period_minutes: u32,
    /// Never shorter than the measuring period.
    pub retention_minutes: u32,
    pub mode_bounds: ModeBounds,
    pub active_mode: OverlayMode,
    /// Multiplies the normalized fraction before it is clamped to `[0, 1]`.
    pub busyness_scale: f32,
}

impl Default for HeatmapSettings {
    fn default() -> Self {
        Self {
            gradient_name: DEFAULT_GRADIENT.to_string(),
            measuring_period_minutes: DEFAULT_MEASURING_PERIOD_MINUTES,
            retention_minutes: DEFAULT_RETENTION_MINUTES,
            mode_bounds: ModeBounds::default(),
            active_mode: OverlayMode::default(),
            busyness_scale: DEFAULT_BUSYNESS_SCALE,
        }
    }
}

impl HeatmapSettings {
    /// The query window ending at `now`.
    pub fn window(&self, now: SimTimestamp) -> MetricsWindow {
        MetricsWindow::new(
            now,
            SimDuration::from_minutes(i64::from(self.measuring_period_minutes)),
            SimDuration::from_minutes(i64::from(self.retention_minutes)),
        )
    }

    /// Sets the measuring period, raising retention to match if needed.
    pub fn set_measuring_period(&mut self, minutes: u32) {
        self.measuring_period_minutes = minutes;
        if self.retention_minutes < minutes {
            self.retention_minutes = minutes;
        }
    }

    /// Sets the retention period, never below the measuring period.
    pub fn set_retention(&mut self, minutes: u32) {
        if minutes < self.measuring_period_minutes {
            warn!(
                "Retention of {} min is shorter than the {} min measuring period, keeping {} min",
                minutes, self.measuring_period_minutes, self.measuring_period_minutes
            );
        }
        self.retention_minutes = minutes.max(self.measuring_period_minutes);
    }

    pub fn active_bounds(&self) -> Bounds {
        self.mode_bounds.get(self.active_mode)
    }

    /// Normalizes `value` with `mode`'s bounds and applies the busyness scale.
    pub fn busyness_fraction(&self, mode: OverlayMode, value: f64) -> f32 {
        let fraction = self.mode_bounds.get(mode).normalize(value) * self.busyness_scale;
        if fraction.is_nan() {
            return 0.0;
        }
        fraction.clamp(0.0, 1.0)
    }
}
