//! Periodic overlay recomputation while the simulation runs.
//!
//! Once per real-time second [`AutoRefresh::tick`] decides whether the
//! overlay is due. Faster simulation speeds refresh more often since colors
//! change faster:
//!
//! | Multiplier | Refresh every |
//! |------------|---------------|
//! | 1x         | 5 s           |
//! | 5x         | 3 s           |
//! | other      | 1 s           |

use bevy::prelude::*;

use tracking::SimClock;

use crate::heatmap_overlay::{HeatmapOverlayState, RefreshOverlay};

/// Counts ticked seconds toward the next refresh.
#[derive(Resource, Debug)]
pub struct AutoRefresh {
    timer: Timer,
    iteration: u32,
}

impl Default for AutoRefresh {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(1.0, TimerMode::Repeating),
            iteration: 0,
        }
    }
}

impl AutoRefresh {
    /// Seconds between refreshes at `multiplier`.
    pub fn interval_for(multiplier: u32) -> u32 {
        match multiplier {
            1 => 5,
            5 => 3,
            _ => 1,
        }
    }

    /// Call once per real second. Returns `true` when the overlay should be
    /// recomputed. Paused time or a hidden overlay never refreshes and does
    /// not advance the count.
    pub fn tick(&mut self, time_running: bool, overlay_visible: bool, multiplier: u32) -> bool {
        if !time_running || !overlay_visible {
            return false;
        }
        self.iteration += 1;
        if self.iteration >= Self::interval_for(multiplier) {
            self.iteration = 0;
            return true;
        }
        false
    }
}

pub fn drive_auto_refresh(
    time: Res<Time>,
    clock: Res<SimClock>,
    overlay: Res<HeatmapOverlayState>,
    mut auto_refresh: ResMut<AutoRefresh>,
    mut refresh: EventWriter<RefreshOverlay>,
) {
    auto_refresh.timer.tick(time.delta());
    for _ in 0..auto_refresh.timer.times_finished_this_tick() {
        if auto_refresh.tick(clock.running, overlay.visible, clock.multiplier) {
            debug!("Auto-refreshing heatmap at in-game time {}", clock.now);
            refresh.send(RefreshOverlay);
        }
    }
}
