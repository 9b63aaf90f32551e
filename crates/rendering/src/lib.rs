use bevy::prelude::*;

pub mod auto_refresh;
pub mod color_ramps;
pub mod heatmap_overlay;

use auto_refresh::AutoRefresh;
use color_ramps::RampRegistry;
use heatmap_overlay::{HeatmapOverlayState, RefreshOverlay, SegmentColors};
use tracking::HeatmapSet;

pub use heatmap_overlay::{HeatmapContext, OverlaySample};

/// Color ramps, the overlay color cache and its refresh cadence.
///
/// Expects [`tracking::TrackingPlugin`] for the tracker and settings
/// resources.
pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RampRegistry>()
            .init_resource::<SegmentColors>()
            .init_resource::<HeatmapOverlayState>()
            .init_resource::<AutoRefresh>()
            .add_event::<RefreshOverlay>()
            .add_systems(
                Update,
                (
                    auto_refresh::drive_auto_refresh,
                    heatmap_overlay::refresh_on_config_change,
                    heatmap_overlay::refresh_segment_colors,
                )
                    .chain()
                    .in_set(HeatmapSet::Present),
            );
    }
}
