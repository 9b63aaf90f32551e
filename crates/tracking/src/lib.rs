use bevy::prelude::*;

pub mod heatmap_settings;
pub mod normalize;
pub mod occupancy;
pub mod overlay_mode;
pub mod segments;
pub mod sim_time;
pub mod snapshot_sections;
pub mod track_events;
pub mod window_metrics;

pub use heatmap_settings::HeatmapSettings;
pub use normalize::Bounds;
pub use occupancy::{OccupancyInterval, OccupancyTracker, SegmentId};
pub use overlay_mode::OverlayMode;
pub use segments::{SegmentAttributeTable, SegmentAttributes};
pub use sim_time::{SimClock, SimDuration, SimTimestamp};
pub use snapshot_sections::{SectionBlob, SectionRegistry, Sections, SnapshotSection};
pub use track_events::{
    HeatmapSet, OccupancyReport, RecoverOccupancy, ResetHeatmapSession, SegmentEntered,
    SegmentExited,
};
pub use window_metrics::{MetricsWindow, WindowSummary};

// ---------------------------------------------------------------------------
// Plugins
// ---------------------------------------------------------------------------

/// Occupancy tracking: resources, host events and the ingest systems.
pub struct TrackingPlugin;

impl Plugin for TrackingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OccupancyTracker>()
            .init_resource::<SimClock>()
            .init_resource::<SegmentAttributeTable>()
            .init_resource::<HeatmapSettings>()
            .add_event::<OccupancyReport>()
            .add_event::<RecoverOccupancy>()
            .add_event::<ResetHeatmapSession>()
            .configure_sets(Update, (HeatmapSet::Ingest, HeatmapSet::Present).chain())
            .add_systems(
                Update,
                (
                    track_events::apply_session_reset,
                    track_events::apply_occupancy_reports,
                    track_events::apply_recover_occupancy,
                )
                    .chain()
                    .in_set(HeatmapSet::Ingest),
            );

        if let Err(e) = app
            .world_mut()
            .get_resource_or_insert_with(SectionRegistry::default)
            .register::<OccupancyTracker>()
        {
            warn!("{e}");
        }
    }
}
