use bevy::prelude::*;

pub mod driver;
pub mod driver_protocol;

/// Everything the heatmap needs: occupancy tracking, overlay colors and file
/// persistence.
///
/// The host owns [`tracking::SimClock`] and moves it forward itself.
pub struct HeatmapPlugin;

impl Plugin for HeatmapPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            tracking::TrackingPlugin,
            rendering::RenderingPlugin,
            save::SavePlugin,
        ));
    }
}
