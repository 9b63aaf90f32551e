//! Segment coloring for the heatmap overlay.
//!
//! [`HeatmapContext`] bundles everything a color query needs: the tracker,
//! settings, ramps, clock and host attributes. The host either calls it from
//! its own systems or reads the [`SegmentColors`] cache, which is rebuilt on
//! every [`RefreshOverlay`].

use std::collections::{BTreeSet, HashMap};

use bevy::color::Srgba;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use tracking::{
    HeatmapSettings, OccupancyTracker, OverlayMode, SegmentAttributeTable, SegmentId, SimClock,
    WindowSummary,
};

use crate::color_ramps::RampRegistry;

/// Recompute every segment's color.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RefreshOverlay;

/// Whether the host currently shows the overlay.
#[derive(Resource, Debug, Clone, Default)]
pub struct HeatmapOverlayState {
    pub visible: bool,
}

/// Raw metric, busyness fraction and color of one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySample {
    pub value: f64,
    pub fraction: f32,
    pub color: Srgba,
}

/// Last computed sample of every known segment.
#[derive(Resource, Debug, Clone, Default)]
pub struct SegmentColors {
    pub samples: HashMap<SegmentId, OverlaySample>,
}

impl SegmentColors {
    pub fn color(&self, segment: &SegmentId) -> Option<Srgba> {
        self.samples.get(segment).map(|sample| sample.color)
    }
}

#[derive(SystemParam)]
pub struct HeatmapContext<'w> {
    pub tracker: ResMut<'w, OccupancyTracker>,
    pub settings: Res<'w, HeatmapSettings>,
    pub ramps: Res<'w, RampRegistry>,
    pub clock: Res<'w, SimClock>,
    pub attributes: Res<'w, SegmentAttributeTable>,
}

impl HeatmapContext<'_> {
    /// Raw metric of `segment` for `mode` over the configured window.
    ///
    /// Occupancy-based modes sweep the segment's expired intervals as a side
    /// effect.
    pub fn metric_value(&mut self, mode: OverlayMode, segment: &SegmentId) -> f64 {
        let attributes = self.attributes.get_or_default(segment);
        let summary = if mode.uses_occupancy() {
            let window = self.settings.window(self.clock.now);
            self.tracker.query(segment, &window, attributes.length_m)
        } else {
            WindowSummary::default()
        };
        mode.metric(&summary, &attributes)
    }

    /// Metric, fraction and color of `segment` in the active mode.
    pub fn sample(&mut self, segment: &SegmentId) -> OverlaySample {
        let mode = self.settings.active_mode;
        let value = self.metric_value(mode, segment);
        let fraction = self.settings.busyness_fraction(mode, value);
        let color = self
            .ramps
            .resolve(&self.settings.gradient_name)
            .color_at(fraction);
        OverlaySample {
            value,
            fraction,
            color,
        }
    }

    pub fn color_of(&mut self, segment: &SegmentId) -> Srgba {
        self.sample(segment).color
    }

    /// `"<mode label>: <value with unit>"` for the hovered segment.
    pub fn tooltip_text(&mut self, segment: &SegmentId) -> String {
        let mode = self.settings.active_mode;
        let value = self.metric_value(mode, segment);
        format!("{}: {}", mode.label(), mode.format_value(value))
    }

    /// Every segment that either has attributes or recorded occupancy.
    pub fn known_segments(&self) -> BTreeSet<SegmentId> {
        self.attributes
            .iter()
            .map(|(id, _)| id.clone())
            .chain(self.tracker.segment_ids().cloned())
            .collect()
    }
}

pub fn refresh_segment_colors(
    mut events: EventReader<RefreshOverlay>,
    mut ctx: HeatmapContext,
    mut colors: ResMut<SegmentColors>,
) {
    if events.read().count() == 0 {
        return;
    }

    let window = ctx.settings.window(ctx.clock.now);
    let swept = ctx.tracker.sweep_all(&window);
    if swept > 0 {
        debug!("Heatmap refresh dropped {} expired interval(s)", swept);
    }

    let segments = ctx.known_segments();
    colors.samples = segments
        .into_iter()
        .map(|segment| {
            let sample = ctx.sample(&segment);
            (segment, sample)
        })
        .collect();
}

/// Settings or ramp edits take effect immediately rather than on the next
/// timed refresh.
pub fn refresh_on_config_change(
    settings: Res<HeatmapSettings>,
    ramps: Res<RampRegistry>,
    mut refresh: EventWriter<RefreshOverlay>,
) {
    if settings.is_changed() || ramps.is_changed() {
        refresh.send(RefreshOverlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::SystemState;
    use std::collections::BTreeMap;
    use tracking::{Bounds, SegmentAttributes, SimTimestamp};

    use crate::color_ramps::{GREEN, RED};

    fn world_with_green_red() -> World {
        let mut world = World::new();
        world.init_resource::<OccupancyTracker>();
        world.init_resource::<SimClock>();
        world.init_resource::<SegmentAttributeTable>();

        let mut ramps = RampRegistry::default();
        ramps
            .create_from_points("test", true, BTreeMap::from([(0, GREEN), (100, RED)]))
            .expect("valid ramp");
        world.insert_resource(ramps);

        let mut settings = HeatmapSettings {
            gradient_name: "test".into(),
            ..Default::default()
        };
        settings
            .mode_bounds
            .set(OverlayMode::TimeSpent, Bounds::new(0.0, 30.0));
        world.insert_resource(settings);
        world
    }

    fn set_now(world: &mut World, minutes: i64) {
        world.resource_mut::<SimClock>().now = SimTimestamp::from_minutes(minutes);
    }

    #[test]
    fn test_half_busy_segment_gets_midpoint_color() {
        let mut world = world_with_green_red();
        let id = SegmentId::from("s1");
        {
            let mut tracker = world.resource_mut::<OccupancyTracker>();
            tracker.enter(&id, SimTimestamp::ZERO, 0.0);
            tracker.exit(&id, SimTimestamp::from_minutes(15));
        }
        set_now(&mut world, 15);

        let mut state = SystemState::<HeatmapContext>::new(&mut world);
        let mut ctx = state.get_mut(&mut world);
        let sample = ctx.sample(&id);

        assert!((sample.value - 15.0).abs() < 1e-9, "got: {}", sample.value);
        assert!((sample.fraction - 0.5).abs() < 1e-6, "got: {}", sample.fraction);
        let c = sample.color;
        assert!((c.red - 0.5).abs() < 1e-5, "got: {c:?}");
        assert!((c.green - 0.5).abs() < 1e-5, "got: {c:?}");
        assert!(c.blue.abs() < 1e-5, "got: {c:?}");
        assert!((c.alpha - 1.0).abs() < 1e-6, "got: {c:?}");
    }

    #[test]
    fn test_unknown_segment_is_minimum_color() {
        let mut world = world_with_green_red();
        let mut state = SystemState::<HeatmapContext>::new(&mut world);
        let mut ctx = state.get_mut(&mut world);
        assert_eq!(ctx.color_of(&"nowhere".into()), GREEN);
    }

    #[test]
    fn test_static_mode_uses_attributes() {
        let mut world = world_with_green_red();
        world.resource_mut::<SegmentAttributeTable>().insert(
            "long".into(),
            SegmentAttributes {
                length_m: 2000.0,
                speed_limit_mps: 10.0,
                usage_count: 0,
            },
        );
        world.resource_mut::<HeatmapSettings>().active_mode = OverlayMode::NodeLength;

        let mut state = SystemState::<HeatmapContext>::new(&mut world);
        let mut ctx = state.get_mut(&mut world);
        let sample = ctx.sample(&"long".into());
        assert!((sample.value - 2.0).abs() < 1e-9, "got: {}", sample.value);
        assert_eq!(sample.color, RED, "above the 1 km maximum");
    }

    #[test]
    fn test_tooltip_names_mode_and_unit() {
        let mut world = world_with_green_red();
        let id = SegmentId::from("s1");
        world
            .resource_mut::<OccupancyTracker>()
            .enter(&id, SimTimestamp::ZERO, 0.0);
        set_now(&mut world, 12);

        let mut state = SystemState::<HeatmapContext>::new(&mut world);
        let mut ctx = state.get_mut(&mut world);
        assert_eq!(ctx.tooltip_text(&id), "Time spent: 12.0 min");
    }

    #[test]
    fn test_refresh_fills_cache_for_all_known_segments() {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            tracking::TrackingPlugin,
            crate::RenderingPlugin,
        ));
        app.world_mut()
            .resource_mut::<SegmentAttributeTable>()
            .insert("idle".into(), SegmentAttributes::default());
        app.world_mut()
            .resource_mut::<OccupancyTracker>()
            .enter(&"busy".into(), SimTimestamp::ZERO, 0.0);

        app.world_mut().send_event(RefreshOverlay);
        app.update();

        let colors = app.world().resource::<SegmentColors>();
        assert_eq!(colors.samples.len(), 2);
        assert!(colors.color(&"idle".into()).is_some());
    }
}
