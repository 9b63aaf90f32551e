use std::path::{Path, PathBuf};

use bevy::prelude::*;
use rendering::color_ramps::RampRegistry;
use rendering::heatmap_overlay::RefreshOverlay;
use tracking::{HeatmapSet, HeatmapSettings};

use crate::gradient_io::{load_gradients, save_gradients, GRADIENTS_FILE_NAME};
use crate::persist_error::PersistError;
use crate::settings_io::{load_settings, save_settings, SETTINGS_FILE_NAME};
use crate::tracker_io::{delete_tracker, load_tracker, rename_tracker, save_tracker};

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Where heatmap files live. Insert before adding [`SavePlugin`] to override
/// the default `heatmap/` directory.
#[derive(Resource, Debug, Clone)]
pub struct HeatmapPaths {
    pub root: PathBuf,
}

impl Default for HeatmapPaths {
    fn default() -> Self {
        Self {
            root: PathBuf::from("heatmap"),
        }
    }
}

impl HeatmapPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE_NAME)
    }

    pub fn gradients_path(&self) -> PathBuf {
        self.root.join(GRADIENTS_FILE_NAME)
    }

    pub fn saves_dir(&self) -> PathBuf {
        self.root.join("saves")
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Host saved its game as `save_name`.
#[derive(Event, Debug, Clone)]
pub struct SaveHeatmapData {
    pub save_name: String,
}

/// Host loaded the game saved as `save_name`.
#[derive(Event, Debug, Clone)]
pub struct LoadHeatmapData {
    pub save_name: String,
}

#[derive(Event, Debug, Clone)]
pub struct RenameHeatmapData {
    pub from: String,
    pub to: String,
}

#[derive(Event, Debug, Clone)]
pub struct DeleteHeatmapData {
    pub save_name: String,
}

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SaveHeatmapSettings;

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SaveGradients;

/// A file operation failed. Carries a user-facing message.
#[derive(Event, Debug, Clone)]
pub struct PersistFailed {
    pub text: String,
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// File persistence for settings, custom gradients and per-save tracker data.
///
/// Expects [`tracking::TrackingPlugin`] and [`rendering::RenderingPlugin`].
pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HeatmapPaths>()
            .add_event::<SaveHeatmapData>()
            .add_event::<LoadHeatmapData>()
            .add_event::<RenameHeatmapData>()
            .add_event::<DeleteHeatmapData>()
            .add_event::<SaveHeatmapSettings>()
            .add_event::<SaveGradients>()
            .add_event::<PersistFailed>();

        app.add_systems(Startup, load_persisted_config);
        app.add_systems(
            Update,
            (persist_config, handle_tracker_events)
                .chain()
                .after(HeatmapSet::Ingest)
                .before(HeatmapSet::Present),
        );
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn report(failed: &mut EventWriter<PersistFailed>, what: &str, path: &Path, err: PersistError) {
    let text = format!("{what} {} failed: {err}", path.display());
    error!("{text}");
    failed.send(PersistFailed { text });
}

/// Reads settings and custom gradients at startup. Broken files are logged
/// and the built-in defaults stay in place.
fn load_persisted_config(
    paths: Res<HeatmapPaths>,
    mut settings: ResMut<HeatmapSettings>,
    mut ramps: ResMut<RampRegistry>,
    mut failed: EventWriter<PersistFailed>,
) {
    let settings_path = paths.settings_path();
    match load_settings(&settings_path) {
        Ok(loaded) => *settings = loaded,
        Err(e) => report(&mut failed, "Loading", &settings_path, e),
    }

    let gradients_path = paths.gradients_path();
    if let Err(e) = load_gradients(&gradients_path, &mut ramps) {
        report(&mut failed, "Loading", &gradients_path, e);
    }

    if ramps.get(&settings.gradient_name).is_none() {
        warn!(
            "Configured gradient '{}' is not available, colors use the default ramp",
            settings.gradient_name
        );
    }
}

fn persist_config(
    mut settings_events: EventReader<SaveHeatmapSettings>,
    mut gradient_events: EventReader<SaveGradients>,
    paths: Res<HeatmapPaths>,
    settings: Res<HeatmapSettings>,
    ramps: Res<RampRegistry>,
    mut failed: EventWriter<PersistFailed>,
) {
    // Several requests in one frame collapse into one write
    if settings_events.read().count() > 0 {
        let path = paths.settings_path();
        if let Err(e) = save_settings(&path, &settings) {
            report(&mut failed, "Saving", &path, e);
        }
    }
    if gradient_events.read().count() > 0 {
        let path = paths.gradients_path();
        if let Err(e) = save_gradients(&path, &ramps) {
            report(&mut failed, "Saving", &path, e);
        }
    }
}

fn drain<E: Event>(world: &mut World) -> Vec<E> {
    world
        .get_resource_mut::<Events<E>>()
        .map(|mut events| events.drain().collect())
        .unwrap_or_default()
}

/// Exclusive system for the tracker file lifecycle. Needs the whole world
/// because saving and loading go through the `SectionRegistry`.
fn handle_tracker_events(world: &mut World) {
    let saves_dir = world.resource::<HeatmapPaths>().saves_dir();
    let mut failures = Vec::new();

    for SaveHeatmapData { save_name } in drain::<SaveHeatmapData>(world) {
        if let Err(e) = save_tracker(world, &saves_dir, &save_name) {
            failures.push(format!("Saving heatmap data '{save_name}' failed: {e}"));
        }
    }

    let mut loaded = false;
    for LoadHeatmapData { save_name } in drain::<LoadHeatmapData>(world) {
        match load_tracker(world, &saves_dir, &save_name) {
            Ok(_) => loaded = true,
            Err(e) => failures.push(format!("Loading heatmap data '{save_name}' failed: {e}")),
        }
    }

    for RenameHeatmapData { from, to } in drain::<RenameHeatmapData>(world) {
        if let Err(e) = rename_tracker(&saves_dir, &from, &to) {
            failures.push(format!("Renaming heatmap data '{from}' failed: {e}"));
        }
    }

    for DeleteHeatmapData { save_name } in drain::<DeleteHeatmapData>(world) {
        match delete_tracker(&saves_dir, &save_name) {
            Ok(()) => {}
            // A save that never had heatmap data has nothing to delete
            Err(PersistError::NotFound(_)) => {
                debug!("No heatmap data to delete for '{}'", save_name);
            }
            Err(e) => failures.push(format!("Deleting heatmap data '{save_name}' failed: {e}")),
        }
    }

    if loaded {
        world.send_event(RefreshOverlay);
    }
    for text in failures {
        error!("{text}");
        world.send_event(PersistFailed { text });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracking::{OccupancyTracker, OverlayMode, SegmentId, SimTimestamp};

    fn test_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("heatmap_save_plugin_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn app_at(root: &Path) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(HeatmapPaths::new(root))
            .add_plugins((
                tracking::TrackingPlugin,
                rendering::RenderingPlugin,
                SavePlugin,
            ));
        app
    }

    fn failures(app: &App) -> usize {
        app.world().resource::<Events<PersistFailed>>().len()
    }

    #[test]
    fn test_settings_saved_and_loaded_on_startup() {
        let root = test_root("settings");
        {
            let mut app = app_at(&root);
            app.update();
            app.world_mut().resource_mut::<HeatmapSettings>().active_mode = OverlayMode::Visits;
            app.world_mut().send_event(SaveHeatmapSettings);
            app.update();
            assert!(root.join("settings.json").exists());
        }

        let mut app = app_at(&root);
        app.update();
        assert_eq!(
            app.world().resource::<HeatmapSettings>().active_mode,
            OverlayMode::Visits
        );
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_broken_settings_keep_defaults_and_report() {
        let root = test_root("broken_settings");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("settings.json"), "{ not json").unwrap();

        let mut app = app_at(&root);
        app.update();
        assert_eq!(
            *app.world().resource::<HeatmapSettings>(),
            HeatmapSettings::default()
        );
        assert_eq!(failures(&app), 1);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_tracker_lifecycle_through_events() {
        let root = test_root("tracker");
        let mut app = app_at(&root);
        app.update();

        let id = SegmentId::from("s1");
        {
            let mut tracker = app.world_mut().resource_mut::<OccupancyTracker>();
            tracker.enter(&id, SimTimestamp::ZERO, 0.0);
            tracker.exit(&id, SimTimestamp::from_minutes(4));
        }
        app.world_mut().send_event(SaveHeatmapData {
            save_name: "slot1".into(),
        });
        app.update();
        assert!(root.join("saves/slot1.heatmapdata").exists());

        app.world_mut().resource_mut::<OccupancyTracker>().reset();
        app.world_mut().send_event(RenameHeatmapData {
            from: "slot1".into(),
            to: "slot2".into(),
        });
        app.update();
        app.world_mut().send_event(LoadHeatmapData {
            save_name: "slot2".into(),
        });
        app.update();
        assert_eq!(app.world().resource::<OccupancyTracker>().segment_count(), 1);

        app.world_mut().send_event(DeleteHeatmapData {
            save_name: "slot2".into(),
        });
        app.update();
        assert!(!root.join("saves/slot2.heatmapdata").exists());
        assert_eq!(failures(&app), 0);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_failed_rename_is_reported() {
        let root = test_root("failed_rename");
        let mut app = app_at(&root);
        app.update();
        app.world_mut().send_event(RenameHeatmapData {
            from: "missing".into(),
            to: "other".into(),
        });
        app.update();
        assert_eq!(failures(&app), 1);
        let _ = std::fs::remove_dir_all(&root);
    }
}
