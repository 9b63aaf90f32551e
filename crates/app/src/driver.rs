//! Headless `--driver` mode: a blocking loop that reads JSON commands from
//! stdin, applies them to a heatmap `App` and writes JSON responses to
//! stdout.
//!
//! The clock only moves on `advance`, so a script replays identically.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use bevy::ecs::system::SystemState;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use rendering::color_ramps::{to_hex, RampRegistry};
use rendering::HeatmapContext;
use save::gradient_io::{ramp_from_hex_colors, save_gradients};
use save::settings_io::save_settings;
use save::tracker_io::{load_tracker, save_tracker};
use save::HeatmapPaths;
use tracking::sim_time::TICKS_PER_MINUTE;
use tracking::{
    HeatmapSettings, OccupancyReport, OverlayMode, RecoverOccupancy, ResetHeatmapSession,
    SegmentAttributeTable, SegmentAttributes, SegmentEntered, SegmentExited, SegmentId, SimClock,
    SimDuration,
};

use crate::driver_protocol::{
    make_response, DriverCommand, DriverResponse, ResponsePayload, SampleReport,
};
use crate::HeatmapPlugin;

/// Headless app with a script-driven clock. Startup systems have run.
///
/// The driver loop runs without `LogPlugin` so stdout carries protocol lines
/// only.
pub fn build_headless_app(paths: HeatmapPaths, logging: bool) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    if logging {
        app.add_plugins(LogPlugin::default());
    }
    app.insert_resource(paths).add_plugins(HeatmapPlugin);
    app.update();
    app
}

/// Runs the protocol loop until `quit` or end of input.
///
/// Fails when stdin cannot be read or stdout is gone.
pub fn run_driver_mode(paths: HeatmapPaths) -> io::Result<()> {
    let mut app = build_headless_app(paths, false);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    write_response(&mut stdout, &make_response(ResponsePayload::Ready))?;
    info!("heatmap driver v{} ready", crate::driver_protocol::PROTOCOL_VERSION);

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<DriverCommand>(&line) {
            Ok(cmd) => process_command(cmd, &mut app),
            Err(e) => make_response(ResponsePayload::Error {
                message: format!("Parse error: {e}"),
            }),
        };
        write_response(&mut stdout, &response)?;
        if matches!(response.payload, ResponsePayload::Goodbye) {
            break;
        }
    }

    info!("heatmap driver shutting down");
    Ok(())
}

fn write_response(out: &mut impl Write, response: &DriverResponse) -> io::Result<()> {
    serde_json::to_writer(&mut *out, response)?;
    writeln!(out)?;
    out.flush()
}

fn error_response(message: impl Into<String>) -> DriverResponse {
    make_response(ResponsePayload::Error {
        message: message.into(),
    })
}

fn failed(e: impl std::fmt::Display) -> DriverResponse {
    error_response(e.to_string())
}

fn parse_mode(name: &str) -> Result<OverlayMode, DriverResponse> {
    OverlayMode::from_name(name).ok_or_else(|| error_response(format!("Unknown mode '{name}'")))
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

pub fn process_command(cmd: DriverCommand, app: &mut App) -> DriverResponse {
    match apply_command(cmd, app) {
        Ok(payload) => make_response(payload),
        Err(response) => response,
    }
}

fn apply_command(cmd: DriverCommand, app: &mut App) -> Result<ResponsePayload, DriverResponse> {
    match cmd {
        DriverCommand::Segment {
            id,
            length_m,
            speed_limit_mps,
            usage_count,
        } => {
            app.world_mut().resource_mut::<SegmentAttributeTable>().insert(
                SegmentId::from(id),
                SegmentAttributes {
                    length_m,
                    speed_limit_mps,
                    usage_count,
                },
            );
        }
        DriverCommand::Enter { segment, payload } => {
            app.world_mut().send_event(OccupancyReport::from(SegmentEntered {
                segment: segment.into(),
                payload,
            }));
            app.update();
        }
        DriverCommand::Exit {
            segment,
            occupants_remaining,
        } => {
            app.world_mut().send_event(OccupancyReport::from(SegmentExited {
                segment: segment.into(),
                occupants_remaining,
            }));
            app.update();
        }
        DriverCommand::Recover { occupied } => {
            app.world_mut().send_event(RecoverOccupancy {
                occupied: occupied
                    .into_iter()
                    .map(|(segment, payload)| (SegmentId::from(segment), payload))
                    .collect(),
            });
            app.update();
        }
        DriverCommand::Advance { minutes } => {
            if !minutes.is_finite() || minutes < 0.0 {
                return Err(error_response(format!("Cannot advance by {minutes} minutes")));
            }
            let span = SimDuration((minutes * TICKS_PER_MINUTE as f64).round() as i64);
            {
                let mut clock = app.world_mut().resource_mut::<SimClock>();
                let now = clock.now.plus(span);
                clock.set(now);
            }
            app.update();
        }
        DriverCommand::SetMode { mode } => {
            let mode = parse_mode(&mode)?;
            app.world_mut().resource_mut::<HeatmapSettings>().active_mode = mode;
            app.update();
        }
        DriverCommand::SetGradient { name } => {
            if app.world().resource::<RampRegistry>().get(&name).is_none() {
                return Err(error_response(format!("Unknown gradient '{name}'")));
            }
            app.world_mut().resource_mut::<HeatmapSettings>().gradient_name = name;
            app.update();
        }
        DriverCommand::SetBounds {
            mode,
            minimum,
            maximum,
        } => {
            let mode = parse_mode(&mode)?;
            {
                let mut settings = app.world_mut().resource_mut::<HeatmapSettings>();
                if let Some(minimum) = minimum {
                    settings.mode_bounds.set_minimum(mode, minimum);
                }
                if let Some(maximum) = maximum {
                    settings.mode_bounds.set_maximum(mode, maximum);
                }
            }
            app.update();
        }
        DriverCommand::SetWindow {
            measuring_minutes,
            retention_minutes,
        } => {
            {
                let mut settings = app.world_mut().resource_mut::<HeatmapSettings>();
                if let Some(minutes) = measuring_minutes {
                    settings.set_measuring_period(minutes);
                }
                if let Some(minutes) = retention_minutes {
                    settings.set_retention(minutes);
                }
            }
            app.update();
        }
        DriverCommand::CreateGradient { name, colors } => {
            let ramp = ramp_from_hex_colors(&name, &colors).map_err(failed)?;
            app.world_mut()
                .resource_mut::<RampRegistry>()
                .save_editable(ramp)
                .map_err(failed)?;
            app.update();
        }
        DriverCommand::Query { segments } => {
            let samples = sample_segments(app, &segments);
            let world = app.world();
            return Ok(ResponsePayload::Samples {
                now_minutes: world.resource::<SimClock>().now.as_minutes(),
                mode: world.resource::<HeatmapSettings>().active_mode.name().to_string(),
                samples,
            });
        }
        DriverCommand::Save { name } => {
            let saves_dir = app.world().resource::<HeatmapPaths>().saves_dir();
            save_tracker(app.world(), &saves_dir, &name).map_err(failed)?;
        }
        DriverCommand::Load { name } => {
            let saves_dir = app.world().resource::<HeatmapPaths>().saves_dir();
            load_tracker(app.world_mut(), &saves_dir, &name).map_err(failed)?;
            app.update();
        }
        DriverCommand::SaveConfig => {
            let world = app.world();
            let paths = world.resource::<HeatmapPaths>();
            save_settings(&paths.settings_path(), world.resource::<HeatmapSettings>())
                .map_err(failed)?;
            save_gradients(&paths.gradients_path(), world.resource::<RampRegistry>())
                .map_err(failed)?;
        }
        DriverCommand::Reset => {
            app.world_mut().send_event(ResetHeatmapSession);
            app.update();
        }
        DriverCommand::Quit => return Ok(ResponsePayload::Goodbye),
    }
    Ok(ResponsePayload::Ok)
}

/// Samples `segments` in the active mode, or every known segment when the
/// list is empty.
pub fn sample_segments(app: &mut App, segments: &[String]) -> BTreeMap<String, SampleReport> {
    let world = app.world_mut();
    let mut state = SystemState::<HeatmapContext>::new(world);
    let mut ctx = state.get_mut(world);

    let ids: Vec<SegmentId> = if segments.is_empty() {
        ctx.known_segments().into_iter().collect()
    } else {
        segments.iter().map(|s| SegmentId::from(s.as_str())).collect()
    };

    ids.into_iter()
        .map(|id| {
            let sample = ctx.sample(&id);
            let tooltip = ctx.tooltip_text(&id);
            (
                id.to_string(),
                SampleReport {
                    value: sample.value,
                    fraction: sample.fraction,
                    color: to_hex(sample.color),
                    tooltip,
                },
            )
        })
        .collect()
}
