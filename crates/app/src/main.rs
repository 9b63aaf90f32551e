use bevy::prelude::*;

use heatmap::driver::{build_headless_app, process_command, run_driver_mode};
use heatmap::driver_protocol::{DriverCommand, ResponsePayload};
use save::HeatmapPaths;

/// A short shift on a three-segment line: one train passes through, a second
/// one parks on the platform.
const DEMO_SCRIPT: &str = r#"
{"cmd":"segment","id":"approach","length_m":800,"speed_limit_mps":22}
{"cmd":"segment","id":"platform","length_m":250,"speed_limit_mps":8}
{"cmd":"segment","id":"depot","length_m":400,"speed_limit_mps":5}
{"cmd":"enter","segment":"approach","payload":120}
{"cmd":"advance","minutes":1.5}
{"cmd":"exit","segment":"approach"}
{"cmd":"enter","segment":"platform","payload":120}
{"cmd":"advance","minutes":6}
{"cmd":"exit","segment":"platform"}
{"cmd":"enter","segment":"depot","payload":120}
{"cmd":"advance","minutes":2}
{"cmd":"enter","segment":"approach","payload":90}
{"cmd":"advance","minutes":1}
{"cmd":"exit","segment":"approach"}
{"cmd":"enter","segment":"platform","payload":90}
{"cmd":"advance","minutes":15}
{"cmd":"query"}
{"cmd":"set_mode","mode":"avg. speed"}
{"cmd":"query"}
{"cmd":"set_mode","mode":"visits"}
{"cmd":"advance","minutes":40}
{"cmd":"query"}
"#;

fn main() {
    let mut args = std::env::args().skip(1);
    let mut driver = false;
    let mut paths = HeatmapPaths::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--driver" => driver = true,
            "--root" => match args.next() {
                Some(root) => paths = HeatmapPaths::new(root),
                None => {
                    eprintln!("--root needs a directory");
                    std::process::exit(2);
                }
            },
            other => {
                eprintln!("unknown argument '{other}' (expected --driver, --root <dir>)");
                std::process::exit(2);
            }
        }
    }

    if driver {
        if let Err(e) = run_driver_mode(paths) {
            eprintln!("driver stopped: {e}");
            std::process::exit(1);
        }
    } else {
        run_demo(paths);
    }
}

/// Replays [`DEMO_SCRIPT`] and logs the overlay after each query.
fn run_demo(paths: HeatmapPaths) {
    let mut app = build_headless_app(paths, true);

    for line in DEMO_SCRIPT.lines().filter(|l| !l.trim().is_empty()) {
        let cmd: DriverCommand = match serde_json::from_str(line) {
            Ok(cmd) => cmd,
            Err(e) => {
                error!("Bad demo line {line}: {e}");
                continue;
            }
        };
        match process_command(cmd, &mut app).payload {
            ResponsePayload::Samples {
                now_minutes,
                mode,
                samples,
            } => {
                info!("t = {now_minutes:.1} min, mode '{mode}'");
                for (segment, sample) in samples {
                    info!("  {segment:<10} {:<24} {}", sample.tooltip, sample.color);
                }
            }
            ResponsePayload::Error { message } => warn!("Demo step failed: {message}"),
            _ => {}
        }
    }
}
