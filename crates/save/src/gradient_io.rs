// ---------------------------------------------------------------------------
// gradient_io: custom_gradients.json <-> RampRegistry
// ---------------------------------------------------------------------------
//
// File layout (JSON array, one object per editable ramp):
//
//   [
//     { "name": "sunset", "colors": { "0": "#FFCC00", "100": "#AA0033" } }
//   ]
//
// Keys are percent positions. Built-in ramps are never written. One bad
// entry rejects the whole file so a half-applied gradient set never shows up.

use std::collections::BTreeMap;
use std::path::Path;

use bevy::color::Srgba;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use rendering::color_ramps::{to_hex, ColorRamp, RampRegistry};

use crate::atomic_write::atomic_write;
use crate::persist_error::PersistError;

pub const GRADIENTS_FILE_NAME: &str = "custom_gradients.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct GradientDto {
    name: String,
    colors: BTreeMap<String, String>,
}

impl GradientDto {
    fn from_ramp(ramp: &ColorRamp) -> Self {
        Self {
            name: ramp.name().to_string(),
            colors: ramp
                .control_points()
                .iter()
                .map(|(key, color)| (key.to_string(), to_hex(*color)))
                .collect(),
        }
    }

    fn into_ramp(self) -> Result<ColorRamp, PersistError> {
        ramp_from_hex_colors(&self.name, &self.colors)
    }
}

/// Editable ramp from `{"<percent>": "#RRGGBB[AA]"}` control points.
pub fn ramp_from_hex_colors(
    name: &str,
    colors: &BTreeMap<String, String>,
) -> Result<ColorRamp, PersistError> {
    let mut points = BTreeMap::new();
    for (key, hex) in colors {
        let percent = parse_percent(key).map_err(|e| PersistError::gradient(name, e))?;
        let color = Srgba::hex(hex).map_err(|e| {
            PersistError::gradient(name, format!("color '{hex}' at {key}%: {e}"))
        })?;
        points.insert(percent, color);
    }
    ColorRamp::from_control_points(name, true, points).map_err(|e| PersistError::gradient(name, e))
}

/// Percent key in `0..=100`. Decimal keys round to the nearest percent.
fn parse_percent(key: &str) -> Result<u8, String> {
    let value: f64 = key
        .trim()
        .parse()
        .map_err(|_| format!("key '{key}' is not a number"))?;
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(format!("key '{key}' is outside 0..=100"));
    }
    Ok(value.round() as u8)
}

/// Pretty JSON of every editable ramp in `registry`.
pub fn encode_gradients(registry: &RampRegistry) -> Result<String, PersistError> {
    let dtos: Vec<GradientDto> = registry.editable().map(GradientDto::from_ramp).collect();
    Ok(serde_json::to_string_pretty(&dtos)?)
}

/// Parses a gradient file. Any invalid entry fails the whole file.
pub fn decode_gradients(json: &str) -> Result<Vec<ColorRamp>, PersistError> {
    let dtos: Vec<GradientDto> = serde_json::from_str(json)?;
    dtos.into_iter().map(GradientDto::into_ramp).collect()
}

pub fn save_gradients(path: &Path, registry: &RampRegistry) -> Result<(), PersistError> {
    let json = encode_gradients(registry)?;
    atomic_write(path, json.as_bytes())?;
    info!(
        "Saved {} custom gradient(s) to {}",
        registry.editable().count(),
        path.display()
    );
    Ok(())
}

/// Replaces the registry's editable ramps with the file's contents.
///
/// A missing file is not an error and loads nothing. On failure the registry
/// is left untouched. Returns the number of ramps registered.
pub fn load_gradients(path: &Path, registry: &mut RampRegistry) -> Result<usize, PersistError> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No gradient file at {}", path.display());
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };
    let ramps = decode_gradients(&json)?;

    registry.clear_editable();
    let mut loaded = 0;
    for ramp in ramps {
        let name = ramp.name().to_string();
        match registry.register(ramp) {
            Ok(_) => loaded += 1,
            Err(e) => warn!("Skipping gradient '{}' from {}: {}", name, path.display(), e),
        }
    }
    info!("Loaded {} custom gradient(s) from {}", loaded, path.display());
    Ok(loaded)
}
