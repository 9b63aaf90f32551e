// ---------------------------------------------------------------------------
// settings_io: settings.json <-> HeatmapSettings
// ---------------------------------------------------------------------------
//
// Every field is optional on read. A missing or null value, including one
// side of a mode's bounds, keeps the built-in default for that field only.

use std::collections::BTreeMap;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use tracking::{HeatmapSettings, OverlayMode};

use crate::atomic_write::atomic_write;
use crate::persist_error::PersistError;

pub const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct BoundsDto {
    #[serde(default)]
    minimum: Option<f32>,
    #[serde(default)]
    maximum: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsDto {
    #[serde(default)]
    gradient_name: Option<String>,
    #[serde(default)]
    measuring_period_minutes: Option<u32>,
    #[serde(default)]
    per_mode_bounds: Option<BTreeMap<String, Option<BoundsDto>>>,
    #[serde(default)]
    retention_minutes: Option<u32>,
    #[serde(default)]
    active_mode: Option<String>,
    #[serde(default)]
    busyness_scale: Option<f32>,
}

impl From<&HeatmapSettings> for SettingsDto {
    fn from(settings: &HeatmapSettings) -> Self {
        Self {
            gradient_name: Some(settings.gradient_name.clone()),
            measuring_period_minutes: Some(settings.measuring_period_minutes),
            per_mode_bounds: Some(
                settings
                    .mode_bounds
                    .iter()
                    .map(|(mode, bounds)| {
                        (
                            mode.name().to_string(),
                            Some(BoundsDto {
                                minimum: Some(bounds.minimum),
                                maximum: Some(bounds.maximum),
                            }),
                        )
                    })
                    .collect(),
            ),
            retention_minutes: Some(settings.retention_minutes),
            active_mode: Some(settings.active_mode.name().to_string()),
            busyness_scale: Some(settings.busyness_scale),
        }
    }
}

impl SettingsDto {
    fn into_settings(self) -> HeatmapSettings {
        let mut settings = HeatmapSettings::default();

        if let Some(name) = self.gradient_name.filter(|n| !n.trim().is_empty()) {
            settings.gradient_name = name;
        }
        if let Some(minutes) = self.measuring_period_minutes {
            settings.set_measuring_period(minutes);
        }
        if let Some(minutes) = self.retention_minutes {
            settings.set_retention(minutes);
        }

        for (name, bounds) in self.per_mode_bounds.unwrap_or_default() {
            let Some(mode) = OverlayMode::from_name(&name) else {
                warn!("Ignoring bounds for unknown heatmap mode '{}'", name);
                continue;
            };
            let Some(bounds) = bounds else { continue };
            if let Some(minimum) = bounds.minimum.filter(|v| v.is_finite()) {
                settings.mode_bounds.set_minimum(mode, minimum);
            }
            if let Some(maximum) = bounds.maximum.filter(|v| v.is_finite()) {
                settings.mode_bounds.set_maximum(mode, maximum);
            }
        }

        if let Some(name) = self.active_mode {
            match OverlayMode::from_name(&name) {
                Some(mode) => settings.active_mode = mode,
                None => warn!(
                    "Unknown heatmap mode '{}', keeping '{}'",
                    name,
                    settings.active_mode.name()
                ),
            }
        }
        if let Some(scale) = self.busyness_scale.filter(|s| s.is_finite() && *s >= 0.0) {
            settings.busyness_scale = scale;
        }

        settings
    }
}

pub fn encode_settings(settings: &HeatmapSettings) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(&SettingsDto::from(settings))?)
}

pub fn decode_settings(json: &str) -> Result<HeatmapSettings, PersistError> {
    let dto: SettingsDto = serde_json::from_str(json)?;
    Ok(dto.into_settings())
}

pub fn save_settings(path: &Path, settings: &HeatmapSettings) -> Result<(), PersistError> {
    atomic_write(path, encode_settings(settings)?.as_bytes())?;
    debug!("Saved heatmap settings to {}", path.display());
    Ok(())
}

/// Reads `path`, or returns the defaults when the file does not exist.
pub fn load_settings(path: &Path) -> Result<HeatmapSettings, PersistError> {
    match std::fs::read_to_string(path) {
        Ok(json) => decode_settings(&json),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No settings file at {}, using defaults", path.display());
            Ok(HeatmapSettings::default())
        }
        Err(e) => Err(e.into()),
    }
}
