use std::collections::BTreeMap;

use bevy::color::Srgba;
use bevy::prelude::*;

use super::builtins::{builtin_ramps, DEFAULT_RAMP};
use super::error::RampError;
use super::ramp::ColorRamp;

/// All color ramps known to the session, keyed by unique name.
///
/// Built-in ramps are registered on construction and can't be removed, so
/// [`RampRegistry::resolve`] always has something to fall back to.
#[derive(Resource, Debug, Clone)]
pub struct RampRegistry {
    ramps: BTreeMap<String, ColorRamp>,
    fallback: ColorRamp,
}

impl Default for RampRegistry {
    fn default() -> Self {
        let builtins = builtin_ramps();
        let fallback = builtins
            .iter()
            .find(|ramp| ramp.name() == DEFAULT_RAMP)
            .cloned()
            .or_else(|| builtins.first().cloned())
            .unwrap_or_else(|| ColorRamp::two_stop(DEFAULT_RAMP, Srgba::BLACK, Srgba::WHITE));
        Self {
            ramps: builtins
                .into_iter()
                .map(|ramp| (ramp.name().to_string(), ramp))
                .collect(),
            fallback,
        }
    }
}

impl RampRegistry {
    /// Adds `ramp`. Blank or duplicate names are rejected and leave the
    /// registry unchanged.
    pub fn register(&mut self, ramp: ColorRamp) -> Result<&ColorRamp, RampError> {
        let name = ramp.name().to_string();
        if name.trim().is_empty() {
            return Err(RampError::BlankName);
        }
        if self.ramps.contains_key(&name) {
            return Err(RampError::DuplicateName(name));
        }
        debug!("Registered gradient '{}'", name);
        Ok(self.ramps.entry(name).or_insert(ramp))
    }

    pub fn create_evenly_spaced(
        &mut self,
        name: impl Into<String>,
        editable: bool,
        colors: &[Srgba],
    ) -> Result<&ColorRamp, RampError> {
        self.register(ColorRamp::evenly_spaced(name, editable, colors)?)
    }

    pub fn create_from_points(
        &mut self,
        name: impl Into<String>,
        editable: bool,
        points: BTreeMap<u8, Srgba>,
    ) -> Result<&ColorRamp, RampError> {
        self.register(ColorRamp::from_control_points(name, editable, points)?)
    }

    pub fn create_from_channels(
        &mut self,
        name: impl Into<String>,
        editable: bool,
        tuples: BTreeMap<u8, Vec<f32>>,
    ) -> Result<&ColorRamp, RampError> {
        self.register(ColorRamp::from_channel_tuples(name, editable, tuples)?)
    }

    /// Inserts or replaces an editable ramp, as the gradient editor's save
    /// button does. Built-in ramps can't be overwritten.
    pub fn save_editable(&mut self, ramp: ColorRamp) -> Result<(), RampError> {
        if !ramp.is_editable() {
            return Err(RampError::BuiltIn(ramp.name().to_string()));
        }
        if let Some(existing) = self.ramps.get(ramp.name()) {
            if !existing.is_editable() {
                return Err(RampError::BuiltIn(ramp.name().to_string()));
            }
        }
        info!("Saved gradient '{}'", ramp.name());
        self.ramps.insert(ramp.name().to_string(), ramp);
        Ok(())
    }

    /// Removes an editable ramp. Returns `false` for built-in or unknown
    /// names.
    pub fn delete(&mut self, name: &str) -> bool {
        match self.ramps.get(name) {
            Some(ramp) if ramp.is_editable() => {
                self.ramps.remove(name);
                info!("Deleted gradient '{}'", name);
                true
            }
            Some(_) => {
                warn!("Gradient '{}' is built in and can't be deleted", name);
                false
            }
            None => {
                debug!("No gradient named '{}' to delete", name);
                false
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ColorRamp> {
        self.ramps.get(name)
    }

    /// The ramp called `name`, or the default ramp when there is none.
    pub fn resolve(&self, name: &str) -> &ColorRamp {
        match self.ramps.get(name) {
            Some(ramp) => ramp,
            None => {
                debug!(
                    "Unknown gradient '{}', using '{}'",
                    name,
                    self.fallback.name()
                );
                &self.fallback
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ramps.keys().map(String::as_str)
    }

    /// User-defined ramps, the only ones written to disk.
    pub fn editable(&self) -> impl Iterator<Item = &ColorRamp> {
        self.ramps.values().filter(|ramp| ramp.is_editable())
    }

    /// Drops every editable ramp, keeping the built-ins.
    pub fn clear_editable(&mut self) {
        self.ramps.retain(|_, ramp| !ramp.is_editable());
    }

    pub fn len(&self) -> usize {
        self.ramps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ramps.is_empty()
    }
}
