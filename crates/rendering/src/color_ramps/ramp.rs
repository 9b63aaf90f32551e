//! A single named gradient keyed by percentage.

use std::collections::BTreeMap;

use bevy::color::Srgba;

use super::error::RampError;

/// Control points an editable ramp may carry.
pub const MAX_EDITABLE_KEYS: usize = 8;

/// Distinct integer keys available between 0% and 100%.
const MAX_KEYS: usize = 101;

/// A percent this close to an integer key samples that key's stored color.
const KEY_SNAP: f32 = 1e-4;

/// A piecewise-linear color gradient over `[0, 100]` percent.
///
/// Always holds a 0% and a 100% control point, so every fraction maps to a
/// color.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    name: String,
    editable: bool,
    control_points: BTreeMap<u8, Srgba>,
}

impl ColorRamp {
    /// Spreads `colors` evenly, the i-th at `round(i * 100 / (n - 1))` percent.
    pub fn evenly_spaced(
        name: impl Into<String>,
        editable: bool,
        colors: &[Srgba],
    ) -> Result<Self, RampError> {
        if colors.len() < 2 {
            return Err(RampError::TooFewColors(colors.len()));
        }
        if colors.len() > MAX_KEYS {
            return Err(RampError::TooManyKeys {
                count: colors.len(),
                max: MAX_KEYS,
            });
        }
        let last = (colors.len() - 1) as f32;
        let control_points = colors
            .iter()
            .enumerate()
            .map(|(i, &color)| (((i as f32) * 100.0 / last).round() as u8, color))
            .collect();
        Self::from_control_points(name, editable, control_points)
    }

    /// Read-only ramp from `from` at 0% to `to` at 100%.
    pub(crate) fn two_stop(name: &str, from: Srgba, to: Srgba) -> Self {
        Self {
            name: name.to_string(),
            editable: false,
            control_points: BTreeMap::from([(0, from), (100, to)]),
        }
    }

    pub fn from_control_points(
        name: impl Into<String>,
        editable: bool,
        control_points: BTreeMap<u8, Srgba>,
    ) -> Result<Self, RampError> {
        let ramp = Self {
            name: name.into(),
            editable,
            control_points,
        };
        ramp.validate()?;
        Ok(ramp)
    }

    /// Builds a ramp from raw channel tuples: 3 values are opaque RGB, 4 are
    /// RGBA.
    pub fn from_channel_tuples(
        name: impl Into<String>,
        editable: bool,
        tuples: BTreeMap<u8, Vec<f32>>,
    ) -> Result<Self, RampError> {
        let control_points = tuples
            .into_iter()
            .map(|(key, channels)| match channels[..] {
                [r, g, b] => Ok((key, Srgba::rgb(r, g, b))),
                [r, g, b, a] => Ok((key, Srgba::new(r, g, b, a))),
                _ => Err(RampError::BadChannelCount {
                    key,
                    len: channels.len(),
                }),
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Self::from_control_points(name, editable, control_points)
    }

    fn validate(&self) -> Result<(), RampError> {
        if self.name.trim().is_empty() {
            return Err(RampError::BlankName);
        }
        if self.control_points.len() < 2 {
            return Err(RampError::TooFewColors(self.control_points.len()));
        }
        if let Some(&key) = self.control_points.keys().find(|&&k| k > 100) {
            return Err(RampError::KeyOutOfRange(key));
        }
        for endpoint in [0, 100] {
            if !self.control_points.contains_key(&endpoint) {
                return Err(RampError::MissingEndpoint(endpoint));
            }
        }
        if self.editable && self.control_points.len() > MAX_EDITABLE_KEYS {
            return Err(RampError::TooManyKeys {
                count: self.control_points.len(),
                max: MAX_EDITABLE_KEYS,
            });
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn control_points(&self) -> &BTreeMap<u8, Srgba> {
        &self.control_points
    }

    /// Color at `fraction` of the ramp, clamped to `[0, 1]`.
    ///
    /// Exactly on a control point the stored color is returned unchanged;
    /// between two points each channel (alpha included) is interpolated
    /// linearly.
    pub fn color_at(&self, fraction: f32) -> Srgba {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let percent = fraction * 100.0;

        let nearest = percent.round();
        if (percent - nearest).abs() < KEY_SNAP {
            if let Some(&color) = self.control_points.get(&(nearest as u8)) {
                return color;
            }
        }

        let lower = self
            .control_points
            .range(..=percent.floor() as u8)
            .next_back();
        let upper = self.control_points.range(percent.ceil() as u8..).next();

        match (lower, upper) {
            (Some((&lo, &lo_color)), Some((&hi, &hi_color))) => {
                if lo == hi {
                    return lo_color;
                }
                let t = (percent - f32::from(lo)) / f32::from(hi - lo);
                lerp(lo_color, hi_color, t)
            }
            (Some((_, &color)), None) | (None, Some((_, &color))) => color,
            (None, None) => Srgba::NONE,
        }
    }

    /// `width` colors sampled evenly from 0% to 100%, for preview textures.
    pub fn preview_strip(&self, width: usize) -> Vec<Srgba> {
        match width {
            0 => Vec::new(),
            1 => vec![self.color_at(0.0)],
            _ => {
                let last = (width - 1) as f32;
                (0..width)
                    .map(|i| self.color_at(i as f32 / last))
                    .collect()
            }
        }
    }
}

fn lerp(a: Srgba, b: Srgba, t: f32) -> Srgba {
    Srgba::new(
        a.red + (b.red - a.red) * t,
        a.green + (b.green - a.green) * t,
        a.blue + (b.blue - a.blue) * t,
        a.alpha + (b.alpha - a.alpha) * t,
    )
}

/// `#RRGGBB`, or `#RRGGBBAA` when the color is translucent.
pub fn to_hex(color: Srgba) -> String {
    let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    let (r, g, b, a) = (
        byte(color.red),
        byte(color.green),
        byte(color.blue),
        byte(color.alpha),
    );
    if a == u8::MAX {
        format!("#{r:02X}{g:02X}{b:02X}")
    } else {
        format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
    }
}
