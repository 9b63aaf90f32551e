//! Named color ramps for the heatmap overlay.
//!
//! A [`ColorRamp`] maps a busyness fraction in `[0, 1]` to a color by linear
//! interpolation between percentage-keyed control points. The
//! [`RampRegistry`] resource owns every ramp of the session: the read-only
//! built-ins (green-red, blue-red and five matplotlib colormaps) plus any
//! user-defined, editable ramps loaded from or saved to disk.

mod builtins;
mod error;
mod ramp;
mod registry;
#[cfg(test)]
mod tests;

pub use builtins::{builtin_ramps, BLUE, DEFAULT_RAMP, GREEN, RED};
pub use error::RampError;
pub use ramp::{to_hex, ColorRamp, MAX_EDITABLE_KEYS};
pub use registry::RampRegistry;
