use std::fmt;

/// Why a color ramp could not be built or registered.
#[derive(Debug, Clone, PartialEq)]
pub enum RampError {
    /// The name is empty or whitespace.
    BlankName,
    /// A ramp with this name is already registered.
    DuplicateName(String),
    /// Fewer than two colors or control points.
    TooFewColors(usize),
    /// The 0% or 100% control point is missing.
    MissingEndpoint(u8),
    /// A control point lies above 100%.
    KeyOutOfRange(u8),
    /// A channel tuple was not RGB or RGBA.
    BadChannelCount { key: u8, len: usize },
    /// More control points than the ramp kind allows.
    TooManyKeys { count: usize, max: usize },
    /// Built-in ramps can't be replaced or deleted.
    BuiltIn(String),
}

impl fmt::Display for RampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RampError::BlankName => write!(f, "gradient name must not be blank"),
            RampError::DuplicateName(name) => {
                write!(f, "a gradient named '{name}' already exists")
            }
            RampError::TooFewColors(n) => {
                write!(f, "a gradient needs at least two colors, got {n}")
            }
            RampError::MissingEndpoint(key) => write!(f, "the {key}% key is missing"),
            RampError::KeyOutOfRange(key) => {
                write!(f, "key {key}% is outside the 0-100% range")
            }
            RampError::BadChannelCount { key, len } => write!(
                f,
                "color at {key}% has {len} channels, expected 3 (RGB) or 4 (RGBA)"
            ),
            RampError::TooManyKeys { count, max } => {
                write!(f, "{count} color keys exceed the limit of {max}")
            }
            RampError::BuiltIn(name) => write!(f, "built-in gradient '{name}' can't be modified"),
        }
    }
}

impl std::error::Error for RampError {}
