// ---------------------------------------------------------------------------
// PersistError: failures reading or writing heatmap files
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors from loading or saving settings, gradients and tracker snapshots.
///
/// Loaders log these and keep their defaults; nothing here aborts startup.
#[derive(Debug)]
pub enum PersistError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// Malformed JSON in a settings or gradient file.
    Json(serde_json::Error),
    /// A gradient entry parsed as JSON but does not describe a valid ramp.
    Gradient { name: String, reason: String },
    /// Header or checksum problem in a `.heatmapdata` file.
    Corrupt(String),
    /// `.heatmapdata` written by a newer build.
    VersionMismatch { expected_max: u32, found: u32 },
    /// Decompression or bitcode decoding failed.
    Decode(String),
    /// Source of a rename or delete is missing.
    NotFound(String),
    /// Rename target already exists.
    AlreadyExists(String),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Io(e) => write!(f, "I/O error: {e}"),
            PersistError::Json(e) => write!(f, "JSON error: {e}"),
            PersistError::Gradient { name, reason } => {
                write!(f, "Invalid gradient '{name}': {reason}")
            }
            PersistError::Corrupt(msg) => write!(f, "Corrupt heatmap data: {msg}"),
            PersistError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: heatmap data is v{found}, \
                 but this build only supports up to v{expected_max}"
            ),
            PersistError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            PersistError::NotFound(what) => write!(f, "{what} does not exist"),
            PersistError::AlreadyExists(what) => write!(f, "{what} already exists"),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Io(e) => Some(e),
            PersistError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        PersistError::Io(e)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(e: serde_json::Error) -> Self {
        PersistError::Json(e)
    }
}

impl From<bitcode::Error> for PersistError {
    fn from(e: bitcode::Error) -> Self {
        PersistError::Decode(e.to_string())
    }
}

impl From<lz4_flex::block::DecompressError> for PersistError {
    fn from(e: lz4_flex::block::DecompressError) -> Self {
        PersistError::Decode(e.to_string())
    }
}

impl PersistError {
    pub(crate) fn gradient(name: &str, reason: impl fmt::Display) -> Self {
        PersistError::Gradient {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rendering::color_ramps::RampError;

    #[test]
    fn test_display_io() {
        let err = PersistError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let msg = format!("{err}");
        assert!(msg.contains("I/O error"), "got: {msg}");
        assert!(msg.contains("file not found"), "got: {msg}");
    }

    #[test]
    fn test_display_version_mismatch() {
        let err = PersistError::VersionMismatch {
            expected_max: 1,
            found: 7,
        };
        let msg = format!("{err}");
        assert!(msg.contains("v7"), "got: {msg}");
        assert!(msg.contains("v1"), "got: {msg}");
    }

    #[test]
    fn test_from_json_keeps_source() {
        let json_err = serde_json::from_str::<u32>("nope").expect_err("invalid json");
        let err: PersistError = json_err.into();
        assert!(matches!(err, PersistError::Json(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_gradient_error_names_gradient() {
        let err = PersistError::gradient("sunset", RampError::MissingEndpoint(100));
        let msg = format!("{err}");
        assert!(msg.contains("sunset"), "got: {msg}");
        assert!(msg.contains("100%"), "got: {msg}");
    }
}
