//! Crash-safe file replacement.
//!
//! Data goes to `{path}.tmp` first, is flushed with `sync_all()`, then renamed
//! over the destination, so an interrupted write never leaves a half-written
//! settings, gradient or heatmap file behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Atomically replaces the file at `path` with `data`, creating parent
/// directories as needed.
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&tmp, path)
}
