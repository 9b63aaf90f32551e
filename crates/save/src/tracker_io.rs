// ---------------------------------------------------------------------------
// tracker_io: per-save occupancy snapshots (<save>.heatmapdata)
// ---------------------------------------------------------------------------
//
// Save pipeline:
//   SectionRegistry::save_all -> bitcode -> lz4 -> header -> atomic write
// Load pipeline:
//   read -> header check -> lz4 -> bitcode -> SectionRegistry::load_all
//
// Snapshot files follow the host's save games: one per save name, renamed
// and deleted alongside it.

use std::path::{Path, PathBuf};

use bevy::prelude::*;

use tracking::{SectionRegistry, Sections};

use crate::atomic_write::atomic_write;
use crate::file_header::{unwrap_header, wrap_with_header, FLAG_COMPRESSED};
use crate::persist_error::PersistError;

pub const TRACKER_EXTENSION: &str = "heatmapdata";

#[derive(bitcode::Encode, bitcode::Decode, Default, Debug, PartialEq)]
struct TrackerFile {
    sections: Sections,
}

/// `<saves_dir>/<save_name>.heatmapdata`.
///
/// Names that would escape `saves_dir` are rejected.
pub fn tracker_path(saves_dir: &Path, save_name: &str) -> Result<PathBuf, PersistError> {
    let trimmed = save_name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
    {
        return Err(PersistError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("'{save_name}' is not a valid save name"),
        )));
    }
    Ok(saves_dir.join(format!("{trimmed}.{TRACKER_EXTENSION}")))
}

/// Header-wrapped, compressed bytes of `sections`.
pub fn encode_snapshot(sections: Sections) -> Vec<u8> {
    let encoded = bitcode::encode(&TrackerFile { sections });
    let compressed = lz4_flex::compress_prepend_size(&encoded);
    wrap_with_header(&compressed, FLAG_COMPRESSED, encoded.len())
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<Sections, PersistError> {
    let (header, payload) = unwrap_header(bytes)?;
    debug!(
        "Heatmap data header: format v{}, flags {:#X}, timestamp {}, \
         data size {}, checksum {:#010X}",
        header.format_version,
        header.flags,
        header.timestamp,
        header.uncompressed_size,
        header.checksum,
    );

    let file: TrackerFile = if header.is_compressed() {
        let decompressed = lz4_flex::decompress_size_prepended(payload)?;
        bitcode::decode(&decompressed)?
    } else {
        bitcode::decode(payload)?
    };
    Ok(file.sections)
}

/// Writes every registered snapshot section under `save_name`.
pub fn save_tracker(
    world: &World,
    saves_dir: &Path,
    save_name: &str,
) -> Result<PathBuf, PersistError> {
    let path = tracker_path(saves_dir, save_name)?;
    let sections = world
        .get_resource::<SectionRegistry>()
        .map(|registry| registry.save_all(world))
        .unwrap_or_default();

    let bytes = encode_snapshot(sections);
    atomic_write(&path, &bytes)?;
    info!("Saved {} bytes of heatmap data to {}", bytes.len(), path.display());
    Ok(path)
}

/// Restores the snapshot for `save_name`.
///
/// A save without heatmap data resets every registered resource and returns
/// `Ok(false)`. A broken file is reported as an error and leaves the world
/// untouched.
pub fn load_tracker(
    world: &mut World,
    saves_dir: &Path,
    save_name: &str,
) -> Result<bool, PersistError> {
    let path = tracker_path(saves_dir, save_name)?;
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    let Some(bytes) = bytes else {
        info!("No heatmap data for save '{}', starting fresh", save_name);
        with_registry(world, |world, registry| registry.reset_all(world));
        return Ok(false);
    };

    let sections = decode_snapshot(&bytes)?;
    let mut restored = 0;
    with_registry(world, |world, registry| {
        restored = registry.load_all(world, &sections);
    });
    info!(
        "Loaded {} heatmap section(s) from {}",
        restored,
        path.display()
    );
    Ok(true)
}

fn with_registry(world: &mut World, f: impl FnOnce(&mut World, &SectionRegistry)) {
    if !world.contains_resource::<SectionRegistry>() {
        warn!("No SectionRegistry, heatmap data has nothing to restore into");
        return;
    }
    world.resource_scope(|world, registry: Mut<SectionRegistry>| f(world, &*registry));
}

/// Renames the snapshot of `from` to `to`. Fails if `from` has no snapshot or
/// `to` already has one.
pub fn rename_tracker(saves_dir: &Path, from: &str, to: &str) -> Result<(), PersistError> {
    let source = tracker_path(saves_dir, from)?;
    let target = tracker_path(saves_dir, to)?;
    if !source.exists() {
        return Err(PersistError::NotFound(source.display().to_string()));
    }
    if target.exists() {
        return Err(PersistError::AlreadyExists(target.display().to_string()));
    }
    std::fs::rename(&source, &target)?;
    info!("Renamed heatmap data '{}' -> '{}'", from, to);
    Ok(())
}

pub fn delete_tracker(saves_dir: &Path, save_name: &str) -> Result<(), PersistError> {
    let path = tracker_path(saves_dir, save_name)?;
    match std::fs::remove_file(&path) {
        Ok(()) => {
            info!("Deleted heatmap data {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PersistError::NotFound(path.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}
