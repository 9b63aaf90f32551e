//! Resources persisted in a save's heatmap data file.
//!
//! Each resource owns one named section carrying its own layout version, so
//! a section written by a newer build is dropped on its own instead of
//! failing the whole file. The save crate only walks [`SectionRegistry`]; it
//! never names the resources it persists.

use std::collections::BTreeMap;
use std::fmt;

use bevy::prelude::*;
use bitcode::{Decode, Encode};

pub trait SnapshotSection: Resource + Default {
    /// Section name in the file. Must stay stable across versions.
    const SECTION: &'static str;

    /// Bumped whenever the encoded layout changes.
    const VERSION: u32;

    /// `None` skips the section, e.g. when nothing was recorded.
    fn encode_section(&self) -> Option<Vec<u8>>;

    fn decode_section(bytes: &[u8]) -> Result<Self, bitcode::Error>;
}

/// Encoded section plus the layout version it was written with.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct SectionBlob {
    pub version: u32,
    pub bytes: Vec<u8>,
}

pub type Sections = BTreeMap<String, SectionBlob>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    Duplicate(&'static str),
}

impl fmt::Display for SectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionError::Duplicate(name) => {
                write!(f, "snapshot section '{name}' is already registered")
            }
        }
    }
}

impl std::error::Error for SectionError {}

struct SectionEntry {
    name: &'static str,
    version: u32,
    save: fn(&World) -> Option<Vec<u8>>,
    load: fn(&mut World, &[u8]) -> Result<(), bitcode::Error>,
    reset: fn(&mut World),
}

fn save_section<T: SnapshotSection>(world: &World) -> Option<Vec<u8>> {
    world.get_resource::<T>().and_then(T::encode_section)
}

fn load_section<T: SnapshotSection>(
    world: &mut World,
    bytes: &[u8],
) -> Result<(), bitcode::Error> {
    let restored = T::decode_section(bytes)?;
    world.insert_resource(restored);
    Ok(())
}

fn reset_section<T: SnapshotSection>(world: &mut World) {
    world.insert_resource(T::default());
}

#[derive(Resource, Default)]
pub struct SectionRegistry {
    entries: Vec<SectionEntry>,
}

impl SectionRegistry {
    pub fn register<T: SnapshotSection>(&mut self) -> Result<(), SectionError> {
        if self.entries.iter().any(|e| e.name == T::SECTION) {
            return Err(SectionError::Duplicate(T::SECTION));
        }
        self.entries.push(SectionEntry {
            name: T::SECTION,
            version: T::VERSION,
            save: save_section::<T>,
            load: load_section::<T>,
            reset: reset_section::<T>,
        });
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    pub fn save_all(&self, world: &World) -> Sections {
        self.entries
            .iter()
            .filter_map(|entry| {
                let bytes = (entry.save)(world)?;
                Some((
                    entry.name.to_string(),
                    SectionBlob {
                        version: entry.version,
                        bytes,
                    },
                ))
            })
            .collect()
    }

    /// Restores every registered resource from `sections` and returns how
    /// many were restored.
    ///
    /// A missing, newer or undecodable section resets its resource, so a save
    /// without heatmap data starts clean.
    pub fn load_all(&self, world: &mut World, sections: &Sections) -> usize {
        let mut restored = 0;
        for entry in &self.entries {
            let Some(blob) = sections.get(entry.name) else {
                (entry.reset)(world);
                continue;
            };
            if blob.version > entry.version {
                warn!(
                    "Section '{}' has layout v{}, this build reads up to v{}; starting it empty",
                    entry.name, blob.version, entry.version
                );
                (entry.reset)(world);
                continue;
            }
            match (entry.load)(world, &blob.bytes) {
                Ok(()) => restored += 1,
                Err(e) => {
                    warn!(
                        "Section '{}': failed to decode {} bytes, starting it empty: {}",
                        entry.name,
                        blob.bytes.len(),
                        e
                    );
                    (entry.reset)(world);
                }
            }
        }
        restored
    }

    pub fn reset_all(&self, world: &mut World) {
        for entry in &self.entries {
            (entry.reset)(world);
        }
    }
}
