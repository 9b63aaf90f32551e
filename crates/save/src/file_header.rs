// ---------------------------------------------------------------------------
// file_header – .heatmapdata header with magic bytes, version, and checksum
// ---------------------------------------------------------------------------
//
// Header format (28 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "HMAP"
//   [4..8]   Format version (u32)
//   [8..12]  Flags (u32: bit 0 = lz4 compressed)
//   [12..20] Timestamp (Unix epoch, u64)
//   [20..24] Uncompressed payload size (u32)
//   [24..28] xxHash32 checksum of the payload (everything after the header)
//
// On save: encode -> compress -> prepend header (checksum of stored bytes)
// On load: check magic -> check version -> validate checksum -> strip header

use xxhash_rust::xxh32::xxh32;

use crate::persist_error::PersistError;

/// Magic bytes identifying a heatmap data file.
pub const MAGIC: [u8; 4] = *b"HMAP";

pub const HEADER_SIZE: usize = 28;

/// Version of the header layout and payload encoding.
pub const HEADER_FORMAT_VERSION: u32 = 1;

/// Payload is lz4 compressed with a prepended size.
pub const FLAG_COMPRESSED: u32 = 1;

const XXHASH_SEED: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub flags: u32,
    pub timestamp: u64,
    pub uncompressed_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    pub fn new(payload: &[u8], flags: u32, uncompressed_size: usize) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            format_version: HEADER_FORMAT_VERSION,
            flags,
            timestamp,
            uncompressed_size: u32::try_from(uncompressed_size).unwrap_or(u32::MAX),
            checksum: xxh32(payload, XXHASH_SEED),
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }
}

/// Returns `[header (28 bytes)] ++ [payload]`.
pub fn wrap_with_header(payload: &[u8], flags: u32, uncompressed_size: usize) -> Vec<u8> {
    let header = FileHeader::new(payload, flags, uncompressed_size);
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());

    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&header.format_version.to_le_bytes());
    out.extend_from_slice(&header.flags.to_le_bytes());
    out.extend_from_slice(&header.timestamp.to_le_bytes());
    out.extend_from_slice(&header.uncompressed_size.to_le_bytes());
    out.extend_from_slice(&header.checksum.to_le_bytes());

    out.extend_from_slice(payload);
    out
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Validates the header and returns it with the payload that follows.
///
/// Fails when the magic bytes are missing, the file is shorter than a header,
/// it was written by a newer build, or the checksum does not match.
pub fn unwrap_header(bytes: &[u8]) -> Result<(FileHeader, &[u8]), PersistError> {
    if bytes.len() < 4 || bytes[..4] != MAGIC {
        return Err(PersistError::Corrupt(
            "missing HMAP magic bytes, not a heatmap data file".to_string(),
        ));
    }
    if bytes.len() < HEADER_SIZE {
        return Err(PersistError::Corrupt(format!(
            "file is too short ({} bytes, need at least {} for header)",
            bytes.len(),
            HEADER_SIZE
        )));
    }

    let format_version = le_u32(bytes, 4);
    if format_version > HEADER_FORMAT_VERSION {
        return Err(PersistError::VersionMismatch {
            expected_max: HEADER_FORMAT_VERSION,
            found: format_version,
        });
    }

    let mut timestamp = [0u8; 8];
    timestamp.copy_from_slice(&bytes[12..20]);
    let header = FileHeader {
        format_version,
        flags: le_u32(bytes, 8),
        timestamp: u64::from_le_bytes(timestamp),
        uncompressed_size: le_u32(bytes, 20),
        checksum: le_u32(bytes, 24),
    };

    let payload = &bytes[HEADER_SIZE..];
    let computed = xxh32(payload, XXHASH_SEED);
    if computed != header.checksum {
        return Err(PersistError::Corrupt(format!(
            "checksum mismatch (expected {:#010X}, got {:#010X})",
            header.checksum, computed,
        )));
    }

    Ok((header, payload))
}
