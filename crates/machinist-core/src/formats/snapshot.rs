//! # Snapshot Format
//!
//! Binary serialization for catalog snapshots.
//!
//! Format: Header (5 bytes) + postcard-serialized `CatalogSnapshot`.
//! - 4 bytes: Magic ("MCAT")
//! - 1 byte: Version
//!
//! The snapshot is canonicalized before encoding, so the same rows always
//! produce the same bytes. File I/O lives in the app layer.

use crate::catalog::CatalogSnapshot;
use crate::primitives;
use crate::types::MachinistError;

/// Maximum allowed payload size for the snapshot format.
///
/// Validated BEFORE attempting deserialization.
pub const MAX_SNAPSHOT_PAYLOAD_SIZE: usize = 64 * 1024 * 1024; // 64 MB

const HEADER_SIZE: usize = 5;

/// The header that precedes snapshot data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl SnapshotHeader {
    /// Create a header with the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), MachinistError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(MachinistError::SerializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(MachinistError::SerializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MachinistError> {
        let Some(head) = bytes.get(..HEADER_SIZE) else {
            return Err(MachinistError::SerializationError(
                "Header too short".to_string(),
            ));
        };
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&head[0..4]);
        Ok(Self {
            magic,
            version: head[4],
        })
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Quick check used to tell binary snapshots apart from JSON/TOML seed files.
#[must_use]
pub fn is_snapshot(bytes: &[u8]) -> bool {
    bytes.starts_with(primitives::MAGIC_BYTES)
}

/// Serialize a snapshot to bytes (header + payload).
pub fn snapshot_to_bytes(snapshot: &CatalogSnapshot) -> Result<Vec<u8>, MachinistError> {
    let canonical = snapshot.clone().canonical();
    let payload = postcard::to_stdvec(&canonical)
        .map_err(|e| MachinistError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_SIZE + payload.len());
    result.extend_from_slice(&SnapshotHeader::new().to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Deserialize a snapshot from bytes.
///
/// Size and header are validated before the payload is decoded.
pub fn snapshot_from_bytes(bytes: &[u8]) -> Result<CatalogSnapshot, MachinistError> {
    if bytes.len() > MAX_SNAPSHOT_PAYLOAD_SIZE {
        return Err(MachinistError::SerializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_PAYLOAD_SIZE
        )));
    }

    let header = SnapshotHeader::from_bytes(bytes)?;
    header.validate()?;

    let snapshot: CatalogSnapshot = postcard::from_bytes(&bytes[HEADER_SIZE..]).map_err(|e| {
        MachinistError::SerializationError(format!("Failed to decode snapshot: {}", e))
    })?;
    Ok(snapshot.canonical())
}

/// BLAKE3 hex digest of a snapshot's canonical bytes.
///
/// Two catalogs with the same rows have the same fingerprint, whatever
/// backend or insertion order produced them.
#[cfg(feature = "crypto-hash")]
pub fn snapshot_fingerprint(snapshot: &CatalogSnapshot) -> Result<String, MachinistError> {
    let bytes = snapshot_to_bytes(snapshot)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

// =============================================================================
// TESTS
// =============================================================================
