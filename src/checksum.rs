//! Content digests for change detection
//!
//! Rescans are gated on content checksums, never on mtimes: a document is
//! only re-parsed when its bytes actually differ from the last recorded
//! digest.

use crate::error::Result;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read buffer size for streaming digests
const CHUNK_SIZE: usize = 8192;

/// Compute the SHA-256 hex digest of a file's bytes.
///
/// Streams the file in fixed-size chunks so arbitrarily large documents
/// never have to fit in memory. An unopenable path propagates as an IO
/// error to the caller, which decides whether that kills the whole scan.
pub fn file_checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compute the SHA-256 hex digest of an in-memory byte slice.
pub fn bytes_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
