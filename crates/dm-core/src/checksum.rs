//! SHA-256 checksums for migration content drift detection.

use crate::error::{CoreError, CoreResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

/// Compute the lowercase hex SHA-256 of a byte slice
pub fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Stream a file through SHA-256 and return the lowercase hex digest.
///
/// Produces the same value as [`compute_checksum`] over the file's bytes.
pub fn checksum_file(path: &Path) -> CoreResult<String> {
    let mut file = File::open(path).map_err(|e| CoreError::io(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| CoreError::io(path, e))?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
#[path = "checksum_test.rs"]
mod tests;
