//! Filesystem helpers shared across slotpack tools.

use std::path::Path;

use anyhow::{Context, Result};

/// Maximum allowed size for a single loose audio file read into memory.
pub const MAX_SOURCE_BYTES: u64 = 256 * 1024 * 1024; // 256 MiB

/// Read a file into memory with a size cap.
pub fn read_file_with_limit(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;
    let len = metadata.len();
    if len > max_bytes {
        anyhow::bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            len,
            max_bytes
        );
    }
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}
