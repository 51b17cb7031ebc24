//! Output writer for entity collections.

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use lasfera_shared::{Result, SferaError};

/// Hex SHA-256 of a serialized collection.
pub fn checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Replace `path` with `content`: write a sibling temp file, then rename.
///
/// Returns the checksum of the written bytes.
pub fn write_output(path: &Path, content: &str) -> Result<String> {
    let dir = path
        .parent()
        .ok_or_else(|| SferaError::file_system(path, "output path has no parent directory"))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SferaError::file_system(path, "output path has no file name"))?;

    let temp = dir.join(format!(".{file_name}.tmp"));
    std::fs::write(&temp, content).map_err(|e| SferaError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| SferaError::io(path, e))?;

    debug!(path = %path.display(), size = content.len(), "wrote collection");
    Ok(checksum(content))
}
