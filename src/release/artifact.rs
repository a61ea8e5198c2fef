//! Built artifacts: discovery by glob and SHA-256 checksums

use crate::core::error::{ShipError, ShipResult, ResultExt};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// A built distributable ready for upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
  /// Path relative to the publish working directory
  pub path: PathBuf,
  pub size: u64,
  /// Lowercase hex SHA-256 of the file contents
  pub sha256: String,
}

/// Collect regular files matching `pattern` under `root`, sorted by path
pub fn collect_artifacts(root: &Path, pattern: &str) -> ShipResult<Vec<Artifact>> {
  // The root is literal; only the configured pattern may contain wildcards
  let full_pattern = format!("{}/{}", glob::Pattern::escape(&root.to_string_lossy()), pattern);

  let mut artifacts = Vec::new();
  for entry in glob::glob(&full_pattern)? {
    let path = entry.map_err(|e| ShipError::message(format!("Failed to read artifact path: {}", e)))?;
    if !path.is_file() {
      continue;
    }

    let size = path
      .metadata()
      .with_context(|| format!("Failed to stat artifact {}", path.display()))?
      .len();
    let sha256 = compute_sha256(&path)?;
    let relative = path.strip_prefix(root).map(Path::to_path_buf).unwrap_or(path);

    tracing::info!(artifact = %relative.display(), size, %sha256, "collected artifact");
    artifacts.push(Artifact {
      path: relative,
      size,
      sha256,
    });
  }

  artifacts.sort_by(|a, b| a.path.cmp(&b.path));
  Ok(artifacts)
}

/// Compute the SHA-256 checksum of a file
pub fn compute_sha256(path: &Path) -> ShipResult<String> {
  let file = File::open(path).with_context(|| format!("Failed to open {} for checksum", path.display()))?;
  let mut reader = BufReader::new(file);
  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = reader
      .read(&mut buffer)
      .with_context(|| format!("Failed to read {} for checksum", path.display()))?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(format!("{:x}", hasher.finalize()))
}
