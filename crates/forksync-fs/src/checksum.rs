//! SHA-256 checksum utilities
//!
//! Provides a single canonical checksum format (`sha256:<hex>`) used to
//! decide whether two checkouts hold byte-identical copies of a file.

use sha2::{Digest, Sha256};
use std::path::Path;

use crate::{Error, Result};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of in-memory bytes.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_bytes_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the SHA-256 checksum of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_file_checksum(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(compute_bytes_checksum(&content))
}

/// Whether two files hold identical bytes.
///
/// # Errors
///
/// Returns [`Error::Io`] naming whichever file could not be read.
pub fn files_identical(left: &Path, right: &Path) -> Result<bool> {
    let len = |path: &Path| {
        std::fs::metadata(path)
            .map(|meta| meta.len())
            .map_err(|e| Error::io(path, e))
    };
    if len(left)? != len(right)? {
        return Ok(false);
    }
    let checksum = |path: &Path| compute_file_checksum(path).map_err(|e| Error::io(path, e));
    Ok(checksum(left)? == checksum(right)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_checksum_has_prefix() {
        let checksum = compute_bytes_checksum(b"hello world");
        assert!(checksum.starts_with("sha256:"));
    }

    #[test]
    fn bytes_checksum_known_value() {
        let checksum = compute_bytes_checksum(b"hello world");
        assert_eq!(
            checksum,
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn file_checksum_matches_bytes_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, "hello world").unwrap();

        let file_cs = compute_file_checksum(&path).unwrap();
        assert_eq!(file_cs, compute_bytes_checksum(b"hello world"));
    }

    #[test]
    fn files_identical_detects_difference() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        let c = dir.path().join("c.txt");
        std::fs::write(&a, "same").unwrap();
        std::fs::write(&b, "same").unwrap();
        std::fs::write(&c, "diff").unwrap();

        assert!(files_identical(&a, &b).unwrap());
        assert!(!files_identical(&a, &c).unwrap());
    }

    #[test]
    fn files_identical_names_the_unreadable_side() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.txt");
        let missing = dir.path().join("missing.txt");
        std::fs::write(&present, "same").unwrap();

        match files_identical(&missing, &present).unwrap_err() {
            Error::Io { path, .. } => assert_eq!(path, missing),
            other => panic!("expected Io error, got {other:?}"),
        }
        match files_identical(&present, &missing).unwrap_err() {
            Error::Io { path, .. } => assert_eq!(path, missing),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
