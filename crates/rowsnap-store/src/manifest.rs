//! Snapshot ordering manifest
//!
//! Records result order and a SHA-256 digest per document so loads are
//! deterministic and detect tampering or partial writes.

use crate::errors::{io_error, serialization_error, Result};
use crate::fs::atomic_write;
use crate::layout::MANIFEST_FILE;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Current manifest schema version
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// One result document listed by the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub file: String,
    /// Hex SHA-256 of the document bytes
    pub digest: String,
}

/// Ordered list of a snapshot's result documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: u32,
    pub test_id: String,
    pub snapshot: String,
    pub results: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(test_id: impl Into<String>, snapshot: impl Into<String>) -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION,
            test_id: test_id.into(),
            snapshot: snapshot.into(),
            results: Vec::new(),
        }
    }

    /// Append an entry, computing its digest
    pub fn push(&mut self, name: impl Into<String>, file: impl Into<String>, content: &[u8]) {
        self.results.push(ManifestEntry {
            name: name.into(),
            file: file.into(),
            digest: digest(content),
        });
    }

    /// Read the manifest of a snapshot directory, `None` if it has none
    pub fn read(dir: &Path) -> Result<Option<Manifest>> {
        let bytes = match fs::read(dir.join(MANIFEST_FILE)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("read_manifest", e)),
        };
        let manifest = serde_json::from_slice(&bytes)
            .map_err(|e| serialization_error("read_manifest", e))?;
        Ok(Some(manifest))
    }

    /// Write the manifest into a snapshot directory
    pub fn write(&self, dir: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)
            .map_err(|e| serialization_error("write_manifest", e))?;
        atomic_write(&dir.join(MANIFEST_FILE), &bytes)
    }
}

/// Hex SHA-256 of a document
pub fn digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_digest_is_sha256_hex() {
        assert_eq!(
            digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_missing_manifest_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(Manifest::read(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let mut m = Manifest::new("t", "initial");
        m.push("users", "users.json", b"{}");
        m.write(dir.path()).unwrap();

        let back = Manifest::read(dir.path()).unwrap().unwrap();
        assert_eq!(back, m);
        assert_eq!(back.schema_version, MANIFEST_SCHEMA_VERSION);
    }
}
