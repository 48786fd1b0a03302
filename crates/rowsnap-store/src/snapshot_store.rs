//! Filesystem snapshot store
//!
//! Saves each result of a snapshot as its own JSON document and records
//! their order in a manifest. Loading follows the manifest and verifies
//! every document's digest.
//!
//! ## Overwrite
//!
//! With `overwrite`, the existing snapshot directory is removed in full
//! before the new documents are written. The swap is not atomic: a crash in
//! between leaves no snapshot at all. All documents are encoded before the
//! old directory is touched, so encoding failures never lose data.

use crate::errors::{
    already_exists, corrupt_snapshot, invalid_input, io_error, not_found, Result,
};
use crate::fs::atomic_write;
use crate::layout::{self, MANIFEST_FILE, RESULT_EXT};
use crate::manifest::{digest, Manifest, MANIFEST_SCHEMA_VERSION};
use rowsnap_core::codec;
use rowsnap_core::errors::ExError;
use rowsnap_core::{ResultSet, Snapshot};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default snapshot root, relative to the working directory
pub const DEFAULT_ROOT: &str = "testdata/snapshot";

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub root: PathBuf,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
        }
    }
}

/// Snapshot persistence rooted at one directory
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::from_options(StoreOptions::default())
    }
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_options(options: StoreOptions) -> Self {
        Self::new(options.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a snapshot lives in
    pub fn snapshot_dir(&self, test_id: &str, name: &str) -> Result<PathBuf> {
        layout::snapshot_dir(&self.root, test_id, name)
    }

    /// Whether a snapshot has been saved
    pub fn exists(&self, test_id: &str, name: &str) -> Result<bool> {
        Ok(self.snapshot_dir(test_id, name)?.is_dir())
    }

    /// Persist every result of a snapshot
    ///
    /// Returns the snapshot directory.
    ///
    /// ## Errors
    ///
    /// - `AlreadyExists`: directory exists and `overwrite` is false (nothing is touched)
    /// - `InvalidInput`: a name is not a usable path segment, or two results share a name
    /// - `Serialization` / `Io`: encoding or writing failed
    pub fn save(&self, snapshot: &Snapshot, overwrite: bool) -> Result<PathBuf> {
        let dir = self.snapshot_dir(&snapshot.test_id, &snapshot.name)?;

        let mut manifest = Manifest::new(snapshot.test_id.clone(), snapshot.name.clone());
        let mut documents = Vec::with_capacity(snapshot.results.len());
        let mut seen = BTreeSet::new();
        for result in &snapshot.results {
            let file = layout::result_file_name(result.name())?;
            if !seen.insert(result.name()) {
                return Err(invalid_input(
                    "save_snapshot",
                    format!("duplicate result name {:?}", result.name()),
                ));
            }
            let bytes = codec::marshal(result)
                .map_err(|e| ExError::from(e).with_op("save_snapshot"))?;
            manifest.push(result.name(), file.clone(), &bytes);
            documents.push((file, bytes));
        }

        if dir.exists() {
            if !overwrite {
                return Err(already_exists(&dir));
            }
            fs::remove_dir_all(&dir).map_err(|e| io_error("remove_snapshot_dir", e))?;
            tracing::debug!(path = %dir.display(), "Removed existing snapshot for overwrite");
        }

        fs::create_dir_all(&dir).map_err(|e| io_error("create_snapshot_dir", e))?;
        for (file, bytes) in &documents {
            atomic_write(&dir.join(file), bytes)?;
        }
        manifest.write(&dir)?;

        tracing::debug!(
            path = %dir.display(),
            result_count = documents.len(),
            "Saved snapshot"
        );

        Ok(dir)
    }

    /// Load a snapshot in recorded order
    ///
    /// ## Errors
    ///
    /// - `NotFound`: no such snapshot directory
    /// - `CorruptSnapshot`: a listed document is missing or its digest differs
    /// - `UnsupportedType` / `Serialization`: a document cannot be decoded
    pub fn load(&self, test_id: &str, name: &str) -> Result<Snapshot> {
        let dir = self.snapshot_dir(test_id, name)?;
        if !dir.is_dir() {
            return Err(not_found(&dir));
        }

        let results = match Manifest::read(&dir)? {
            Some(manifest) => load_with_manifest(&dir, &manifest)?,
            None => {
                tracing::warn!(
                    path = %dir.display(),
                    "Snapshot has no manifest; loading results in file-name order"
                );
                load_by_file_name(&dir)?
            }
        };

        tracing::debug!(
            path = %dir.display(),
            result_count = results.len(),
            "Loaded snapshot"
        );

        Ok(Snapshot::new(test_id, name, results))
    }

    /// Names of the snapshots recorded for a test, sorted
    pub fn list(&self, test_id: &str) -> Result<Vec<String>> {
        let dir = layout::test_dir(&self.root, test_id)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("list_snapshots", e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error("list_snapshots", e))?;
            let path = entry.path();
            if path.is_dir() && path.join(MANIFEST_FILE).is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn load_with_manifest(dir: &Path, manifest: &Manifest) -> Result<Vec<ResultSet>> {
    if manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(corrupt_snapshot(
            dir,
            format!("unsupported manifest schema version {}", manifest.schema_version),
        ));
    }

    let mut results = Vec::with_capacity(manifest.results.len());
    for entry in &manifest.results {
        if layout::validate_segment("result file", &entry.file).is_err() {
            return Err(corrupt_snapshot(
                dir,
                format!("manifest lists unusable file name {:?}", entry.file),
            ));
        }
        let path = dir.join(&entry.file);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(corrupt_snapshot(
                    dir,
                    format!("listed result file {} is missing", entry.file),
                ))
            }
            Err(e) => return Err(io_error("read_result", e)),
        };
        if digest(&bytes) != entry.digest {
            return Err(corrupt_snapshot(
                dir,
                format!("digest mismatch for {}", entry.file),
            ));
        }
        let result = decode(&path, &bytes)?;
        if result.name() != entry.name {
            return Err(corrupt_snapshot(
                dir,
                format!(
                    "{} holds result {:?}, manifest says {:?}",
                    entry.file,
                    result.name(),
                    entry.name
                ),
            ));
        }
        results.push(result);
    }
    Ok(results)
}

fn load_by_file_name(dir: &Path) -> Result<Vec<ResultSet>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| io_error("read_snapshot_dir", e))? {
        let entry = entry.map_err(|e| io_error("read_snapshot_dir", e))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_document = path.is_file()
            && !name.starts_with('.')
            && path.extension().and_then(|e| e.to_str()) == Some(RESULT_EXT);
        if is_document {
            files.push(path);
        }
    }
    files.sort();

    files
        .iter()
        .map(|path| {
            let bytes = fs::read(path).map_err(|e| io_error("read_result", e))?;
            decode(path, &bytes)
        })
        .collect()
}

fn decode(path: &Path, bytes: &[u8]) -> Result<ResultSet> {
    codec::unmarshal(bytes).map_err(|e| {
        ExError::from(e)
            .with_op("load_snapshot")
            .with_entity_id(path.display().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowsnap_core::{ColType, ResultType, ScanType, Value};
    use tempfile::TempDir;

    fn setup_store() -> (SnapshotStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        (SnapshotStore::new(temp_dir.path()), temp_dir)
    }

    fn result(name: &str, n: i64) -> ResultSet {
        let rt = ResultType::new(name, true, vec![ColType::new("n", "INTEGER", ScanType::Int64)]);
        ResultSet::new(rt, vec![vec![Value::Int64(n)]]).unwrap()
    }

    #[test]
    fn test_default_root() {
        assert_eq!(SnapshotStore::default().root(), Path::new("testdata/snapshot"));
    }

    #[test]
    fn test_duplicate_result_names_rejected_before_write() {
        let (store, _dir) = setup_store();
        let snap = Snapshot::new("t", "initial", vec![result("a", 1), result("a", 2)]);
        let err = store.save(&snap, false).unwrap_err();
        assert_eq!(err.kind(), rowsnap_core::ExErrorKind::InvalidInput);
        assert!(!store.exists("t", "initial").unwrap());
    }

    #[test]
    fn test_list_only_reports_saved_snapshots() {
        let (store, dir) = setup_store();
        store.save(&Snapshot::new("t", "b", vec![result("x", 1)]), false).unwrap();
        store.save(&Snapshot::new("t", "a", vec![]), false).unwrap();
        fs::create_dir_all(dir.path().join("t").join("scratch")).unwrap();
        assert_eq!(store.list("t").unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert!(store.list("nobody").unwrap().is_empty());
    }
}
