//! On-disk snapshot layout
//!
//! `<root>/<test id>/<snapshot name>/<result name>.json`, plus
//! `.manifest.json` in the snapshot directory. Test ids may contain `/`
//! (nested test names) and become nested directories.

use crate::errors::{invalid_input, Result};
use std::path::{Path, PathBuf};

/// Manifest file name inside a snapshot directory
pub const MANIFEST_FILE: &str = ".manifest.json";

/// Extension of result documents
pub const RESULT_EXT: &str = "json";

/// Reject names that would escape or collide with the layout
///
/// Names must be non-empty, must not start with `.`, and must not contain
/// path separators or NUL.
pub fn validate_segment(what: &str, segment: &str) -> Result<()> {
    let reason = if segment.is_empty() {
        Some("must not be empty")
    } else if segment.starts_with('.') {
        Some("must not start with '.'")
    } else if segment.contains(&['/', '\\', '\0'][..]) {
        Some("must not contain path separators")
    } else {
        None
    };
    match reason {
        Some(r) => Err(invalid_input(
            "snapshot_layout",
            format!("{} {:?} {}", what, segment, r),
        )),
        None => Ok(()),
    }
}

/// Directory holding one test's snapshots
pub fn test_dir(root: &Path, test_id: &str) -> Result<PathBuf> {
    let mut dir = root.to_path_buf();
    for part in test_id.split('/') {
        validate_segment("test id", part)?;
        dir.push(part);
    }
    Ok(dir)
}

/// Directory holding one snapshot
pub fn snapshot_dir(root: &Path, test_id: &str, name: &str) -> Result<PathBuf> {
    validate_segment("snapshot name", name)?;
    Ok(test_dir(root, test_id)?.join(name))
}

/// File name of a result document
pub fn result_file_name(result_name: &str) -> Result<String> {
    validate_segment("result name", result_name)?;
    Ok(format!("{}.{}", result_name, RESULT_EXT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_test_id_becomes_nested_dirs() {
        let dir = snapshot_dir(Path::new("root"), "TestOrders/paid", "initial").unwrap();
        assert_eq!(dir, Path::new("root").join("TestOrders").join("paid").join("initial"));
    }

    #[test]
    fn test_traversal_is_rejected() {
        assert!(snapshot_dir(Path::new("root"), "t/../x", "initial").is_err());
        assert!(snapshot_dir(Path::new("root"), "t", "..").is_err());
        assert!(result_file_name("a/b").is_err());
        assert!(result_file_name("").is_err());
    }

    #[test]
    fn test_result_file_name() {
        assert_eq!(result_file_name("users").unwrap(), "users.json");
    }
}
