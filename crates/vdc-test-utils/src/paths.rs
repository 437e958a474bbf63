//! Path utilities for locating test data files.

use std::path::PathBuf;

/// Returns the workspace root directory, found by walking up from this
/// crate's manifest directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns the path to `crates/{crate_name}/testdata/`.
pub fn crate_testdata_dir(crate_name: &str) -> PathBuf {
    workspace_root()
        .join("crates")
        .join(crate_name)
        .join("testdata")
}

/// Returns the path to `apps/{app_name}/testdata/`.
pub fn app_testdata_dir(app_name: &str) -> PathBuf {
    workspace_root()
        .join("apps")
        .join(app_name)
        .join("testdata")
}

/// Searches for a test file in multiple locations:
/// 1. `TEST_DATA_DIR` environment variable, if set
/// 2. `crates/vdc-readers/testdata/`
/// 3. `crates/vdc-netcdf/testdata/`
/// 4. `crates/vdc-amr/testdata/`
/// 5. workspace-level `testdata/`
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }

    let root = workspace_root();
    candidates.extend([
        root.join("crates/vdc-readers/testdata").join(name),
        root.join("crates/vdc-netcdf/testdata").join(name),
        root.join("crates/vdc-amr/testdata").join(name),
        root.join("testdata").join(name),
    ]);

    candidates.into_iter().find(|path| path.exists())
}

/// Searches for a test file in a specific crate's testdata directory.
pub fn find_crate_test_file(crate_name: &str, name: &str) -> Option<PathBuf> {
    let path = crate_testdata_dir(crate_name).join(name);
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

/// Creates a temporary directory for test output, cleaned up on drop.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("failed to create temporary test directory")
}

/// Creates a temporary directory with a specific prefix.
pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("failed to create temporary test directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_is_valid() {
        let root = workspace_root();
        assert!(
            root.join("Cargo.toml").exists(),
            "workspace root should contain Cargo.toml: {:?}",
            root
        );
    }

    #[test]
    fn test_crate_testdata_dir() {
        let dir = crate_testdata_dir("vdc-amr");
        assert!(dir.to_string_lossy().contains("vdc-amr"));
        assert!(dir.to_string_lossy().contains("testdata"));
    }

    #[test]
    fn test_temp_test_dir() {
        let dir = temp_test_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_temp_test_dir_with_prefix() {
        let dir = temp_test_dir_with_prefix("vdc_test_");
        let path_str = dir.path().to_string_lossy();
        assert!(path_str.contains("vdc_test_"));
    }
}
