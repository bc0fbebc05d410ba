//! Reference dataset discovery.
//!
//! Reference datasets are dropped into a directory as periodic exports
//! (e.g. `LloydsCurrentOwnership 28-Apr-2025.xlsx`). The dataset in use is the
//! most recently modified file whose name contains the configured prefix.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{IngestError, Result};

/// File extensions accepted as tabular datasets (compared case-insensitively).
pub const DATASET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"];

/// A candidate dataset file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFile {
    /// Path to the file.
    pub path: PathBuf,
    /// Last modification time.
    pub modified: SystemTime,
}

/// Returns true if the path has one of [`DATASET_EXTENSIONS`].
pub fn is_dataset_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            DATASET_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Lists dataset files in `dir` whose file name contains `prefix`.
///
/// Returns files sorted newest first; equal modification times are ordered by
/// file name, greatest first.
pub fn list_dataset_files(dir: &Path, prefix: &str) -> Result<Vec<DatasetFile>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        // Skip directories
        if !path.is_file() {
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        // Office lock files carry the same name and extension as the workbook.
        if name.starts_with("~$") {
            continue;
        }

        if !name.contains(prefix) || !is_dataset_extension(&path) {
            continue;
        }

        let modified = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .map_err(|e| IngestError::FileRead {
                path: path.clone(),
                source: e,
            })?;

        files.push(DatasetFile { path, modified });
    }

    files.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| b.path.file_name().cmp(&a.path.file_name()))
    });

    Ok(files)
}

/// Finds the most recently modified dataset file matching `prefix`.
///
/// A missing directory is reported as [`IngestError::DatasetNotFound`] as
/// well, since either way the dataset cannot be located.
pub fn find_latest_dataset(dir: &Path, prefix: &str) -> Result<PathBuf> {
    let files = match list_dataset_files(dir, prefix) {
        Ok(files) => files,
        Err(IngestError::DirectoryNotFound { .. }) => Vec::new(),
        Err(other) => return Err(other),
    };

    let Some(latest) = files.into_iter().next() else {
        return Err(IngestError::DatasetNotFound {
            directory: dir.to_path_buf(),
            prefix: prefix.to_string(),
        });
    };

    tracing::debug!(
        prefix,
        path = %latest.path.display(),
        "Selected reference dataset"
    );
    Ok(latest.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, age_secs: u64) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "A,B\n1,2\n").unwrap();
        let modified = SystemTime::now() - Duration::from_secs(age_secs);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
        path
    }

    #[test]
    fn test_is_dataset_extension() {
        assert!(is_dataset_extension(Path::new("a.xlsx")));
        assert!(is_dataset_extension(Path::new("a.XLSX")));
        assert!(is_dataset_extension(Path::new("a.csv")));
        assert!(!is_dataset_extension(Path::new("a.pdf")));
        assert!(!is_dataset_extension(Path::new("xlsx")));
    }

    #[test]
    fn test_latest_matching_file_wins() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Lloyds 01-Jan-2025.csv", 300);
        let newest = touch(dir.path(), "Lloyds 28-Apr-2025.csv", 10);
        touch(dir.path(), "Customers 30-Apr-2025.csv", 1);

        let found = find_latest_dataset(dir.path(), "Lloyds").unwrap();
        assert_eq!(found, newest);
    }

    #[test]
    fn test_lock_files_and_other_extensions_are_ignored() {
        let dir = TempDir::new().unwrap();
        let real = touch(dir.path(), "Lloyds.csv", 100);
        touch(dir.path(), "~$Lloyds.xlsx", 1);
        touch(dir.path(), "Lloyds notes.txt", 1);

        let files = list_dataset_files(dir.path(), "Lloyds").unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, real);
    }

    #[test]
    fn test_missing_dataset() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Customers.csv", 1);

        let result = find_latest_dataset(dir.path(), "Lloyds");
        assert!(matches!(result, Err(IngestError::DatasetNotFound { .. })));
    }

    #[test]
    fn test_missing_directory_reports_missing_dataset() {
        let dir = TempDir::new().unwrap();
        let result = find_latest_dataset(&dir.path().join("absent"), "Lloyds");
        assert!(matches!(result, Err(IngestError::DatasetNotFound { .. })));
    }
}
