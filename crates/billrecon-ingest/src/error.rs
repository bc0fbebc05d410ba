//! Error types for reference dataset ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating or loading a reference dataset.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No file in the directory matches the dataset prefix.
    #[error("no dataset matching '{prefix}' found in {directory}")]
    DatasetNotFound { directory: PathBuf, prefix: String },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Parsing Errors ===
    /// The spreadsheet could not be opened or a sheet could not be read.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// The configured sheet does not exist in the workbook.
    #[error("sheet {sheet} not found in {path}")]
    SheetNotFound { sheet: String, path: PathBuf },

    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// The dataset has no header row.
    #[error("dataset is empty: {path}")]
    EmptyDataset { path: PathBuf },

    // === Schema Errors ===
    /// Required column not found in the dataset header.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::DatasetNotFound {
            directory: PathBuf::from("data"),
            prefix: "LloydsCurrentOwnership".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no dataset matching 'LloydsCurrentOwnership' found in data"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
