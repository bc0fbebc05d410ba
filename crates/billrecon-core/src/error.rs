//! Error types for reconciliation.

use std::fmt;
use std::path::PathBuf;

use billrecon_ingest::IngestError;
use thiserror::Error;

/// The two reference datasets a document is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    /// Vessel ownership registry.
    Vessel,
    /// Customer master data.
    Customer,
}

impl DatasetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vessel => "vessel",
            Self::Customer => "customer",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while reconciling a document.
#[derive(Debug, Error)]
pub enum ReconError {
    // === Document Errors ===
    /// The field extractor's payload is not a JSON object.
    #[error("malformed payload: {message}")]
    MalformedPayload { message: String },

    /// A collaborator (text or field extraction) failed.
    #[error("{stage} failed: {message}")]
    Extraction { stage: &'static str, message: String },

    // === Reference Data Errors ===
    /// No file matching the dataset prefix exists.
    #[error("{dataset} reference dataset missing: no file matching '{prefix}' in {directory}")]
    ReferenceDatasetMissing {
        dataset: DatasetKind,
        directory: PathBuf,
        prefix: String,
    },

    /// The dataset file exists but could not be loaded.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    // === Configuration Errors ===
    /// Failed to read the configuration file.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the configuration file.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration parsed but is not usable.
    #[error("invalid config: {message}")]
    ConfigInvalid { message: String },

    // === Output Errors ===
    /// Failed to persist a reconciled record.
    #[error("failed to write result {path}: {source}")]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize a reconciled record.
    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ReconError {
    /// Returns true when the error concerns a single document only.
    ///
    /// Anything else (missing or unreadable reference data, bad config, an
    /// unwritable output location) will fail every following document too.
    pub fn is_document_error(&self) -> bool {
        matches!(self, Self::MalformedPayload { .. } | Self::Extraction { .. })
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_missing_display() {
        let err = ReconError::ReferenceDatasetMissing {
            dataset: DatasetKind::Customer,
            directory: PathBuf::from("data"),
            prefix: "MDM Live Customers".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "customer reference dataset missing: no file matching 'MDM Live Customers' in data"
        );
        assert!(!err.is_document_error());
    }

    #[test]
    fn test_malformed_payload_is_document_error() {
        let err = ReconError::MalformedPayload {
            message: "expected value".to_string(),
        };
        assert!(err.is_document_error());
    }

    #[test]
    fn test_ingest_error_passes_through() {
        let err: ReconError = IngestError::MissingColumn {
            column: "IMO No".to_string(),
            path: PathBuf::from("lloyds.xlsx"),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "required column 'IMO No' not found in lloyds.xlsx"
        );
    }
}
