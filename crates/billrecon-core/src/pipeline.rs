//! Document processing: text extraction, field extraction, reconciliation
//! and persistence, wired through replaceable stages.

use std::path::{Path, PathBuf};

use billrecon_model::ReconciledRecord;

use crate::cache::ReferenceSource;
use crate::engine::ReconciliationEngine;
use crate::error::{ReconError, Result};

/// Produces the text of a document.
pub trait TextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String>;
}

/// Turns document text into the raw field payload (expected to be JSON).
pub trait FieldExtractor {
    fn extract_fields(&self, text: &str) -> Result<String>;
}

/// Persists a reconciled record, returning where it went.
pub trait ResultSink {
    fn persist(&self, source: &Path, record: &ReconciledRecord) -> Result<PathBuf>;
}

/// Reads a UTF-8 text file.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| ReconError::Extraction {
            stage: "text extraction",
            message: format!("{}: {e}", path.display()),
        })
    }
}

/// Treats the document text as the field payload itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughFieldExtractor;

impl FieldExtractor for PassthroughFieldExtractor {
    fn extract_fields(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }
}

/// Writes `<stem>.json` into a directory, pretty-printed.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    output_dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Output path for a source document.
    ///
    /// A source that would be overwritten by its own result gets a
    /// `<stem>.result.json` name instead.
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let candidate = self.output_dir.join(format!("{stem}.json"));
        if same_location(&candidate, source) {
            self.output_dir.join(format!("{stem}.result.json"))
        } else {
            candidate
        }
    }
}

/// Whether two paths name the same file, however they are spelled.
fn same_location(a: &Path, b: &Path) -> bool {
    a == b || matches!((resolve_location(a), resolve_location(b)), (Some(a), Some(b)) if a == b)
}

/// Absolute form of `path` with its directory resolved through the
/// filesystem when it exists. The file itself need not exist.
fn resolve_location(path: &Path) -> Option<PathBuf> {
    let absolute = std::path::absolute(path).ok()?;
    let (Some(parent), Some(name)) = (absolute.parent(), absolute.file_name()) else {
        return Some(absolute);
    };
    let parent = parent.canonicalize().unwrap_or_else(|_| parent.to_path_buf());
    Some(parent.join(name))
}

impl ResultSink for JsonFileSink {
    fn persist(&self, source: &Path, record: &ReconciledRecord) -> Result<PathBuf> {
        let path = self.output_path(source);
        let json = serde_json::to_string_pretty(record)?;

        std::fs::create_dir_all(&self.output_dir).map_err(|e| ReconError::Sink {
            path: self.output_dir.clone(),
            source: e,
        })?;
        std::fs::write(&path, json).map_err(|e| ReconError::Sink {
            path: path.clone(),
            source: e,
        })?;

        tracing::info!(path = %path.display(), "Wrote reconciled record");
        Ok(path)
    }
}

/// Outcome of processing one document.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub source: PathBuf,
    pub output: PathBuf,
    pub record: ReconciledRecord,
}

/// Runs documents through extraction, reconciliation and the sink.
pub struct DocumentProcessor<S> {
    text: Box<dyn TextExtractor>,
    fields: Box<dyn FieldExtractor>,
    sink: Box<dyn ResultSink>,
    engine: ReconciliationEngine<S>,
}

impl<S: ReferenceSource> DocumentProcessor<S> {
    pub fn new(
        text: impl TextExtractor + 'static,
        fields: impl FieldExtractor + 'static,
        sink: impl ResultSink + 'static,
        engine: ReconciliationEngine<S>,
    ) -> Self {
        Self {
            text: Box::new(text),
            fields: Box::new(fields),
            sink: Box::new(sink),
            engine,
        }
    }

    pub fn engine(&self) -> &ReconciliationEngine<S> {
        &self.engine
    }

    /// Processes one document start to finish.
    ///
    /// Nothing is persisted when any stage fails.
    pub fn process(&self, path: &Path) -> Result<ProcessedDocument> {
        let _span = tracing::info_span!("document", path = %path.display()).entered();

        let text = self.text.extract_text(path)?;
        let payload = self.fields.extract_fields(&text)?;
        let record = self.engine.reconcile_payload(&payload)?;
        let output = self.sink.persist(path, &record)?;

        Ok(ProcessedDocument {
            source: path.to_path_buf(),
            output,
            record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::StaticReferences;
    use crate::index::{CustomerIndex, VesselIndex};
    use tempfile::TempDir;

    struct FailingExtractor;

    impl FieldExtractor for FailingExtractor {
        fn extract_fields(&self, _text: &str) -> Result<String> {
            Err(ReconError::Extraction {
                stage: "field extraction",
                message: "service unavailable".to_string(),
            })
        }
    }

    fn engine() -> ReconciliationEngine<StaticReferences> {
        ReconciliationEngine::new(StaticReferences::new(
            VesselIndex::default(),
            CustomerIndex::default(),
        ))
    }

    #[test]
    fn test_output_path_avoids_overwriting_source() {
        let sink = JsonFileSink::new("out");
        assert_eq!(sink.output_path(Path::new("in/order.txt")), Path::new("out/order.json"));
        assert_eq!(
            sink.output_path(Path::new("out/order.json")),
            Path::new("out/order.result.json")
        );
    }

    #[test]
    fn test_output_path_compares_resolved_locations() {
        let sink = JsonFileSink::new(".");
        assert_eq!(
            sink.output_path(Path::new("order.json")),
            Path::new("./order.result.json")
        );
        assert_eq!(
            sink.output_path(Path::new("order.txt")),
            Path::new("./order.json")
        );
    }

    #[test]
    fn test_json_payload_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("results")).unwrap();
        let input = dir.path().join("order.json");
        let payload = "{\"vessel_name\": \"Unknown\"}";
        std::fs::write(&input, payload).unwrap();

        // Same directory, spelled differently.
        let processor = DocumentProcessor::new(
            PlainTextExtractor,
            PassthroughFieldExtractor,
            JsonFileSink::new(dir.path().join("results").join("..")),
            engine(),
        );
        let done = processor.process(&input).unwrap();

        assert_eq!(
            done.output.file_name().and_then(|n| n.to_str()),
            Some("order.result.json")
        );
        assert_eq!(std::fs::read_to_string(&input).unwrap(), payload);
    }

    #[test]
    fn test_process_writes_result() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("order 1.txt");
        std::fs::write(&input, "```json\n{\"vessel_name\": \"Unknown\"}\n```").unwrap();

        let processor = DocumentProcessor::new(
            PlainTextExtractor,
            PassthroughFieldExtractor,
            JsonFileSink::new(dir.path().join("results")),
            engine(),
        );
        let done = processor.process(&input).unwrap();

        assert_eq!(done.output, dir.path().join("results").join("order 1.json"));
        let written: ReconciledRecord =
            serde_json::from_str(&std::fs::read_to_string(&done.output).unwrap()).unwrap();
        assert_eq!(written, done.record);
        assert_eq!(written.from_order.vessel_name(), Some("Unknown"));
    }

    #[test]
    fn test_failed_stage_persists_nothing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("order.txt");
        std::fs::write(&input, "scanned text").unwrap();
        let results = dir.path().join("results");

        let processor = DocumentProcessor::new(
            PlainTextExtractor,
            FailingExtractor,
            JsonFileSink::new(&results),
            engine(),
        );
        let err = processor.process(&input).unwrap_err();

        assert!(err.is_document_error());
        assert!(!results.exists());
    }

    #[test]
    fn test_unreadable_document() {
        let dir = TempDir::new().unwrap();
        let err = PlainTextExtractor
            .extract_text(&dir.path().join("missing.txt"))
            .unwrap_err();
        assert!(matches!(err, ReconError::Extraction { .. }));
    }
}
