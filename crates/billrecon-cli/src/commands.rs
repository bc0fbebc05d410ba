use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use billrecon_cli::intake::IntakeWatcher;
use billrecon_core::{
    CustomerIndex, DatasetKind, DocumentProcessor, JsonFileSink, PassthroughFieldExtractor,
    PlainTextExtractor, ReconConfig, ReconError, ReconciliationEngine, ReferenceCache,
    ReferenceSource, ResultSink, VesselIndex,
};
use billrecon_ingest::find_latest_dataset;
use billrecon_model::ReconciledRecord;

use crate::cli::{ReconcileArgs, WatchArgs};
use crate::summary::{print_batch_summary, print_dataset_table};
use crate::types::{BatchResult, DatasetStatus, DocumentSummary};

/// Loads the config file named on the command line, or the defaults.
pub fn load_config(path: Option<&Path>, data_dir: Option<&Path>) -> Result<ReconConfig> {
    let mut config = match path {
        Some(path) => ReconConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => ReconConfig::default(),
    };
    if let Some(dir) = data_dir {
        config.reference.directory = dir.to_path_buf();
    }
    Ok(config)
}

/// Prints each record to stdout as pretty JSON.
struct StdoutSink;

impl ResultSink for StdoutSink {
    fn persist(&self, _source: &Path, record: &ReconciledRecord) -> billrecon_core::Result<PathBuf> {
        let json = serde_json::to_string_pretty(record)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{json}").map_err(|e| ReconError::Sink {
            path: PathBuf::from("-"),
            source: e,
        })?;
        Ok(PathBuf::from("-"))
    }
}

/// Writes results next to each payload.
struct SiblingJsonSink;

impl ResultSink for SiblingJsonSink {
    fn persist(&self, source: &Path, record: &ReconciledRecord) -> billrecon_core::Result<PathBuf> {
        let dir = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        JsonFileSink::new(dir).persist(source, record)
    }
}

pub fn run_reconcile(args: &ReconcileArgs, config: &ReconConfig) -> Result<BatchResult> {
    let engine = ReconciliationEngine::from_config(config);
    let processor = match (&args.output_dir, args.stdout) {
        (_, true) => DocumentProcessor::new(
            PlainTextExtractor,
            PassthroughFieldExtractor,
            StdoutSink,
            engine,
        ),
        (Some(dir), false) => DocumentProcessor::new(
            PlainTextExtractor,
            PassthroughFieldExtractor,
            JsonFileSink::new(dir),
            engine,
        ),
        (None, false) => DocumentProcessor::new(
            PlainTextExtractor,
            PassthroughFieldExtractor,
            SiblingJsonSink,
            engine,
        ),
    };

    let mut result = BatchResult::default();
    for payload in &args.payloads {
        match processor.process(payload) {
            Ok(done) => result.documents.push(DocumentSummary {
                source: done.source,
                output: Some(done.output),
                record: Some(done.record),
                error: None,
            }),
            Err(error) if error.is_document_error() => {
                warn!(path = %payload.display(), %error, "Document failed");
                result.has_errors = true;
                result.documents.push(DocumentSummary {
                    source: payload.clone(),
                    output: None,
                    record: None,
                    error: Some(error.to_string()),
                });
            }
            Err(error) => {
                return Err(error).with_context(|| format!("reconcile {}", payload.display()));
            }
        }
    }
    info!(
        documents = result.documents.len(),
        needs_review = result.needs_review(),
        "Reconciliation finished"
    );
    Ok(result)
}

pub fn run_watch(args: &WatchArgs, config: &ReconConfig) -> Result<BatchResult> {
    let intake = &config.intake;
    if !intake.directory.is_dir() {
        bail!("intake directory not found: {}", intake.directory.display());
    }
    let _span = info_span!("watch", directory = %intake.directory.display()).entered();

    let output_dir = intake
        .output_directory
        .clone()
        .unwrap_or_else(|| intake.processed_directory.clone());
    let processor = DocumentProcessor::new(
        PlainTextExtractor,
        PassthroughFieldExtractor,
        JsonFileSink::new(output_dir),
        ReconciliationEngine::from_config(config),
    );
    let watcher = IntakeWatcher::new(intake.clone(), processor);

    let mut result = BatchResult::default();
    if args.once {
        watcher.drain(|outcome| {
            let summary = DocumentSummary::from(outcome);
            result.has_errors |= summary.error.is_some();
            result.documents.push(summary);
        })?;
    } else {
        watcher.run(|outcome| {
            let summary = DocumentSummary::from(outcome);
            print_batch_summary(&BatchResult {
                has_errors: summary.error.is_some(),
                documents: vec![summary],
            });
        })?;
    }
    Ok(result)
}

pub fn run_datasets(config: &ReconConfig) -> Result<Vec<DatasetStatus>> {
    let reference = &config.reference;
    let cache = ReferenceCache::new(reference.clone());

    let vessels = dataset_status(
        DatasetKind::Vessel,
        &reference.directory,
        &reference.vessel.prefix,
        || cache.vessels().map(VesselIndex::len),
    );
    let customers = dataset_status(
        DatasetKind::Customer,
        &reference.directory,
        &reference.customer.prefix,
        || cache.customers().map(CustomerIndex::len),
    );
    let statuses = vec![vessels, customers];
    print_dataset_table(&statuses);
    Ok(statuses)
}

fn dataset_status(
    kind: DatasetKind,
    directory: &Path,
    prefix: &str,
    load: impl FnOnce() -> billrecon_core::Result<usize>,
) -> DatasetStatus {
    let path = find_latest_dataset(directory, prefix).ok();
    let (records, error) = match load() {
        Ok(count) => (Some(count), None),
        Err(error) => (None, Some(error.to_string())),
    };
    DatasetStatus {
        kind,
        prefix: prefix.to_string(),
        path,
        records,
        error,
    }
}
