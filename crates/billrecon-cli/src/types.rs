use std::path::PathBuf;

use billrecon_cli::intake::IntakeOutcome;
use billrecon_core::DatasetKind;
use billrecon_model::ReconciledRecord;

#[derive(Debug)]
pub struct DocumentSummary {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub record: Option<ReconciledRecord>,
    pub error: Option<String>,
}

impl From<&IntakeOutcome> for DocumentSummary {
    fn from(outcome: &IntakeOutcome) -> Self {
        match outcome {
            IntakeOutcome::Processed {
                source,
                output,
                record,
                ..
            } => Self {
                source: source.clone(),
                output: Some(output.clone()),
                record: Some(record.as_ref().clone()),
                error: None,
            },
            IntakeOutcome::Failed { source, error, .. } => Self {
                source: source.clone(),
                output: None,
                record: None,
                error: Some(error.clone()),
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchResult {
    pub documents: Vec<DocumentSummary>,
    pub has_errors: bool,
}

impl BatchResult {
    pub fn needs_review(&self) -> usize {
        self.documents
            .iter()
            .filter(|doc| doc.record.as_ref().is_some_and(ReconciledRecord::needs_review))
            .count()
    }
}

#[derive(Debug)]
pub struct DatasetStatus {
    pub kind: DatasetKind,
    pub prefix: String,
    pub path: Option<PathBuf>,
    pub records: Option<usize>,
    pub error: Option<String>,
}
