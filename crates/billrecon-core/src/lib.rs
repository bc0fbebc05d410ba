//! Reconciliation of extracted order fields against reference data.
//!
//! An order document's fields are checked against two reference exports:
//!
//! - the vessel ownership registry, to confirm that the party being billed is
//!   the vessel's technical manager, and
//! - the customer master data, to confirm that the billing address is the one
//!   on file for that customer.
//!
//! The result is a [`ReconciledRecord`](billrecon_model::ReconciledRecord)
//! carrying the order, the matched reference rows and the verdicts.
//!
//! # Example
//!
//! ```ignore
//! use billrecon_core::{ReconConfig, ReconciliationEngine};
//!
//! let config = ReconConfig::load("billrecon.toml".as_ref())?;
//! let engine = ReconciliationEngine::from_config(&config);
//! let record = engine.reconcile_payload(raw_reply)?;
//! ```

pub mod assemble;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod normalize;
pub mod pipeline;
pub mod similarity;

pub use assemble::{RecordBuilder, summarize_customer};
pub use cache::{ReferenceCache, ReferenceSource, StaticReferences};
pub use config::{
    CustomerDatasetConfig, IntakeConfig, MatchingConfig, ReconConfig, ReferenceConfig,
    VesselDatasetConfig,
};
pub use engine::ReconciliationEngine;
pub use error::{DatasetKind, ReconError, Result};
pub use index::{CustomerIndex, VesselIndex};
pub use normalize::{normalize_key, parse_order_fields, strip_fences};
pub use pipeline::{
    DocumentProcessor, FieldExtractor, JsonFileSink, PassthroughFieldExtractor,
    PlainTextExtractor, ProcessedDocument, ResultSink, TextExtractor,
};
pub use similarity::{DEFAULT_ADDRESS_THRESHOLD, SequenceMatcher, is_address_match, similarity};
