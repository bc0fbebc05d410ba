//! Reference dataset ingestion.
//!
//! This crate locates the reference datasets (vessel ownership registry,
//! customer master data) and loads them into string-typed Polars DataFrames.
//!
//! # Features
//!
//! - **Discovery**: pick the newest file in a directory whose name contains a
//!   prefix token and has a spreadsheet or CSV extension
//! - **Loading**: read `xlsx`/`xls`/`ods` via calamine and CSV via Polars; every
//!   cell is text, empty cells are `""`
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use billrecon_ingest::{SheetSelector, find_latest_dataset, read_reference_table};
//!
//! let path = find_latest_dataset(Path::new("data"), "LloydsCurrentOwnership")?;
//! let table = read_reference_table(&path, &SheetSelector::default())?;
//! println!("{} rows", table.height());
//! ```

mod cell;
mod discovery;
mod error;
mod table;

// === Error Types ===
pub use error::{IngestError, Result};

// === Discovery ===
pub use discovery::{
    DATASET_EXTENSIONS, DatasetFile, find_latest_dataset, is_dataset_extension,
    list_dataset_files,
};

// === Loading ===
pub use cell::{cell_text, format_numeric, normalize_header};
pub use table::{ReferenceTable, SheetSelector, read_reference_table};
