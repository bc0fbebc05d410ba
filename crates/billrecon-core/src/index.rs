//! In-memory lookup indexes over the reference datasets.
//!
//! Rows keep their file order. Each lookup key maps to the ascending list of
//! row positions carrying it, so "first match in file order" is the smallest
//! position, found without scanning the table.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use billrecon_ingest::{IngestError, ReferenceTable};
use billrecon_model::{CustomerAddress, CustomerRecord, VesselRecord};

use crate::config::{CustomerDatasetConfig, VesselDatasetConfig};
use crate::normalize::normalize_key;

/// Lookup key for names: trimmed and lower-cased.
fn name_key(value: &str) -> String {
    value.trim().to_lowercase()
}

fn insert_position(map: &mut HashMap<String, Vec<usize>>, key: String, position: usize) {
    if key.is_empty() {
        return;
    }
    map.entry(key).or_default().push(position);
}

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

/// Finds configured columns in a table header.
///
/// Header and configured name are compared after key normalization, first
/// exactly, then ignoring case.
struct ColumnLookup<'a> {
    path: &'a Path,
    normalized: Vec<String>,
}

impl<'a> ColumnLookup<'a> {
    fn new(path: &'a Path, headers: &[String]) -> Self {
        Self {
            path,
            normalized: headers.iter().map(|h| normalize_key(h)).collect(),
        }
    }

    fn find(&self, name: &str) -> Option<usize> {
        let wanted = normalize_key(name);
        if wanted.is_empty() {
            return None;
        }
        self.normalized
            .iter()
            .position(|h| *h == wanted)
            .or_else(|| {
                let wanted = wanted.to_lowercase();
                self.normalized
                    .iter()
                    .position(|h| h.to_lowercase() == wanted)
            })
    }

    fn require(&self, name: &str) -> Result<usize, IngestError> {
        self.find(name).ok_or_else(|| IngestError::MissingColumn {
            column: name.to_string(),
            path: self.path.to_path_buf(),
        })
    }

    /// Columns not consumed by a typed field, keyed by normalized header.
    fn attributes(&self, row: &[String], consumed: &[usize]) -> BTreeMap<String, String> {
        self.normalized
            .iter()
            .zip(row)
            .enumerate()
            .filter(|(idx, _)| !consumed.contains(idx))
            .map(|(_, (key, value))| (key.clone(), value.clone()))
            .collect()
    }
}

fn cell(row: &[String], idx: usize) -> String {
    row.get(idx).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Vessel index
// ---------------------------------------------------------------------------

/// Vessel ownership registry, indexed by IMO number and vessel name.
#[derive(Debug, Clone, Default)]
pub struct VesselIndex {
    source: PathBuf,
    records: Vec<VesselRecord>,
    by_number: HashMap<String, Vec<usize>>,
    by_name: HashMap<String, Vec<usize>>,
}

impl VesselIndex {
    /// Builds the index from a loaded registry table.
    pub fn from_table(
        table: &ReferenceTable,
        config: &VesselDatasetConfig,
    ) -> Result<Self, IngestError> {
        let headers = table.headers();
        let columns = ColumnLookup::new(&table.path, &headers);

        let number_col = columns.require(&config.identifier_column)?;
        let name_col = columns.require(&config.name_column)?;
        let manager_cols: Vec<usize> = config
            .manager_columns
            .iter()
            .filter_map(|name| columns.find(name))
            .collect();
        if manager_cols.is_empty() {
            return Err(IngestError::MissingColumn {
                column: config.manager_columns.join(" | "),
                path: table.path.clone(),
            });
        }

        let mut consumed = vec![number_col, name_col];
        consumed.extend(&manager_cols);

        let records = table
            .rows()?
            .into_iter()
            .map(|row| {
                let technical_manager = manager_cols
                    .iter()
                    .map(|&idx| cell(&row, idx))
                    .find(|value| !value.trim().is_empty())
                    .unwrap_or_default();
                VesselRecord {
                    imo_number: cell(&row, number_col),
                    vessel_name: cell(&row, name_col),
                    technical_manager,
                    attributes: columns.attributes(&row, &consumed),
                }
            })
            .collect();

        let index = Self::from_records(&table.path, records);
        tracing::debug!(
            path = %index.source.display(),
            vessels = index.len(),
            "Indexed vessel registry"
        );
        Ok(index)
    }

    /// Builds the index from records already in file order.
    pub fn from_records(source: impl Into<PathBuf>, records: Vec<VesselRecord>) -> Self {
        let mut by_number = HashMap::new();
        let mut by_name = HashMap::new();
        for (position, record) in records.iter().enumerate() {
            insert_position(&mut by_number, record.imo_number.trim().to_string(), position);
            insert_position(&mut by_name, name_key(&record.vessel_name), position);
        }
        Self {
            source: source.into(),
            records,
            by_number,
            by_name,
        }
    }

    /// File the index was built from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[VesselRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Positions of every row matching the number or the name, ascending.
    pub fn matches(&self, name: Option<&str>, number: Option<&str>) -> Vec<usize> {
        let by_number = number
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .and_then(|n| self.by_number.get(n));
        let by_name = name
            .map(name_key)
            .filter(|n| !n.is_empty())
            .and_then(|n| self.by_name.get(&n));

        let mut positions: Vec<usize> = by_number
            .into_iter()
            .chain(by_name)
            .flatten()
            .copied()
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions
    }

    /// First row, in file order, whose IMO number equals `number` or whose
    /// name equals `name` (case-insensitive). Neither criterion takes
    /// precedence over the other.
    ///
    /// Returns `None` without a lookup when both are absent or blank.
    pub fn resolve(&self, name: Option<&str>, number: Option<&str>) -> Option<&VesselRecord> {
        let number = number.map(str::trim).filter(|n| !n.is_empty());
        let name = name.map(name_key).filter(|n| !n.is_empty());
        if number.is_none() && name.is_none() {
            return None;
        }

        let first_by_number = number
            .and_then(|n| self.by_number.get(n))
            .and_then(|positions| positions.first().copied());
        let first_by_name = name
            .as_deref()
            .and_then(|n| self.by_name.get(n))
            .and_then(|positions| positions.first().copied());

        let position = match (first_by_number, first_by_name) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }?;
        self.records.get(position)
    }
}

// ---------------------------------------------------------------------------
// Customer index
// ---------------------------------------------------------------------------

/// Customer master data, indexed by invoice name.
#[derive(Debug, Clone, Default)]
pub struct CustomerIndex {
    source: PathBuf,
    records: Vec<CustomerRecord>,
    by_name: HashMap<String, Vec<usize>>,
}

impl CustomerIndex {
    pub fn from_table(
        table: &ReferenceTable,
        config: &CustomerDatasetConfig,
    ) -> Result<Self, IngestError> {
        let headers = table.headers();
        let columns = ColumnLookup::new(&table.path, &headers);

        let name_col = columns.require(&config.name_column)?;
        let code_col = columns.require(&config.code_column)?;
        let care_of_col = columns.require(&config.care_of_column)?;
        let address_cols = config
            .address_columns()
            .map(|name| columns.require(name));
        let [po_box, city, county, state, zip_code, country] = address_cols;
        let [po_box, city, county, state, zip_code, country] =
            [po_box?, city?, county?, state?, zip_code?, country?];

        let consumed = [
            name_col, code_col, care_of_col, po_box, city, county, state, zip_code, country,
        ];

        let records = table
            .rows()?
            .into_iter()
            .map(|row| CustomerRecord {
                code: cell(&row, code_col),
                invoice_name: cell(&row, name_col),
                care_of: cell(&row, care_of_col),
                address: CustomerAddress {
                    po_box: cell(&row, po_box),
                    city: cell(&row, city),
                    county: cell(&row, county),
                    state: cell(&row, state),
                    zip_code: cell(&row, zip_code),
                    country: cell(&row, country),
                },
                attributes: columns.attributes(&row, &consumed),
            })
            .collect();

        let index = Self::from_records(&table.path, records);
        tracing::debug!(
            path = %index.source.display(),
            customers = index.len(),
            "Indexed customer master data"
        );
        Ok(index)
    }

    pub fn from_records(source: impl Into<PathBuf>, records: Vec<CustomerRecord>) -> Self {
        let mut by_name = HashMap::new();
        for (position, record) in records.iter().enumerate() {
            insert_position(&mut by_name, name_key(&record.invoice_name), position);
        }
        Self {
            source: source.into(),
            records,
            by_name,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows whose invoice name equals `billing_counterpart`.
    pub fn matches(&self, billing_counterpart: &str) -> usize {
        self.by_name
            .get(&name_key(billing_counterpart))
            .map_or(0, Vec::len)
    }

    /// First row whose invoice name equals `billing_counterpart`, ignoring
    /// case and surrounding whitespace.
    pub fn resolve(&self, billing_counterpart: Option<&str>) -> Option<&CustomerRecord> {
        let key = billing_counterpart.map(name_key).filter(|k| !k.is_empty())?;
        let position = self.by_name.get(&key)?.first().copied()?;
        self.records.get(position)
    }
}
