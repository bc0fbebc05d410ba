//! Access to the reference indexes.
//!
//! [`ReferenceCache`] locates and loads each dataset the first time it is
//! needed and keeps it for its own lifetime; a newer export dropped into the
//! directory afterwards is only picked up by a new cache.

use std::sync::OnceLock;

use billrecon_ingest::{IngestError, find_latest_dataset, read_reference_table};

use crate::config::ReferenceConfig;
use crate::error::{DatasetKind, ReconError, Result};
use crate::index::{CustomerIndex, VesselIndex};

/// Source of the vessel and customer indexes.
pub trait ReferenceSource {
    fn vessels(&self) -> Result<&VesselIndex>;

    fn customers(&self) -> Result<&CustomerIndex>;
}

impl<S: ReferenceSource + ?Sized> ReferenceSource for &S {
    fn vessels(&self) -> Result<&VesselIndex> {
        (**self).vessels()
    }

    fn customers(&self) -> Result<&CustomerIndex> {
        (**self).customers()
    }
}

/// Loads reference datasets from disk on first use.
#[derive(Debug)]
pub struct ReferenceCache {
    config: ReferenceConfig,
    vessels: OnceLock<VesselIndex>,
    customers: OnceLock<CustomerIndex>,
}

impl ReferenceCache {
    pub fn new(config: ReferenceConfig) -> Self {
        Self {
            config,
            vessels: OnceLock::new(),
            customers: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &ReferenceConfig {
        &self.config
    }

    pub fn vessels_loaded(&self) -> bool {
        self.vessels.get().is_some()
    }

    pub fn customers_loaded(&self) -> bool {
        self.customers.get().is_some()
    }

    fn load_vessels(&self) -> Result<VesselIndex> {
        let dataset = &self.config.vessel;
        let _span = tracing::info_span!("load_dataset", dataset = %DatasetKind::Vessel).entered();

        let path = self.locate(DatasetKind::Vessel, &dataset.prefix)?;
        let table = read_reference_table(&path, &dataset.sheet)?;
        Ok(VesselIndex::from_table(&table, dataset)?)
    }

    fn load_customers(&self) -> Result<CustomerIndex> {
        let dataset = &self.config.customer;
        let _span =
            tracing::info_span!("load_dataset", dataset = %DatasetKind::Customer).entered();

        let path = self.locate(DatasetKind::Customer, &dataset.prefix)?;
        let table = read_reference_table(&path, &dataset.sheet)?;
        Ok(CustomerIndex::from_table(&table, dataset)?)
    }

    fn locate(&self, dataset: DatasetKind, prefix: &str) -> Result<std::path::PathBuf> {
        find_latest_dataset(&self.config.directory, prefix).map_err(|err| match err {
            IngestError::DatasetNotFound { directory, prefix } => {
                tracing::error!(
                    %dataset,
                    directory = %directory.display(),
                    prefix = %prefix,
                    "Reference dataset missing"
                );
                ReconError::ReferenceDatasetMissing {
                    dataset,
                    directory,
                    prefix,
                }
            }
            other => other.into(),
        })
    }
}

impl ReferenceSource for ReferenceCache {
    fn vessels(&self) -> Result<&VesselIndex> {
        if let Some(index) = self.vessels.get() {
            return Ok(index);
        }
        let index = self.load_vessels()?;
        Ok(self.vessels.get_or_init(|| index))
    }

    fn customers(&self) -> Result<&CustomerIndex> {
        if let Some(index) = self.customers.get() {
            return Ok(index);
        }
        let index = self.load_customers()?;
        Ok(self.customers.get_or_init(|| index))
    }
}

/// Indexes built up front.
///
/// A dataset left out behaves like a missing export.
#[derive(Debug, Default)]
pub struct StaticReferences {
    vessels: Option<VesselIndex>,
    customers: Option<CustomerIndex>,
}

impl StaticReferences {
    pub fn new(vessels: VesselIndex, customers: CustomerIndex) -> Self {
        Self {
            vessels: Some(vessels),
            customers: Some(customers),
        }
    }

    pub fn with_vessels(mut self, vessels: VesselIndex) -> Self {
        self.vessels = Some(vessels);
        self
    }

    pub fn with_customers(mut self, customers: CustomerIndex) -> Self {
        self.customers = Some(customers);
        self
    }
}

fn not_supplied(dataset: DatasetKind) -> ReconError {
    ReconError::ReferenceDatasetMissing {
        dataset,
        directory: std::path::PathBuf::new(),
        prefix: String::new(),
    }
}

impl ReferenceSource for StaticReferences {
    fn vessels(&self) -> Result<&VesselIndex> {
        self.vessels
            .as_ref()
            .ok_or_else(|| not_supplied(DatasetKind::Vessel))
    }

    fn customers(&self) -> Result<&CustomerIndex> {
        self.customers
            .as_ref()
            .ok_or_else(|| not_supplied(DatasetKind::Customer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_vessels(dir: &Path) {
        std::fs::write(
            dir.join("LloydsCurrentOwnership 28-Apr-2025.csv"),
            "IMO No,Vessel Name,Technical Manager\n8423154,LSC Boat V,Lloyd's Shipping Co.\n",
        )
        .unwrap();
    }

    fn cache_for(dir: &Path) -> ReferenceCache {
        ReferenceCache::new(ReferenceConfig {
            directory: dir.to_path_buf(),
            ..ReferenceConfig::default()
        })
    }

    #[test]
    fn test_loads_lazily_and_once() {
        let dir = TempDir::new().unwrap();
        write_vessels(dir.path());
        let cache = cache_for(dir.path());
        assert!(!cache.vessels_loaded());

        assert_eq!(cache.vessels().unwrap().len(), 1);
        assert!(cache.vessels_loaded());
        assert!(!cache.customers_loaded());

        // The export disappearing does not matter once loaded.
        std::fs::remove_file(dir.path().join("LloydsCurrentOwnership 28-Apr-2025.csv")).unwrap();
        assert_eq!(cache.vessels().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_dataset() {
        let dir = TempDir::new().unwrap();
        write_vessels(dir.path());
        let cache = cache_for(dir.path());

        let err = cache.customers().unwrap_err();
        assert!(matches!(
            err,
            ReconError::ReferenceDatasetMissing {
                dataset: DatasetKind::Customer,
                ..
            }
        ));
        assert!(!cache.customers_loaded());
    }

    #[test]
    fn test_static_references_report_missing() {
        let refs = StaticReferences::default().with_vessels(VesselIndex::default());
        assert!(refs.vessels().is_ok());
        assert!(matches!(
            refs.customers(),
            Err(ReconError::ReferenceDatasetMissing { .. })
        ));
    }
}
