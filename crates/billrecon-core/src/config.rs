//! Configuration file support.
//!
//! Every key is optional; a missing file section falls back to the defaults
//! the reference exports are known to use.

use std::path::{Path, PathBuf};

use billrecon_ingest::SheetSelector;
use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};
use crate::similarity::DEFAULT_ADDRESS_THRESHOLD;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconConfig {
    pub reference: ReferenceConfig,
    pub matching: MatchingConfig,
    pub intake: IntakeConfig,
}

impl ReconConfig {
    /// Parses a TOML document and validates it.
    pub fn from_toml(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ReconError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let vessel = &self.reference.vessel;
        let customer = &self.reference.customer;

        if vessel.prefix.trim().is_empty() {
            return Err(invalid("reference.vessel.prefix must not be empty"));
        }
        if customer.prefix.trim().is_empty() {
            return Err(invalid("reference.customer.prefix must not be empty"));
        }
        if vessel.manager_columns.iter().all(|c| c.trim().is_empty()) {
            return Err(invalid(
                "reference.vessel.manager_columns must name at least one column",
            ));
        }
        let threshold = self.matching.address_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(invalid(format!(
                "matching.address_threshold must be between 0 and 1, got {threshold}"
            )));
        }
        if self.intake.poll_interval_secs == 0 {
            return Err(invalid("intake.poll_interval_secs must be at least 1"));
        }
        if self.intake.extensions.is_empty() {
            return Err(invalid("intake.extensions must not be empty"));
        }
        let writes_into_intake = self.intake.output_directory.as_deref()
            == Some(self.intake.directory.as_path());
        let accepts_json = self
            .intake
            .extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case("json"));
        if writes_into_intake && accepts_json {
            return Err(invalid(
                "intake.output_directory must differ from intake.directory when json inputs are accepted",
            ));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ReconError {
    ReconError::ConfigInvalid {
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Reference datasets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReferenceConfig {
    /// Directory holding the reference exports.
    pub directory: PathBuf,
    pub vessel: VesselDatasetConfig,
    pub customer: CustomerDatasetConfig,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data"),
            vessel: VesselDatasetConfig::default(),
            customer: CustomerDatasetConfig::default(),
        }
    }
}

/// Columns of the vessel ownership registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VesselDatasetConfig {
    /// Substring a file name must contain to be picked as this dataset.
    pub prefix: String,
    pub sheet: SheetSelector,
    pub identifier_column: String,
    pub name_column: String,
    /// Candidate manager columns; the first non-blank value in this order is
    /// used for a row. Registry exports have shipped with a misspelled header,
    /// so both spellings are listed by default.
    pub manager_columns: Vec<String>,
}

impl Default for VesselDatasetConfig {
    fn default() -> Self {
        Self {
            prefix: "LloydsCurrentOwnership".to_string(),
            sheet: SheetSelector::default(),
            identifier_column: "IMO No".to_string(),
            name_column: "Vessel Name".to_string(),
            manager_columns: vec![
                "Technincal Manager - Care of".to_string(),
                "Technical Manager - Care of".to_string(),
                "Technical Manager".to_string(),
            ],
        }
    }
}

/// Columns of the customer master data export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomerDatasetConfig {
    pub prefix: String,
    pub sheet: SheetSelector,
    pub name_column: String,
    pub code_column: String,
    pub care_of_column: String,
    pub po_box_column: String,
    pub city_column: String,
    pub county_column: String,
    pub state_column: String,
    pub zip_code_column: String,
    pub country_column: String,
}

impl Default for CustomerDatasetConfig {
    fn default() -> Self {
        Self {
            prefix: "MDM Live Customers".to_string(),
            sheet: SheetSelector::default(),
            name_column: "NameInvoiceAddress".to_string(),
            code_column: "Code".to_string(),
            care_of_column: "AddressCareOf_Inv".to_string(),
            po_box_column: "AddressPOBox_Inv".to_string(),
            city_column: "AddressCity_Inv".to_string(),
            county_column: "AddressCounty_Inv".to_string(),
            state_column: "AddressState_Inv".to_string(),
            zip_code_column: "AddressZIPCode_Inv".to_string(),
            country_column: "AddressCountry_Inv".to_string(),
        }
    }
}

impl CustomerDatasetConfig {
    /// Address component columns in joint-address order.
    pub fn address_columns(&self) -> [&str; 6] {
        [
            self.po_box_column.as_str(),
            self.city_column.as_str(),
            self.county_column.as_str(),
            self.state_column.as_str(),
            self.zip_code_column.as_str(),
            self.country_column.as_str(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingConfig {
    /// Minimum similarity for a billing address to match the customer's
    /// address (inclusive).
    pub address_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            address_threshold: DEFAULT_ADDRESS_THRESHOLD,
        }
    }
}

// ---------------------------------------------------------------------------
// Intake
// ---------------------------------------------------------------------------

/// Directories used by the intake watcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntakeConfig {
    pub directory: PathBuf,
    pub processed_directory: PathBuf,
    pub failed_directory: PathBuf,
    /// Where results are written; the processed directory when unset.
    pub output_directory: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub poll_interval_secs: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("documents"),
            processed_directory: PathBuf::from("documents/processed"),
            failed_directory: PathBuf::from("documents/failed"),
            output_directory: Some(PathBuf::from("documents/results")),
            extensions: vec!["txt".to_string(), "json".to_string()],
            poll_interval_secs: 3,
        }
    }
}
