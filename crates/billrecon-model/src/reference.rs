//! Rows of the reference datasets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A row of the vessel ownership registry.
///
/// Columns that are not consumed by the reconciliation are carried in
/// `attributes` (keys with `_` in place of whitespace) and flattened into the
/// serialized object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VesselRecord {
    #[serde(rename = "IMO_number")]
    pub imo_number: String,
    pub vessel_name: String,
    /// Technical manager / "care of" party. Empty when the registry has none.
    pub technical_manager: String,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

/// Invoice address components of a customer, in joint-address order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAddress {
    pub po_box: String,
    pub city: String,
    pub county: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl CustomerAddress {
    /// Components in the fixed order used to build the joint address.
    pub fn components(&self) -> [&str; 6] {
        [
            &self.po_box,
            &self.city,
            &self.county,
            &self.state,
            &self.zip_code,
            &self.country,
        ]
    }

    /// Joins every non-blank component with `", "`.
    ///
    /// Blank components are dropped entirely.
    pub fn joint(&self) -> String {
        self.components()
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A row of the customer master data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub code: String,
    pub invoice_name: String,
    pub care_of: String,
    pub address: CustomerAddress,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}
