//! The reconciled output record.

use serde::{Deserialize, Serialize};

use crate::order::OrderFields;
use crate::reference::VesselRecord;

/// Customer master data attached to a reconciled record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub customer_code: String,
    pub invoice_name: String,
    pub invoice_careof: String,
    pub joint_address: String,
}

/// Outcome of the cross-checks.
///
/// A flag is `None` when the comparison could not be made because one side
/// was empty. When the billing counterpart disagrees with the technical
/// manager both strings are kept for the reviewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchVerdict {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_vs_manager: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_counterpart: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address_vs_customer_address: Option<bool>,
}

impl MatchVerdict {
    /// True when any cross-check was evaluated and failed.
    pub fn has_mismatch(&self) -> bool {
        self.billing_vs_manager == Some(false)
            || self.billing_address_vs_customer_address == Some(false)
    }

    pub fn is_empty(&self) -> bool {
        self.billing_vs_manager.is_none() && self.billing_address_vs_customer_address.is_none()
    }
}

/// Final record produced for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRecord {
    pub from_order: OrderFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_lloyd: Option<VesselRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_customer_db: Option<CustomerSummary>,
    #[serde(rename = "match", default)]
    pub verdict: MatchVerdict,
}

impl ReconciledRecord {
    /// True when the record needs a manual look.
    pub fn needs_review(&self) -> bool {
        self.verdict.has_mismatch()
    }
}
