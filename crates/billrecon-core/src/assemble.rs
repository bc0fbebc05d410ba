//! Assembly of the reconciled record.

use billrecon_model::{
    CustomerRecord, CustomerSummary, MatchVerdict, OrderFields, ReconciledRecord, VesselRecord,
};

/// Collects lookup results and verdicts for one document.
///
/// `build` drops any verdict whose reference row was never attached, so a
/// record cannot carry `billing_vs_manager` without `from_lloyd` or an
/// address verdict without `from_customer_db`.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    order: OrderFields,
    vessel: Option<VesselRecord>,
    customer: Option<CustomerSummary>,
    verdict: MatchVerdict,
}

impl RecordBuilder {
    pub fn new(order: OrderFields) -> Self {
        Self {
            order,
            vessel: None,
            customer: None,
            verdict: MatchVerdict::default(),
        }
    }

    pub fn with_vessel(mut self, vessel: VesselRecord) -> Self {
        self.vessel = Some(vessel);
        self
    }

    pub fn with_customer(mut self, customer: CustomerSummary) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Records the billing counterpart vs. technical manager verdict.
    ///
    /// On a mismatch both names are kept for the reviewer.
    pub fn manager_verdict(mut self, matched: bool, billing_counterpart: &str, manager: &str) -> Self {
        self.verdict.billing_vs_manager = Some(matched);
        if matched {
            self.verdict.billing_counterpart = None;
            self.verdict.technical_manager = None;
        } else {
            self.verdict.billing_counterpart = Some(billing_counterpart.to_string());
            self.verdict.technical_manager = Some(manager.to_string());
        }
        self
    }

    pub fn address_verdict(mut self, matched: bool) -> Self {
        self.verdict.billing_address_vs_customer_address = Some(matched);
        self
    }

    pub fn build(self) -> ReconciledRecord {
        let mut verdict = self.verdict;
        if self.vessel.is_none() {
            verdict.billing_vs_manager = None;
            verdict.billing_counterpart = None;
            verdict.technical_manager = None;
        }
        if self.customer.is_none() {
            verdict.billing_address_vs_customer_address = None;
        }

        ReconciledRecord {
            from_order: self.order,
            from_lloyd: self.vessel,
            from_customer_db: self.customer,
            verdict,
        }
    }
}

/// The `from_customer_db` view of a customer row.
pub fn summarize_customer(customer: &CustomerRecord) -> CustomerSummary {
    CustomerSummary {
        customer_code: customer.code.clone(),
        invoice_name: customer.invoice_name.clone(),
        invoice_careof: customer.care_of.clone(),
        joint_address: customer.address.joint(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billrecon_model::CustomerAddress;

    #[test]
    fn test_empty_record() {
        let record = RecordBuilder::new(OrderFields::default()).build();
        assert!(record.from_lloyd.is_none());
        assert!(record.from_customer_db.is_none());
        assert!(record.verdict.is_empty());
    }

    #[test]
    fn test_verdicts_without_reference_rows_are_dropped() {
        let record = RecordBuilder::new(OrderFields::default())
            .manager_verdict(false, "Acme", "Lloyd's")
            .address_verdict(true)
            .build();
        assert!(record.verdict.is_empty());
    }

    #[test]
    fn test_mismatch_keeps_names() {
        let record = RecordBuilder::new(OrderFields::default())
            .with_vessel(VesselRecord::default())
            .manager_verdict(false, "Acme Corp", "Lloyd's Shipping Co.")
            .build();
        assert_eq!(record.verdict.billing_vs_manager, Some(false));
        assert_eq!(record.verdict.billing_counterpart.as_deref(), Some("Acme Corp"));
        assert_eq!(
            record.verdict.technical_manager.as_deref(),
            Some("Lloyd's Shipping Co.")
        );
        assert!(record.needs_review());
    }

    #[test]
    fn test_summarize_customer() {
        let customer = CustomerRecord {
            code: "C1".to_string(),
            invoice_name: "Acme Corp".to_string(),
            care_of: "Finance".to_string(),
            address: CustomerAddress {
                city: "Oslo".to_string(),
                zip_code: "0150".to_string(),
                country: "Norway".to_string(),
                ..CustomerAddress::default()
            },
            ..CustomerRecord::default()
        };
        let summary = summarize_customer(&customer);
        assert_eq!(summary.customer_code, "C1");
        assert_eq!(summary.invoice_careof, "Finance");
        assert_eq!(summary.joint_address, "Oslo, 0150, Norway");
    }
}
