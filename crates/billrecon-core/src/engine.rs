//! The reconciliation engine.
//!
//! For one document the engine:
//!
//! 1. resolves the vessel by IMO number or name and, when the registry row
//!    names a technical manager, checks that the billing counterpart is that
//!    manager;
//! 2. resolves the billing counterpart in the customer master data and scores
//!    the billing address against the customer's address on file;
//! 3. assembles the [`ReconciledRecord`].
//!
//! Each reference dataset is only touched when the order carries the fields
//! needed to query it.

use billrecon_model::{OrderFields, ReconciledRecord};

use crate::assemble::{RecordBuilder, summarize_customer};
use crate::cache::{ReferenceCache, ReferenceSource};
use crate::config::ReconConfig;
use crate::error::Result;
use crate::normalize::parse_order_fields;
use crate::similarity::{DEFAULT_ADDRESS_THRESHOLD, is_address_match, similarity};

/// Reconciles order fields against the reference datasets of `S`.
#[derive(Debug)]
pub struct ReconciliationEngine<S> {
    references: S,
    address_threshold: f64,
}

impl ReconciliationEngine<ReferenceCache> {
    /// Engine over datasets loaded lazily from the configured directory.
    pub fn from_config(config: &ReconConfig) -> Self {
        Self::new(ReferenceCache::new(config.reference.clone()))
            .with_address_threshold(config.matching.address_threshold)
    }
}

impl<S: ReferenceSource> ReconciliationEngine<S> {
    pub fn new(references: S) -> Self {
        Self {
            references,
            address_threshold: DEFAULT_ADDRESS_THRESHOLD,
        }
    }

    pub fn with_address_threshold(mut self, threshold: f64) -> Self {
        self.address_threshold = threshold;
        self
    }

    pub fn references(&self) -> &S {
        &self.references
    }

    pub fn address_threshold(&self) -> f64 {
        self.address_threshold
    }

    /// Parses a raw extractor payload and reconciles it.
    pub fn reconcile_payload(&self, raw: &str) -> Result<ReconciledRecord> {
        let order = parse_order_fields(raw)?;
        self.reconcile(&order)
    }

    /// Reconciles one document's fields.
    ///
    /// Fails only when a reference dataset that is needed cannot be loaded;
    /// no partial record is produced in that case.
    pub fn reconcile(&self, order: &OrderFields) -> Result<ReconciledRecord> {
        let _span = tracing::debug_span!(
            "reconcile",
            vessel_name = order.vessel_name(),
            vessel_number = order.vessel_number().as_deref(),
            billing_counterpart = order.billing_counterpart(),
        )
        .entered();

        let mut builder = RecordBuilder::new(order.clone());
        builder = self.check_vessel(order, builder)?;
        builder = self.check_customer(order, builder)?;

        let record = builder.build();
        if record.needs_review() {
            tracing::warn!(
                billing_vs_manager = record.verdict.billing_vs_manager,
                billing_address_vs_customer_address =
                    record.verdict.billing_address_vs_customer_address,
                "Document needs review"
            );
        }
        Ok(record)
    }

    fn check_vessel(&self, order: &OrderFields, builder: RecordBuilder) -> Result<RecordBuilder> {
        let number = order.vessel_number();
        let (name, number) = (order.vessel_name(), number.as_deref());
        if name.is_none() && number.is_none() {
            tracing::debug!("No vessel name or number, skipping vessel lookup");
            return Ok(builder);
        }

        let vessels = self.references.vessels()?;
        let Some(vessel) = vessels.resolve(name, number) else {
            tracing::debug!("No vessel match");
            return Ok(builder);
        };
        tracing::debug!(
            imo_number = %vessel.imo_number,
            vessel_name = %vessel.vessel_name,
            candidates = vessels.matches(name, number).len(),
            "Vessel matched"
        );

        let manager = vessel.technical_manager.trim();
        let builder = builder.with_vessel(vessel.clone());
        let Some(billing) = order.billing_counterpart() else {
            return Ok(builder);
        };
        if manager.is_empty() {
            tracing::debug!("Vessel has no technical manager on file");
            return Ok(builder);
        }

        let matched = billing.trim().to_lowercase() == manager.to_lowercase();
        tracing::debug!(matched, billing, manager, "Billing counterpart vs technical manager");
        Ok(builder.manager_verdict(matched, billing, &vessel.technical_manager))
    }

    fn check_customer(&self, order: &OrderFields, builder: RecordBuilder) -> Result<RecordBuilder> {
        let Some(billing) = order.billing_counterpart() else {
            tracing::debug!("No billing counterpart, skipping customer lookup");
            return Ok(builder);
        };

        let customers = self.references.customers()?;
        let Some(customer) = customers.resolve(Some(billing)) else {
            tracing::debug!(billing, "No customer match");
            return Ok(builder);
        };
        tracing::debug!(
            customer_code = %customer.code,
            candidates = customers.matches(billing),
            "Customer matched"
        );

        let summary = summarize_customer(customer);
        let verdict = match order.billing_address_full() {
            Some(address) if !summary.joint_address.trim().is_empty() => {
                let score = similarity(address, &summary.joint_address);
                let matched = is_address_match(score, self.address_threshold);
                tracing::debug!(
                    score,
                    threshold = self.address_threshold,
                    matched,
                    "Billing address vs customer address"
                );
                Some(matched)
            }
            _ => None,
        };

        let builder = builder.with_customer(summary);
        Ok(match verdict {
            Some(matched) => builder.address_verdict(matched),
            None => builder,
        })
    }
}
