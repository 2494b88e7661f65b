//! Reconciliation engine that wires the pipeline stages together

use tracing::{error, info, warn};

use crate::config::ReconConfig;
use crate::reconciliation::booking::aggregate_bookings;
use crate::reconciliation::classify::{classify_bookings, classify_tickets};
use crate::reconciliation::filter::filter_reconciled;
use crate::reconciliation::normalize::normalize_records;
use crate::reconciliation::report::{ReconciliationReport, ReconciliationSummary};
use crate::reconciliation::ticket::aggregate_tickets;
use crate::traits::*;
use crate::types::*;
use crate::utils::decimal::sort_by_net_total;

/// Runs reconciliations with a fixed configuration
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    config: ReconConfig,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconciliationEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self {
            config: ReconConfig::default(),
        }
    }

    /// Create an engine with a custom configuration
    pub fn with_config(config: ReconConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// Reconcile an in-memory record set
    ///
    /// Infallible: malformed ticket numbers, unknown types and missing
    /// fields are absorbed by normalization and filtering. An empty input
    /// yields an empty report.
    pub fn reconcile(&self, records: &[TransactionRecord]) -> ReconciliationReport {
        let source = normalize_records(records, &self.config);
        let records_without_value = source
            .iter()
            .filter(|record| record.billing_value.is_none())
            .count();

        let reconciled = filter_reconciled(&source);
        let records_dropped = source.len() - reconciled.len();

        let mut ticket_pivot = aggregate_tickets(reconciled.iter().copied());
        sort_by_net_total(&mut ticket_pivot);
        let tickets = classify_tickets(ticket_pivot.clone());

        let booking_pivot = aggregate_bookings(&tickets.outstanding, self.config.amount_scale);
        let bookings = classify_bookings(booking_pivot.clone());

        let summary = ReconciliationSummary {
            records_read: source.len(),
            records_dropped,
            records_without_value,
            tickets_settled: tickets.settled.len(),
            tickets_outstanding: tickets.outstanding.len(),
            bookings_settled: bookings.settled.len(),
            bookings_outstanding: bookings.outstanding.len(),
        };

        info!(
            records = summary.records_read,
            dropped = summary.records_dropped,
            tickets = ticket_pivot.len(),
            bookings = booking_pivot.len(),
            "reconciliation complete"
        );

        ReconciliationReport {
            run_id: uuid::Uuid::new_v4(),
            generated_at: chrono::Utc::now().naive_utc(),
            amount_scale: self.config.amount_scale,
            nil_sentinel: self.config.nil_sentinel.clone(),
            source,
            ticket_pivot,
            tickets,
            booking_pivot,
            bookings,
            summary,
        }
    }

    /// Read every record from `source` and reconcile them
    ///
    /// A read failure aborts the run before any aggregation.
    pub fn reconcile_source<S>(&self, source: &mut S) -> ReconResult<ReconciliationReport>
    where
        S: RecordSource + ?Sized,
    {
        let records = source.read_records().map_err(|e| {
            error!(source = source.name(), error = %e, "failed to read records");
            e
        })?;
        info!(source = source.name(), records = records.len(), "read records");

        let report = self.reconcile(&records);

        let integrity = report.validate_integrity();
        if !integrity.is_valid {
            for issue in &integrity.issues {
                warn!(run_id = %report.run_id, "integrity check: {}", issue);
            }
        }

        Ok(report)
    }

    /// Read, reconcile and hand the finished report to `sink`
    pub fn run<S, K>(&self, source: &mut S, sink: &mut K) -> ReconResult<ReconciliationReport>
    where
        S: RecordSource + ?Sized,
        K: ReportSink + ?Sized,
    {
        let report = self.reconcile_source(source)?;
        sink.write_report(&report)?;
        Ok(report)
    }
}
