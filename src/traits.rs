//! Traits for the collaborators around the reconciliation core

use bigdecimal::BigDecimal;

use crate::reconciliation::ReconciliationReport;
use crate::types::*;

/// Anything that carries a net total used for classification and ordering
pub trait NetTotal {
    fn net_total(&self) -> &BigDecimal;
}

/// Supplier of raw transaction records
///
/// Implementations read spreadsheets, CSV exports, databases or simply hold
/// records in memory. A source either yields the complete record set or
/// fails; partial reads must not be returned as success.
pub trait RecordSource {
    /// Human-readable name used in logs and error messages
    fn name(&self) -> &str;

    /// Read every available record
    fn read_records(&mut self) -> ReconResult<Vec<TransactionRecord>>;
}

/// Consumer of a finished reconciliation
///
/// Sinks decide file naming, layout and formatting. They only ever receive
/// a complete report.
pub trait ReportSink {
    fn write_report(&mut self, report: &ReconciliationReport) -> ReconResult<()>;
}
