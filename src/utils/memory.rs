//! In-memory record source and report sink for testing and embedding

use crate::reconciliation::ReconciliationReport;
use crate::traits::*;
use crate::types::*;

/// Record source backed by a vector
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    name: String,
    records: Vec<TransactionRecord>,
    failure: Option<String>,
}

impl MemoryRecordSource {
    /// Create a source that yields `records`
    pub fn new(name: impl Into<String>, records: Vec<TransactionRecord>) -> Self {
        Self {
            name: name.into(),
            records,
            failure: None,
        }
    }

    /// Create a source whose every read fails with `message`
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
            failure: Some(message.into()),
        }
    }

    /// Append a record
    pub fn push(&mut self, record: TransactionRecord) {
        self.records.push(record);
    }
}

impl RecordSource for MemoryRecordSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_records(&mut self) -> ReconResult<Vec<TransactionRecord>> {
        match &self.failure {
            Some(message) => Err(ReconError::source_read(self.name.clone(), message.clone())),
            None => Ok(self.records.clone()),
        }
    }
}

/// Report sink that keeps every report it receives
#[derive(Debug, Clone, Default)]
pub struct MemoryReportSink {
    reports: Vec<ReconciliationReport>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[ReconciliationReport] {
        &self.reports
    }

    /// Most recently written report
    pub fn last(&self) -> Option<&ReconciliationReport> {
        self.reports.last()
    }

    /// Forget every stored report
    pub fn clear(&mut self) {
        self.reports.clear();
    }
}

impl ReportSink for MemoryReportSink {
    fn write_report(&mut self, report: &ReconciliationReport) -> ReconResult<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}
