//! CSV report writer: one time-stamped file per result set

use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::reconciliation::{ReconciliationReport, ResultSet, ResultSetKind};
use crate::traits::*;
use crate::types::*;

/// Number of run id characters embedded in file names
const RUN_ID_LEN: usize = 8;

/// Writes the result sets of a report as CSV files
///
/// Files are named `{prefix}_{timestamp}_{run}_{result set}.csv` inside the
/// configured output directory, which is created when missing. `run` is the
/// start of the report's run id, so two runs in the same second never share
/// a file name.
///
/// Every result set is first written to a temporary file in the output
/// directory. The files only get their final names once all of them were
/// written, so a failed run leaves no partial report behind.
#[derive(Debug, Clone)]
pub struct CsvReportWriter {
    config: ReportConfig,
    written: Vec<PathBuf>,
}

impl CsvReportWriter {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            written: Vec::new(),
        }
    }

    /// Paths written by the most recent report
    pub fn written_files(&self) -> &[PathBuf] {
        &self.written
    }

    fn file_path(&self, report: &ReconciliationReport, kind: ResultSetKind) -> PathBuf {
        let timestamp = report
            .generated_at
            .format(&self.config.timestamp_format)
            .to_string();
        let run_id = report.run_id.simple().to_string();
        self.config.output_dir.join(format!(
            "{}_{}_{}_{}.csv",
            self.config.file_prefix,
            timestamp,
            &run_id[..RUN_ID_LEN],
            kind.file_stem()
        ))
    }

    fn stage_result_set(&self, result_set: &ResultSet) -> ReconResult<NamedTempFile> {
        let staged = NamedTempFile::new_in(&self.config.output_dir)?;

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(staged.as_file());
        writer
            .write_record(&result_set.headers)
            .map_err(|e| ReconError::Report(e.to_string()))?;
        for row in &result_set.rows {
            writer
                .write_record(row)
                .map_err(|e| ReconError::Report(e.to_string()))?;
        }
        writer.flush()?;
        drop(writer);

        Ok(staged)
    }

    fn persist_all(staged: Vec<(PathBuf, NamedTempFile)>) -> ReconResult<Vec<PathBuf>> {
        let mut persisted: Vec<PathBuf> = Vec::with_capacity(staged.len());
        for (path, file) in staged {
            if let Err(e) = file.persist_noclobber(&path) {
                for done in &persisted {
                    if let Err(cleanup) = std::fs::remove_file(done) {
                        warn!(
                            path = %done.display(),
                            error = %cleanup,
                            "failed to remove partial report file"
                        );
                    }
                }
                return Err(ReconError::Report(format!("{}: {}", path.display(), e.error)));
            }
            persisted.push(path);
        }
        Ok(persisted)
    }
}

impl ReportSink for CsvReportWriter {
    fn write_report(&mut self, report: &ReconciliationReport) -> ReconResult<()> {
        self.config.validate()?;
        std::fs::create_dir_all(&self.config.output_dir)?;

        let mut staged = Vec::new();
        for kind in ResultSetKind::ALL {
            if kind == ResultSetKind::NormalizedSource && !self.config.include_source {
                continue;
            }
            let file = self.stage_result_set(&report.result_set(kind))?;
            staged.push((self.file_path(report, kind), file));
        }
        let written = Self::persist_all(staged)?;

        info!(
            run_id = %report.run_id,
            files = written.len(),
            output_dir = %self.config.output_dir.display(),
            "wrote reconciliation report"
        );
        self.written = written;
        Ok(())
    }
}
