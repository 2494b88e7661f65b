//! CSV record source
//!
//! Reads exported transaction sheets. Each file needs a header row with the
//! four columns named in [`crate::reconciliation::columns`]; any further
//! columns are carried along untouched.

use bigdecimal::BigDecimal;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::reconciliation::columns;
use crate::traits::*;
use crate::types::*;

/// Substring marking files this tool wrote itself, matched on the file name
const OUTPUT_MARKER: &str = "utput";

/// Reads every CSV file in a directory, or a single CSV file
///
/// In directory mode files are read in file-name order. Files whose name
/// contains "utput" (`Output...`, `output...`) are skipped so earlier reports
/// are never fed back in as input. Reports written under another prefix are
/// skipped too once that prefix is registered with
/// [`CsvDirectorySource::skip_reports_with_prefix`].
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    path: PathBuf,
    name: String,
    report_prefixes: Vec<String>,
}

impl CsvDirectorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self {
            path,
            name,
            report_prefixes: Vec::new(),
        }
    }

    /// Also skip files named `{prefix}_...`, as written by
    /// [`crate::io::CsvReportWriter`] with that file prefix
    pub fn skip_reports_with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.report_prefixes.push(prefix.into());
        self
    }

    /// Files that will be read, in order
    pub fn input_files(&self) -> ReconResult<Vec<PathBuf>> {
        if self.path.is_file() {
            return Ok(vec![self.path.clone()]);
        }

        let entries = std::fs::read_dir(&self.path)
            .map_err(|e| ReconError::source_read(&self.name, e.to_string()))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| ReconError::source_read(&self.name, e.to_string()))?
                .path();
            if path.is_file() && self.is_input_file(&path) {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(ReconError::source_read(
                &self.name,
                "no CSV input files found",
            ));
        }

        Ok(files)
    }

    fn is_input_file(&self, path: &Path) -> bool {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let is_report = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| {
                name.contains(OUTPUT_MARKER)
                    || self
                        .report_prefixes
                        .iter()
                        .any(|prefix| name.starts_with(&format!("{}_", prefix)))
            });
        is_csv && !is_report
    }
}

impl RecordSource for CsvDirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_records(&mut self) -> ReconResult<Vec<TransactionRecord>> {
        let mut records = Vec::new();
        for file in self.input_files()? {
            let source_name = file.display().to_string();
            let reader = std::fs::File::open(&file)
                .map_err(|e| ReconError::source_read(&source_name, e.to_string()))?;
            let mut file_records = read_csv_records(reader, &source_name)?;
            debug!(file = %source_name, records = file_records.len(), "read input file");
            records.append(&mut file_records);
        }
        Ok(records)
    }
}

/// Parse transaction records from CSV data with a header row
///
/// Blank cells become missing fields. A non-blank billing value that is not
/// a decimal number fails the whole read.
pub fn read_csv_records<R: Read>(
    reader: R,
    source_name: &str,
) -> ReconResult<Vec<TransactionRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| ReconError::source_read(source_name, e.to_string()))?
        .clone();

    let column = |name: &str| -> ReconResult<usize> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            ReconError::source_read(source_name, format!("missing column '{}'", name))
        })
    };
    let ticket_idx = column(columns::TICKET_NUMBER)?;
    let booking_idx = column(columns::BOOKING_REFERENCE)?;
    let type_idx = column(columns::TRANSACTION_TYPE)?;
    let value_idx = column(columns::BILLING_VALUE)?;
    let known = [ticket_idx, booking_idx, type_idx, value_idx];

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row = result.map_err(|e| {
            ReconError::source_read(
                source_name,
                format!("CSV parse error at row {}: {}", row_idx + 2, e),
            )
        })?;

        let cell = |idx: usize| {
            row.get(idx)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let billing_value = match cell(value_idx) {
            Some(raw) => Some(parse_amount(&raw).ok_or_else(|| {
                ReconError::source_read(
                    source_name,
                    format!(
                        "row {}: cannot parse {} '{}'",
                        row_idx + 2,
                        columns::BILLING_VALUE,
                        raw
                    ),
                )
            })?),
            None => None,
        };

        let extra_fields = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| !known.contains(idx))
            .map(|(idx, header)| {
                (
                    header.to_string(),
                    row.get(idx).unwrap_or_default().to_string(),
                )
            })
            .collect();

        records.push(TransactionRecord {
            ticket_number: cell(ticket_idx),
            booking_reference: cell(booking_idx),
            transaction_type: cell(type_idx),
            billing_value,
            extra_fields,
        });
    }

    Ok(records)
}

/// Parse a billing value, accepting thousands separators
fn parse_amount(raw: &str) -> Option<BigDecimal> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    BigDecimal::from_str(&cleaned).ok()
}
