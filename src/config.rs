//! Configuration for the reconciliation core and the report writer

use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::types::*;

/// Settings consumed by the normalizer and aggregators
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// Literal substituted for missing fields
    pub nil_sentinel: String,
    /// Width ticket numbers are left-padded to
    pub ticket_width: usize,
    /// Number of leading characters (carrier code) before the separator
    pub carrier_prefix_len: usize,
    /// Separator inserted after the carrier code
    pub ticket_separator: char,
    /// Decimal places billing values are quantized to
    pub amount_scale: i64,
    /// Labels recognised as sales (trimmed, ASCII case-insensitive)
    pub sale_labels: Vec<String>,
    /// Labels recognised as refunds (trimmed, ASCII case-insensitive)
    pub refund_labels: Vec<String>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            nil_sentinel: NIL_SENTINEL.to_string(),
            ticket_width: 13,
            carrier_prefix_len: 3,
            ticket_separator: '-',
            amount_scale: 2,
            sale_labels: vec!["SALE".to_string(), "SALES".to_string()],
            refund_labels: vec!["REFUND".to_string()],
        }
    }
}

impl ReconConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(input: &str) -> ReconResult<Self> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file from disk
    pub fn load(path: &Path) -> ReconResult<Self> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| ReconError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> ReconResult<()> {
        if self.nil_sentinel.trim().is_empty() {
            return Err(ReconError::Config(
                "nil_sentinel cannot be empty".to_string(),
            ));
        }

        if self.carrier_prefix_len == 0 || self.carrier_prefix_len >= self.ticket_width {
            return Err(ReconError::Config(format!(
                "carrier_prefix_len must be between 1 and ticket_width - 1, got {} (ticket_width = {})",
                self.carrier_prefix_len, self.ticket_width
            )));
        }

        if self.ticket_separator.is_alphanumeric() {
            return Err(ReconError::Config(format!(
                "ticket_separator must not be alphanumeric, got '{}'",
                self.ticket_separator
            )));
        }

        if self.amount_scale < 0 {
            return Err(ReconError::Config(format!(
                "amount_scale cannot be negative, got {}",
                self.amount_scale
            )));
        }

        if self.sale_labels.is_empty() || self.refund_labels.is_empty() {
            return Err(ReconError::Config(
                "sale_labels and refund_labels must each contain at least one label".to_string(),
            ));
        }

        for sale in &self.sale_labels {
            if self
                .refund_labels
                .iter()
                .any(|refund| refund.trim().eq_ignore_ascii_case(sale.trim()))
            {
                return Err(ReconError::Config(format!(
                    "label '{}' is listed as both a sale and a refund",
                    sale
                )));
            }
        }

        Ok(())
    }
}

/// Settings for the report writer
///
/// Passed explicitly by the caller; nothing here is read from process-wide state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory the result files are written into
    pub output_dir: PathBuf,
    /// Leading part of every generated file name
    pub file_prefix: String,
    /// `chrono` format string for the time stamp in file names
    pub timestamp_format: String,
    /// Whether to emit the normalized source result set
    pub include_source: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_prefix: "Output".to_string(),
            timestamp_format: "%Y%m%d_%H%M%S".to_string(),
            include_source: true,
        }
    }
}

impl ReportConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ReconResult<()> {
        if self.file_prefix.trim().is_empty() {
            return Err(ReconError::Config("file_prefix cannot be empty".to_string()));
        }

        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(ReconError::Config(format!(
                "invalid timestamp_format '{}'",
                self.timestamp_format
            )));
        }

        Ok(())
    }
}

/// Combined config file layout: `[recon]` and `[report]` tables
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub recon: ReconConfig,
    pub report: ReportConfig,
}

impl AppConfig {
    pub fn from_toml(input: &str) -> ReconResult<Self> {
        let config: AppConfig =
            toml::from_str(input).map_err(|e| ReconError::Config(e.to_string()))?;
        config.recon.validate()?;
        config.report.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ReconResult<Self> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| ReconError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&input)
    }
}
