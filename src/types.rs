//! Core types and data structures for the reconciliation pipeline

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::traits::NetTotal;

/// Default literal used in place of any missing field
pub const NIL_SENTINEL: &str = "NIL";

/// Kinds of ticketing transactions
///
/// Only [`TransactionType::Sale`] and [`TransactionType::Refund`] take part in
/// reconciliation. Everything else (credit notes, debit notes, adjustments)
/// is carried as [`TransactionType::Other`] with its trimmed label so it can
/// still be shown in the normalized source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TransactionType {
    /// A ticket sale - normally a positive billing value
    Sale,
    /// A refund against a ticket - normally a negative billing value
    Refund,
    /// Any other transaction label
    Other(String),
}

impl TransactionType {
    /// Label used for the per-type column in ticket-level result sets
    pub fn label(&self) -> &str {
        match self {
            TransactionType::Sale => "SALE",
            TransactionType::Refund => "REFUND",
            TransactionType::Other(label) => label,
        }
    }

    /// Whether records of this type are reconciled against each other
    pub fn is_reconciled(&self) -> bool {
        matches!(self, TransactionType::Sale | TransactionType::Refund)
    }
}

/// Serialized prefix for [`TransactionType::Other`] labels that would
/// otherwise read back as a different variant
const OTHER_ESCAPE: &str = "OTHER:";

impl From<TransactionType> for String {
    fn from(transaction_type: TransactionType) -> Self {
        match transaction_type {
            TransactionType::Sale => "SALE".to_string(),
            TransactionType::Refund => "REFUND".to_string(),
            TransactionType::Other(label)
                if label == "SALE" || label == "REFUND" || label.starts_with(OTHER_ESCAPE) =>
            {
                format!("{}{}", OTHER_ESCAPE, label)
            }
            TransactionType::Other(label) => label,
        }
    }
}

impl From<String> for TransactionType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "SALE" => TransactionType::Sale,
            "REFUND" => TransactionType::Refund,
            _ => match label.strip_prefix(OTHER_ESCAPE) {
                Some(escaped) => TransactionType::Other(escaped.to_string()),
                None => TransactionType::Other(label),
            },
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One raw row as handed over by a record source
///
/// Any of the four logical fields may be missing. Columns the pipeline does
/// not interpret are kept in `extra_fields`, in source column order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Raw ticket number (`TRANSACTION NUMBER`)
    pub ticket_number: Option<String>,
    /// Booking reference / PNR (`CUSTOMER REFERENCE`)
    pub booking_reference: Option<String>,
    /// Free-text transaction label (`TRANSACTION TYPE`)
    pub transaction_type: Option<String>,
    /// Signed billing amount (`BILLING VALUE`)
    pub billing_value: Option<BigDecimal>,
    /// Remaining source columns as (header, value) pairs
    pub extra_fields: Vec<(String, String)>,
}

impl TransactionRecord {
    /// Create a record with all four logical fields present
    pub fn new(
        ticket_number: impl Into<String>,
        booking_reference: impl Into<String>,
        transaction_type: impl Into<String>,
        billing_value: BigDecimal,
    ) -> Self {
        Self {
            ticket_number: Some(ticket_number.into()),
            booking_reference: Some(booking_reference.into()),
            transaction_type: Some(transaction_type.into()),
            billing_value: Some(billing_value),
            extra_fields: Vec::new(),
        }
    }

    /// Attach an uninterpreted source column
    pub fn with_extra_field(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_fields.push((header.into(), value.into()));
        self
    }
}

/// Ticket number in canonical `CCC-SSSSSSSSSS` form
///
/// Only the normalizer constructs these, so every value has already been
/// padded and split exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TicketNumber(pub(crate) String);

impl TicketNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record after normalization: every field populated, ticket number canonical
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub ticket_number: TicketNumber,
    pub booking_reference: String,
    pub transaction_type: TransactionType,
    /// Quantized to the configured amount scale; `None` when the source had no value
    pub billing_value: Option<BigDecimal>,
    pub extra_fields: Vec<(String, String)>,
}

impl NormalizedRecord {
    /// Grouping key for the ticket-level aggregation
    pub fn ticket_key(&self) -> TicketKey {
        TicketKey {
            booking_reference: self.booking_reference.clone(),
            ticket_number: self.ticket_number.clone(),
        }
    }
}

/// Identifies one ticket-level aggregate row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TicketKey {
    pub booking_reference: String,
    pub ticket_number: TicketNumber,
}

/// Identifies one booking-level aggregate row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookingKey {
    pub booking_reference: String,
}

impl From<&TicketKey> for BookingKey {
    fn from(key: &TicketKey) -> Self {
        Self {
            booking_reference: key.booking_reference.clone(),
        }
    }
}

/// Sums for one (booking reference, ticket number) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketAggregate {
    pub key: TicketKey,
    /// Summed billing value per observed transaction type
    pub amounts_by_type: BTreeMap<TransactionType, BigDecimal>,
    /// Sum of every entry in `amounts_by_type`
    pub net_total: BigDecimal,
    /// Number of source records folded into this row
    pub record_count: usize,
}

impl NetTotal for TicketAggregate {
    fn net_total(&self) -> &BigDecimal {
        &self.net_total
    }
}

/// Net position of one booking across its outstanding tickets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingAggregate {
    pub key: BookingKey,
    /// Sum of the outstanding ticket totals, rounded to the amount scale
    pub net_total: BigDecimal,
    /// Number of outstanding tickets netted into this booking
    pub ticket_count: usize,
}

impl NetTotal for BookingAggregate {
    fn net_total(&self) -> &BigDecimal {
        &self.net_total
    }
}

/// Settled / outstanding partition of aggregate rows at one level
///
/// Both sides are kept in ascending order of net total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classified<T> {
    /// Rows whose net total is zero
    pub settled: Vec<T>,
    /// Rows whose net total is non-zero
    pub outstanding: Vec<T>,
}

impl<T> Default for Classified<T> {
    fn default() -> Self {
        Self {
            settled: Vec::new(),
            outstanding: Vec::new(),
        }
    }
}

impl<T: NetTotal> Classified<T> {
    /// Sum of settled net totals
    pub fn settled_total(&self) -> BigDecimal {
        self.settled.iter().map(|row| row.net_total()).sum()
    }

    /// Sum of outstanding net totals
    pub fn outstanding_total(&self) -> BigDecimal {
        self.outstanding.iter().map(|row| row.net_total()).sum()
    }

    /// Total number of classified rows
    pub fn len(&self) -> usize {
        self.settled.len() + self.outstanding.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settled.is_empty() && self.outstanding.is_empty()
    }
}

/// Errors that can occur while running a reconciliation
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    #[error("Failed to read records from {source_name}: {message}")]
    SourceRead {
        source_name: String,
        message: String,
    },
    #[error("Report error: {0}")]
    Report(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReconError {
    /// Shorthand for a source read failure
    pub fn source_read(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        ReconError::SourceRead {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

/// Result type for reconciliation operations
pub type ReconResult<T> = Result<T, ReconError>;
