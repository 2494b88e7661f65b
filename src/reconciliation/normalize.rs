//! Record normalization: sentinel filling and canonical ticket numbers

use tracing::warn;

use crate::config::ReconConfig;
use crate::types::*;
use crate::utils::decimal::round_amount;

/// Rewrite a raw ticket number to canonical form
///
/// The raw value is left-padded with zeros to `ticket_width` characters and
/// the separator is inserted after the carrier prefix, so `0830000000001`
/// becomes `083-0000000001`. Longer values are never truncated. A blank
/// value is replaced by the sentinel first. Values that are already
/// canonical (separator at the prefix position and more than `ticket_width`
/// characters long) are returned unchanged.
pub fn normalize_ticket_number(raw: &str, config: &ReconConfig) -> TicketNumber {
    let trimmed = raw.trim();
    let value = if trimmed.is_empty() {
        config.nil_sentinel.as_str()
    } else {
        trimmed
    };

    if is_canonical(value, config) {
        return TicketNumber(value.to_string());
    }

    let len = value.chars().count();
    let mut padded = String::with_capacity(config.ticket_width.max(len) + 1);
    for _ in len..config.ticket_width {
        padded.push('0');
    }
    padded.push_str(value);

    let split_at = padded
        .char_indices()
        .nth(config.carrier_prefix_len)
        .map(|(idx, _)| idx)
        .unwrap_or(padded.len());
    padded.insert(split_at, config.ticket_separator);

    TicketNumber(padded)
}

fn is_canonical(value: &str, config: &ReconConfig) -> bool {
    let mut separators = value
        .char_indices()
        .filter(|(_, c)| *c == config.ticket_separator);
    let prefix_end = value
        .char_indices()
        .nth(config.carrier_prefix_len)
        .map(|(idx, _)| idx);

    match (separators.next(), prefix_end) {
        (Some((first, _)), Some(expected)) => {
            first == expected && value.chars().count() > config.ticket_width
        }
        _ => false,
    }
}

/// Map a free-text label to a transaction type
pub fn parse_transaction_type(label: Option<&str>, config: &ReconConfig) -> TransactionType {
    let label = match label.map(str::trim) {
        Some(label) if !label.is_empty() => label,
        _ => return TransactionType::Other(config.nil_sentinel.clone()),
    };

    let matches = |known: &[String]| {
        known
            .iter()
            .any(|k| k.trim().eq_ignore_ascii_case(label))
    };

    if matches(config.sale_labels.as_slice()) {
        TransactionType::Sale
    } else if matches(config.refund_labels.as_slice()) {
        TransactionType::Refund
    } else {
        TransactionType::Other(label.to_string())
    }
}

/// Normalize a single record
///
/// Total: every input produces an output. Missing text fields become the
/// sentinel; a missing billing value stays `None`.
pub fn normalize_record(record: &TransactionRecord, config: &ReconConfig) -> NormalizedRecord {
    let ticket_number =
        normalize_ticket_number(record.ticket_number.as_deref().unwrap_or(""), config);

    let booking_reference = match record.booking_reference.as_deref().map(str::trim) {
        Some(reference) if !reference.is_empty() => reference.to_string(),
        _ => config.nil_sentinel.clone(),
    };

    let transaction_type = parse_transaction_type(record.transaction_type.as_deref(), config);

    let billing_value = record
        .billing_value
        .as_ref()
        .map(|value| round_amount(value, config.amount_scale));

    if billing_value.is_none() {
        warn!(
            ticket = %ticket_number,
            booking = %booking_reference,
            "record has no billing value and will not contribute to any total"
        );
    }

    NormalizedRecord {
        ticket_number,
        booking_reference,
        transaction_type,
        billing_value,
        extra_fields: record.extra_fields.clone(),
    }
}

/// Normalize every record, preserving input order
pub fn normalize_records(
    records: &[TransactionRecord],
    config: &ReconConfig,
) -> Vec<NormalizedRecord> {
    records
        .iter()
        .map(|record| normalize_record(record, config))
        .collect()
}
