//! Transaction type filter

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::types::*;

/// Keep only SALE and REFUND records, in input order
///
/// Other types are dropped without error. The number of dropped records per
/// label is logged at debug level.
pub fn filter_reconciled(records: &[NormalizedRecord]) -> Vec<&NormalizedRecord> {
    let mut kept = Vec::with_capacity(records.len());
    let mut dropped: BTreeMap<&str, usize> = BTreeMap::new();

    for record in records {
        if record.transaction_type.is_reconciled() {
            kept.push(record);
        } else {
            *dropped.entry(record.transaction_type.label()).or_default() += 1;
        }
    }

    if !dropped.is_empty() {
        for (label, count) in &dropped {
            debug!(label = %label, count, "dropping records of unreconciled type");
        }
        info!(
            dropped = records.len() - kept.len(),
            kept = kept.len(),
            "filtered records by transaction type"
        );
    }

    kept
}
