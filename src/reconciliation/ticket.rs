//! Ticket-level aggregation

use bigdecimal::BigDecimal;
use std::collections::BTreeMap;

use crate::types::*;
use crate::utils::decimal::zero;

/// Sum of every per-type column
///
/// SALE amounts are positive and REFUND amounts negative in the source data,
/// so a fully refunded ticket nets to zero.
pub fn net_total(amounts_by_type: &BTreeMap<TransactionType, BigDecimal>) -> BigDecimal {
    amounts_by_type.values().sum()
}

#[derive(Default)]
struct TicketAccumulator {
    amounts_by_type: BTreeMap<TransactionType, BigDecimal>,
    record_count: usize,
}

/// Group records by (booking reference, ticket number) and sum per type
///
/// Records without a billing value contribute nothing; a ticket whose
/// records all lack a value produces no row. Output follows key order.
pub fn aggregate_tickets<'a, I>(records: I) -> Vec<TicketAggregate>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let mut groups: BTreeMap<TicketKey, TicketAccumulator> = BTreeMap::new();

    for record in records {
        let Some(amount) = &record.billing_value else {
            continue;
        };

        let group = groups.entry(record.ticket_key()).or_default();
        *group
            .amounts_by_type
            .entry(record.transaction_type.clone())
            .or_insert_with(zero) += amount;
        group.record_count += 1;
    }

    groups
        .into_iter()
        .map(|(key, group)| TicketAggregate {
            net_total: net_total(&group.amounts_by_type),
            key,
            amounts_by_type: group.amounts_by_type,
            record_count: group.record_count,
        })
        .collect()
}
