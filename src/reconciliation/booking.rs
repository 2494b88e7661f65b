//! Booking-level netting of outstanding tickets

use bigdecimal::BigDecimal;
use std::collections::BTreeMap;

use crate::types::*;
use crate::utils::decimal::{round_amount, zero};

/// Re-group outstanding tickets by booking reference and net them
///
/// Exchanged tickets under one booking often show individual imbalances
/// that cancel out across the booking. Tickets without a booking reference
/// all share the sentinel key and are pooled into one row. Summed totals are
/// rounded to `amount_scale` decimal places. Output follows key order.
pub fn aggregate_bookings(
    outstanding_tickets: &[TicketAggregate],
    amount_scale: i64,
) -> Vec<BookingAggregate> {
    let mut groups: BTreeMap<BookingKey, (BigDecimal, usize)> = BTreeMap::new();

    for ticket in outstanding_tickets {
        let entry = groups
            .entry(BookingKey::from(&ticket.key))
            .or_insert_with(|| (zero(), 0));
        entry.0 += &ticket.net_total;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(key, (total, ticket_count))| BookingAggregate {
            key,
            net_total: round_amount(&total, amount_scale),
            ticket_count,
        })
        .collect()
}
