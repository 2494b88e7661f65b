//! Settled / outstanding classification

use tracing::info;

use crate::traits::NetTotal;
use crate::types::*;
use crate::utils::decimal::{is_zero, sort_by_net_total};

/// Partition rows on a zero net total and sort both sides ascending
///
/// The comparison is exact; rounding, where wanted, happens before rows
/// reach this point. Rows with equal totals keep their input order.
pub fn classify<T: NetTotal>(rows: Vec<T>) -> Classified<T> {
    let (mut settled, mut outstanding): (Vec<T>, Vec<T>) =
        rows.into_iter().partition(|row| is_zero(row.net_total()));

    sort_by_net_total(&mut settled);
    sort_by_net_total(&mut outstanding);

    Classified {
        settled,
        outstanding,
    }
}

/// Classify ticket-level aggregates
pub fn classify_tickets(tickets: Vec<TicketAggregate>) -> Classified<TicketAggregate> {
    let classified = classify(tickets);
    info!(
        settled = classified.settled.len(),
        outstanding = classified.outstanding.len(),
        "classified tickets"
    );
    classified
}

/// Classify booking-level aggregates
pub fn classify_bookings(bookings: Vec<BookingAggregate>) -> Classified<BookingAggregate> {
    let classified = classify(bookings);
    info!(
        settled = classified.settled.len(),
        outstanding = classified.outstanding.len(),
        "classified bookings"
    );
    classified
}
