//! Validation utilities for reconciliation reports
//!
//! Each check appends a human-readable issue instead of failing, so a caller
//! sees every broken property of a report at once.

use bigdecimal::BigDecimal;
use std::collections::BTreeMap;

use crate::traits::NetTotal;
use crate::types::*;
use crate::utils::decimal::{is_sorted_by_net_total, is_zero, round_amount, zero};

/// Record an issue when two totals differ
pub fn check_equal(
    left_name: &str,
    left: &BigDecimal,
    right_name: &str,
    right: &BigDecimal,
    issues: &mut Vec<String>,
) {
    if left != right {
        issues.push(format!(
            "{} ({}) does not equal {} ({})",
            left_name, left, right_name, right
        ));
    }
}

/// Record an issue for every row in a settled bucket with a non-zero total
pub fn check_zero_sum<T: NetTotal>(bucket: &str, rows: &[T], issues: &mut Vec<String>) {
    let non_zero = rows.iter().filter(|row| !is_zero(row.net_total())).count();
    if non_zero > 0 {
        issues.push(format!(
            "{} contains {} row(s) with a non-zero total",
            bucket, non_zero
        ));
    }
}

/// Record an issue when a bucket is not in ascending order of net total
pub fn check_ordering<T: NetTotal>(bucket: &str, rows: &[T], issues: &mut Vec<String>) {
    if !is_sorted_by_net_total(rows) {
        issues.push(format!("{} is not sorted ascending by total", bucket));
    }
}

/// Record an issue for every booking whose total differs from the rounded
/// sum of its outstanding tickets, or that has no booking row at all
pub fn check_booking_netting(
    outstanding_tickets: &[TicketAggregate],
    bookings: &[BookingAggregate],
    amount_scale: i64,
    issues: &mut Vec<String>,
) {
    let mut expected: BTreeMap<&str, BigDecimal> = BTreeMap::new();
    for ticket in outstanding_tickets {
        *expected
            .entry(ticket.key.booking_reference.as_str())
            .or_insert_with(zero) += &ticket.net_total;
    }

    for (reference, total) in &expected {
        let expected_total = round_amount(total, amount_scale);
        match bookings
            .iter()
            .find(|b| b.key.booking_reference == *reference)
        {
            Some(booking) if booking.net_total == expected_total => {}
            Some(booking) => issues.push(format!(
                "booking {} total {} does not match its outstanding tickets ({})",
                reference, booking.net_total, expected_total
            )),
            None => issues.push(format!(
                "booking {} has outstanding tickets but no booking row",
                reference
            )),
        }
    }

    if bookings.len() > expected.len() {
        issues.push(format!(
            "{} booking row(s) have no outstanding tickets",
            bookings.len() - expected.len()
        ));
    }
}
