//! Reconciliation output: the six result sets, summary counts and the
//! integrity cross-check consumers use to sanity-check a report

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::types::*;
use crate::utils::decimal::format_amount;
use crate::utils::validation::*;

/// Header names shared with record sources and report writers
pub mod columns {
    pub const TICKET_NUMBER: &str = "TRANSACTION NUMBER";
    pub const BOOKING_REFERENCE: &str = "CUSTOMER REFERENCE";
    pub const TRANSACTION_TYPE: &str = "TRANSACTION TYPE";
    pub const BILLING_VALUE: &str = "BILLING VALUE";
    pub const TOTAL: &str = "Total";
}

/// Counts describing one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub records_read: usize,
    pub records_dropped: usize,
    pub records_without_value: usize,
    pub tickets_settled: usize,
    pub tickets_outstanding: usize,
    pub bookings_settled: usize,
    pub bookings_outstanding: usize,
}

/// Complete result of one reconciliation run
///
/// Nothing in here is mutated after the engine builds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub run_id: Uuid,
    pub generated_at: NaiveDateTime,
    /// Decimal places amounts are rendered with
    pub amount_scale: i64,
    /// Literal shown for missing values
    pub nil_sentinel: String,
    /// Every input record after normalization, in input order
    pub source: Vec<NormalizedRecord>,
    /// Every ticket aggregate, ascending by net total
    pub ticket_pivot: Vec<TicketAggregate>,
    pub tickets: Classified<TicketAggregate>,
    /// Every booking aggregate built from outstanding tickets, in key order
    pub booking_pivot: Vec<BookingAggregate>,
    pub bookings: Classified<BookingAggregate>,
    pub summary: ReconciliationSummary,
}

/// The named tables a report is rendered into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultSetKind {
    NormalizedSource,
    TicketPivot,
    SettledTickets,
    OutstandingTickets,
    SettledBookings,
    OutstandingBookings,
}

impl ResultSetKind {
    pub const ALL: [ResultSetKind; 6] = [
        ResultSetKind::NormalizedSource,
        ResultSetKind::TicketPivot,
        ResultSetKind::SettledTickets,
        ResultSetKind::OutstandingTickets,
        ResultSetKind::SettledBookings,
        ResultSetKind::OutstandingBookings,
    ];

    /// Display title, used as sheet name by spreadsheet writers
    pub fn title(&self) -> &'static str {
        match self {
            ResultSetKind::NormalizedSource => "UATP Source",
            ResultSetKind::TicketPivot => "Pivot",
            ResultSetKind::SettledTickets => "Settled Trxs",
            ResultSetKind::OutstandingTickets => "Outstanding Trxs",
            ResultSetKind::SettledBookings => "Settled PNRs",
            ResultSetKind::OutstandingBookings => "Outstanding PNRs",
        }
    }

    /// File-name friendly identifier
    pub fn file_stem(&self) -> &'static str {
        match self {
            ResultSetKind::NormalizedSource => "source",
            ResultSetKind::TicketPivot => "pivot",
            ResultSetKind::SettledTickets => "settled_tickets",
            ResultSetKind::OutstandingTickets => "outstanding_tickets",
            ResultSetKind::SettledBookings => "settled_bookings",
            ResultSetKind::OutstandingBookings => "outstanding_bookings",
        }
    }
}

/// One rendered table: headers plus string cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub kind: ResultSetKind,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReconciliationReport {
    /// Transaction types that get a column in the ticket-level tables
    ///
    /// Taken from the whole pivot so the three ticket tables share a layout.
    pub fn ticket_columns(&self) -> Vec<TransactionType> {
        self.ticket_pivot
            .iter()
            .flat_map(|ticket| ticket.amounts_by_type.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Render one result set
    pub fn result_set(&self, kind: ResultSetKind) -> ResultSet {
        let (headers, rows) = match kind {
            ResultSetKind::NormalizedSource => self.source_table(),
            ResultSetKind::TicketPivot => self.ticket_table(&self.ticket_pivot),
            ResultSetKind::SettledTickets => self.ticket_table(&self.tickets.settled),
            ResultSetKind::OutstandingTickets => self.ticket_table(&self.tickets.outstanding),
            ResultSetKind::SettledBookings => self.booking_table(&self.bookings.settled),
            ResultSetKind::OutstandingBookings => self.booking_table(&self.bookings.outstanding),
        };
        ResultSet {
            kind,
            headers,
            rows,
        }
    }

    /// Render all six result sets in their canonical order
    pub fn result_sets(&self) -> Vec<ResultSet> {
        ResultSetKind::ALL
            .iter()
            .map(|kind| self.result_set(*kind))
            .collect()
    }

    fn source_table(&self) -> (Vec<String>, Vec<Vec<String>>) {
        let mut extra_headers: Vec<&str> = Vec::new();
        for record in &self.source {
            for (header, _) in &record.extra_fields {
                if !extra_headers.contains(&header.as_str()) {
                    extra_headers.push(header);
                }
            }
        }

        let mut headers: Vec<String> = [
            columns::TICKET_NUMBER,
            columns::BOOKING_REFERENCE,
            columns::TRANSACTION_TYPE,
            columns::BILLING_VALUE,
        ]
        .iter()
        .map(|h| h.to_string())
        .collect();
        headers.extend(extra_headers.iter().map(|h| h.to_string()));

        let rows = self
            .source
            .iter()
            .map(|record| {
                let mut row = vec![
                    record.ticket_number.to_string(),
                    record.booking_reference.clone(),
                    record.transaction_type.to_string(),
                    record
                        .billing_value
                        .as_ref()
                        .map(|value| format_amount(value, self.amount_scale))
                        .unwrap_or_else(|| self.nil_sentinel.clone()),
                ];
                for header in &extra_headers {
                    let value = record
                        .extra_fields
                        .iter()
                        .find(|(h, _)| h.as_str() == *header)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_default();
                    row.push(value);
                }
                row
            })
            .collect();

        (headers, rows)
    }

    fn ticket_table(&self, tickets: &[TicketAggregate]) -> (Vec<String>, Vec<Vec<String>>) {
        let type_columns = self.ticket_columns();

        let mut headers = vec![
            columns::BOOKING_REFERENCE.to_string(),
            columns::TICKET_NUMBER.to_string(),
        ];
        headers.extend(type_columns.iter().map(|t| t.label().to_string()));
        headers.push(columns::TOTAL.to_string());

        let rows = tickets
            .iter()
            .map(|ticket| {
                let mut row = vec![
                    ticket.key.booking_reference.clone(),
                    ticket.key.ticket_number.to_string(),
                ];
                for transaction_type in &type_columns {
                    row.push(
                        ticket
                            .amounts_by_type
                            .get(transaction_type)
                            .map(|amount| format_amount(amount, self.amount_scale))
                            .unwrap_or_default(),
                    );
                }
                row.push(format_amount(&ticket.net_total, self.amount_scale));
                row
            })
            .collect();

        (headers, rows)
    }

    fn booking_table(&self, bookings: &[BookingAggregate]) -> (Vec<String>, Vec<Vec<String>>) {
        let headers = vec![
            columns::BOOKING_REFERENCE.to_string(),
            columns::TOTAL.to_string(),
        ];
        let rows = bookings
            .iter()
            .map(|booking| {
                vec![
                    booking.key.booking_reference.clone(),
                    format_amount(&booking.net_total, self.amount_scale),
                ]
            })
            .collect();
        (headers, rows)
    }

    /// Sum of billing values over SALE and REFUND source records
    pub fn reconciled_source_total(&self) -> BigDecimal {
        self.source
            .iter()
            .filter(|record| record.transaction_type.is_reconciled())
            .filter_map(|record| record.billing_value.as_ref())
            .sum()
    }

    /// Check the report against its conservation, zero-sum, netting and
    /// ordering properties
    pub fn validate_integrity(&self) -> IntegrityReport {
        let mut issues = Vec::new();

        let source_total = self.reconciled_source_total();
        let pivot_total: BigDecimal = self.ticket_pivot.iter().map(|t| &t.net_total).sum();
        let settled_ticket_total = self.tickets.settled_total();
        let outstanding_ticket_total = self.tickets.outstanding_total();
        let settled_booking_total = self.bookings.settled_total();
        let outstanding_booking_total = self.bookings.outstanding_total();

        check_equal(
            "source billing value",
            &source_total,
            "ticket pivot total",
            &pivot_total,
            &mut issues,
        );
        check_equal(
            "ticket pivot total",
            &pivot_total,
            "settled + outstanding ticket total",
            &(&settled_ticket_total + &outstanding_ticket_total),
            &mut issues,
        );

        // What is still open after both netting passes must account for every
        // amount that was not already resolved.
        let resolved = &settled_ticket_total + &settled_booking_total;
        check_equal(
            "outstanding booking total",
            &outstanding_booking_total,
            "source total minus settled",
            &(&source_total - &resolved),
            &mut issues,
        );

        check_zero_sum("settled tickets", &self.tickets.settled, &mut issues);
        check_zero_sum("settled bookings", &self.bookings.settled, &mut issues);

        check_booking_netting(
            &self.tickets.outstanding,
            &self.booking_pivot,
            self.amount_scale,
            &mut issues,
        );

        check_ordering("ticket pivot", &self.ticket_pivot, &mut issues);
        check_ordering("settled tickets", &self.tickets.settled, &mut issues);
        check_ordering("outstanding tickets", &self.tickets.outstanding, &mut issues);
        check_ordering("settled bookings", &self.bookings.settled, &mut issues);
        check_ordering("outstanding bookings", &self.bookings.outstanding, &mut issues);

        IntegrityReport {
            run_id: self.run_id,
            is_valid: issues.is_empty(),
            issues,
            source_total,
            ticket_pivot_total: pivot_total,
            settled_ticket_total,
            outstanding_ticket_total,
            settled_booking_total,
            outstanding_booking_total,
        }
    }
}

/// Result of [`ReconciliationReport::validate_integrity`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub run_id: Uuid,
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub source_total: BigDecimal,
    pub ticket_pivot_total: BigDecimal,
    pub settled_ticket_total: BigDecimal,
    pub outstanding_ticket_total: BigDecimal,
    pub settled_booking_total: BigDecimal,
    pub outstanding_booking_total: BigDecimal,
}
