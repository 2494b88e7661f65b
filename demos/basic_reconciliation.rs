//! Basic reconciliation example

use bigdecimal::BigDecimal;
use std::str::FromStr;
use ticket_reconciliation::{ReconciliationEngine, ResultSetKind, TransactionRecord};

fn amount(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).expect("valid amount")
}

fn main() {
    println!("Ticket Reconciliation - Basic Example\n");

    let records = vec![
        // Sold and fully refunded
        TransactionRecord::new("83123456789", "ABC123", "SALES", amount("100.00")),
        TransactionRecord::new("83123456789", "ABC123", "REFUND", amount("-100.00")),
        // Exchange: original ticket refunded, sale recorded on the new ticket
        TransactionRecord::new("1250000000001", "XYZ789", "SALES", amount("50.00")),
        TransactionRecord::new("1250000000002", "XYZ789", "REFUND", amount("-50.00")),
        // Sale with nothing to match against
        TransactionRecord::new("1250000000003", "QRS456", "SALES", amount("320.40")),
        // Not part of the reconciliation
        TransactionRecord::new("1250000000004", "QRS456", "CR_NOTE", amount("-12.00")),
    ];

    let engine = ReconciliationEngine::new();
    let report = engine.reconcile(&records);

    for result_set in report.result_sets() {
        if result_set.kind == ResultSetKind::NormalizedSource {
            continue;
        }
        println!("== {} ==", result_set.kind.title());
        println!("  {}", result_set.headers.join(" | "));
        for row in &result_set.rows {
            println!("  {}", row.join(" | "));
        }
        println!();
    }

    let integrity = report.validate_integrity();
    println!("Integrity check passed: {}", integrity.is_valid);
    println!(
        "Outstanding after booking netting: {}",
        integrity.outstanding_booking_total
    );
}
