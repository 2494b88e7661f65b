//! Integration tests for ticket-reconciliation

use bigdecimal::BigDecimal;
use proptest::prelude::*;
use proptest::sample::Index;
use std::str::FromStr;
use ticket_reconciliation::{
    io::{CsvDirectorySource, CsvReportWriter},
    normalize_ticket_number,
    utils::{decimal::is_sorted_by_net_total, MemoryRecordSource, MemoryReportSink},
    ReconConfig, ReconError, ReconciliationEngine, ReconciliationReport, ReportConfig,
    ResultSetKind, TransactionRecord, TransactionType,
};

fn dec(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

fn record(ticket: &str, booking: &str, kind: &str, value: &str) -> TransactionRecord {
    TransactionRecord::new(ticket, booking, kind, dec(value))
}

fn sum_net(report: &ReconciliationReport) -> BigDecimal {
    report.ticket_pivot.iter().map(|t| &t.net_total).sum()
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// Raw ticket numbers: short, full width, already dashed, overlong or blank
fn arb_ticket() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[0-9]{1,13}",
        1 => r"[0-9]{3}-[0-9]{10}",
        1 => r"[0-9A-Z]{14,18}",
        1 => Just(String::new()),
    ]
}

/// Booking references, sometimes missing or blank
fn arb_booking() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => r"[A-Z0-9]{6}",
        1 => Just(String::new()),
        1 => Just("   ".to_string()),
    ]
}

fn arb_kind() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("SALES"),
        Just("SALE"),
        Just("REFUND"),
        Just(" refund "),
        Just("CR_NOTE"),
        Just("DB_NOTE"),
        Just(""),
    ]
    .prop_map(String::from)
}

/// Amounts with two or three decimal places, so quantization is exercised
fn arb_amount() -> impl Strategy<Value = BigDecimal> {
    (-9_999_999i64..9_999_999, 2i64..=3)
        .prop_map(|(digits, scale)| BigDecimal::new(digits.into(), scale))
}

/// A batch drawn from small ticket and booking pools, so records collide on
/// both keys. `mirrored` rows add the opposite refund on the same ticket.
fn arb_batch() -> impl Strategy<Value = Vec<TransactionRecord>> {
    let row = (
        any::<Index>(),
        any::<Index>(),
        arb_kind(),
        prop::option::weighted(0.95, arb_amount()),
        any::<bool>(),
    );
    (
        prop::collection::vec(arb_ticket(), 1..10),
        prop::collection::vec(arb_booking(), 1..5),
        prop::collection::vec(row, 0..60),
    )
        .prop_map(|(tickets, bookings, rows)| {
            let mut records = Vec::new();
            for (ticket, booking, kind, amount, mirrored) in rows {
                let ticket = ticket.get(&tickets).clone();
                let booking = booking.get(&bookings).clone();
                if mirrored {
                    if let Some(amount) = &amount {
                        records.push(TransactionRecord::new(
                            &ticket,
                            &booking,
                            "REFUND",
                            -amount.clone(),
                        ));
                    }
                }
                records.push(TransactionRecord {
                    ticket_number: Some(ticket),
                    booking_reference: Some(booking),
                    transaction_type: Some(kind),
                    billing_value: amount,
                    extra_fields: Vec::new(),
                });
            }
            records
        })
}

#[test]
fn test_fully_refunded_ticket_is_settled() {
    let report = ReconciliationEngine::new().reconcile(&[
        record("83123456789", "ABC123", "SALES", "100.00"),
        record("83123456789", "ABC123", "REFUND", "-100.00"),
    ]);

    assert_eq!(report.ticket_pivot.len(), 1);
    let ticket = &report.tickets.settled[0];
    assert_eq!(ticket.key.booking_reference, "ABC123");
    assert_eq!(ticket.key.ticket_number.as_str(), "008-3123456789");
    assert_eq!(ticket.net_total, dec("0.00"));
    assert!(report.tickets.outstanding.is_empty());
    assert!(report.bookings.is_empty());
}

#[test]
fn test_exchange_settles_at_booking_level() {
    let report = ReconciliationEngine::new().reconcile(&[
        record("1250000000001", "XYZ", "SALES", "50.00"),
        record("1250000000002", "XYZ", "REFUND", "-50.00"),
    ]);

    assert!(report.tickets.settled.is_empty());
    let totals: Vec<BigDecimal> = report
        .tickets
        .outstanding
        .iter()
        .map(|t| t.net_total.clone())
        .collect();
    assert_eq!(totals, vec![dec("-50.00"), dec("50.00")]);

    assert_eq!(report.bookings.settled.len(), 1);
    assert_eq!(report.bookings.settled[0].key.booking_reference, "XYZ");
    assert_eq!(report.bookings.settled[0].net_total, dec("0"));
    assert_eq!(report.bookings.settled[0].ticket_count, 2);
    assert!(report.bookings.outstanding.is_empty());
}

#[test]
fn test_other_types_never_reach_output() {
    let report = ReconciliationEngine::new().reconcile(&[
        record("1", "ABC", "SALES", "10.00"),
        record("2", "ABC", "CR_NOTE", "-10.00"),
    ]);

    assert_eq!(report.source.len(), 2);
    assert_eq!(report.summary.records_dropped, 1);
    assert_eq!(report.ticket_pivot.len(), 1);
    assert!(report
        .ticket_pivot
        .iter()
        .all(|t| !t.amounts_by_type.contains_key(&TransactionType::Other("CR_NOTE".into()))));

    for kind in [
        ResultSetKind::TicketPivot,
        ResultSetKind::SettledTickets,
        ResultSetKind::OutstandingTickets,
    ] {
        let set = report.result_set(kind);
        assert!(!set.headers.iter().any(|h| h == "CR_NOTE"));
        assert!(set.rows.iter().all(|row| row[1] != "000-0000000002"));
    }
    assert_eq!(report.bookings.outstanding[0].net_total, dec("10.00"));
}

#[test]
fn test_missing_booking_references_pool_under_sentinel() {
    let mut no_reference = record("1", "", "SALES", "20.00");
    no_reference.booking_reference = None;

    let report = ReconciliationEngine::new().reconcile(&[
        no_reference,
        record("2", "   ", "REFUND", "-5.00"),
        record("3", "ABC", "SALES", "1.00"),
    ]);

    let nil_rows: Vec<_> = report
        .booking_pivot
        .iter()
        .filter(|b| b.key.booking_reference == "NIL")
        .collect();
    assert_eq!(nil_rows.len(), 1);
    assert_eq!(nil_rows[0].net_total, dec("15.00"));
    assert_eq!(nil_rows[0].ticket_count, 2);
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn prop_conservation_law(batch in arb_batch()) {
        let report = ReconciliationEngine::new().reconcile(&batch);

        let source_total = report.reconciled_source_total();
        prop_assert_eq!(&source_total, &sum_net(&report));
        prop_assert_eq!(
            &source_total,
            &(report.tickets.settled_total() + report.tickets.outstanding_total())
        );
        prop_assert_eq!(
            report.tickets.outstanding_total(),
            report.bookings.settled_total() + report.bookings.outstanding_total()
        );
    }

    #[test]
    fn prop_settled_buckets_are_zero_sum(batch in arb_batch()) {
        let report = ReconciliationEngine::new().reconcile(&batch);
        let zero = BigDecimal::from(0);

        prop_assert!(report.tickets.settled.iter().all(|t| t.net_total == zero));
        prop_assert!(report.tickets.outstanding.iter().all(|t| t.net_total != zero));
        prop_assert!(report.bookings.settled.iter().all(|b| b.net_total.round(2) == zero));
    }

    #[test]
    fn prop_booking_totals_match_outstanding_tickets(batch in arb_batch()) {
        let report = ReconciliationEngine::new().reconcile(&batch);

        for booking in &report.booking_pivot {
            let expected: BigDecimal = report
                .tickets
                .outstanding
                .iter()
                .filter(|t| t.key.booking_reference == booking.key.booking_reference)
                .map(|t| &t.net_total)
                .sum();
            prop_assert_eq!(&booking.net_total, &expected.round(2));
        }
    }

    #[test]
    fn prop_every_bucket_is_ordered(batch in arb_batch()) {
        let report = ReconciliationEngine::new().reconcile(&batch);

        prop_assert!(is_sorted_by_net_total(&report.ticket_pivot));
        prop_assert!(is_sorted_by_net_total(&report.tickets.settled));
        prop_assert!(is_sorted_by_net_total(&report.tickets.outstanding));
        prop_assert!(is_sorted_by_net_total(&report.bookings.settled));
        prop_assert!(is_sorted_by_net_total(&report.bookings.outstanding));
    }

    #[test]
    fn prop_integrity_report_is_valid(batch in arb_batch()) {
        let report = ReconciliationEngine::new().reconcile(&batch);
        let integrity = report.validate_integrity();

        prop_assert!(integrity.is_valid, "issues: {:?}", integrity.issues);
        prop_assert_eq!(&integrity.source_total, &integrity.ticket_pivot_total);
    }

    #[test]
    fn prop_unreconciled_types_never_reach_the_pivot(batch in arb_batch()) {
        let report = ReconciliationEngine::new().reconcile(&batch);

        prop_assert_eq!(report.source.len(), batch.len());
        prop_assert!(report
            .ticket_pivot
            .iter()
            .flat_map(|t| t.amounts_by_type.keys())
            .all(TransactionType::is_reconciled));
    }

    #[test]
    fn prop_normalization_is_stable_on_canonical_form(raw in r"[0-9A-Za-z]{0,20}") {
        let config = ReconConfig::default();
        let once = normalize_ticket_number(&raw, &config);
        let twice = normalize_ticket_number(once.as_str(), &config);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_padding_invariant(raw in r"[0-9A-Z]{1,13}") {
        let config = ReconConfig::default();
        let normalized = normalize_ticket_number(&raw, &config);
        let digits = normalized.as_str().replace('-', "");

        prop_assert_eq!(normalized.as_str().len(), 14);
        prop_assert_eq!(&normalized.as_str()[3..4], "-");
        prop_assert_eq!(digits.len(), 13);
        prop_assert!(digits.ends_with(raw.as_str()));
        prop_assert!(digits[..13 - raw.len()].chars().all(|c| c == '0'));
    }

    #[test]
    fn prop_longer_ticket_numbers_are_not_truncated(raw in r"[0-9]{14,20}") {
        let normalized = normalize_ticket_number(&raw, &ReconConfig::default());
        prop_assert_eq!(normalized.as_str().len(), raw.len() + 1);
        prop_assert_eq!(normalized.as_str().replace('-', ""), raw);
    }
}

#[test]
fn test_integrity_report_detects_tampering() {
    let mut report = ReconciliationEngine::new().reconcile(&[
        record("1", "A", "SALES", "10.00"),
        record("2", "B", "SALES", "20.00"),
        record("3", "C", "REFUND", "-5.00"),
    ]);
    report.tickets.outstanding.reverse();

    let integrity = report.validate_integrity();
    assert!(!integrity.is_valid);
    assert!(integrity
        .issues
        .iter()
        .any(|issue| issue.contains("outstanding tickets is not sorted")));
}

#[test]
fn test_canonical_examples_are_stable() {
    let config = ReconConfig::default();
    for raw in ["1", "83123456789", "0830000000001", "99999999999999999"] {
        let once = normalize_ticket_number(raw, &config);
        let twice = normalize_ticket_number(once.as_str(), &config);
        assert_eq!(once, twice, "raw = {raw}");
    }
    assert_eq!(
        normalize_ticket_number("83123456789", &config).as_str(),
        "008-3123456789"
    );
}

#[test]
fn test_sub_cent_amounts_follow_precision_policy() {
    // Amounts are quantized to two places before summing, so a sale of
    // 10.004 and a refund of -10.00 settle.
    let report = ReconciliationEngine::new().reconcile(&[
        record("1", "A", "SALES", "10.004"),
        record("1", "A", "REFUND", "-10.00"),
    ]);
    assert_eq!(report.tickets.settled.len(), 1);
    assert_eq!(report.source[0].billing_value, Some(dec("10.00")));
}

#[test]
fn test_custom_config_changes_labels_and_sentinel() {
    let config = ReconConfig::from_toml(
        r#"
nil_sentinel = "NONE"
refund_labels = ["REFUND", "RFND"]
"#,
    )
    .unwrap();
    let mut orphan = record("1", "", "SALES", "12.00");
    orphan.booking_reference = None;

    let report = ReconciliationEngine::with_config(config).reconcile(&[
        orphan,
        record("2", "B", "SALES", "5.00"),
        record("2", "B", "rfnd", "-5.00"),
    ]);

    assert_eq!(report.tickets.settled.len(), 1);
    assert_eq!(report.bookings.outstanding[0].key.booking_reference, "NONE");
}

#[test]
fn test_failing_source_aborts_without_output() {
    let engine = ReconciliationEngine::new();
    let mut source = MemoryRecordSource::failing("uatp.xlsx", "file is truncated");
    let mut sink = MemoryReportSink::new();

    let err = engine.run(&mut source, &mut sink).unwrap_err();
    match err {
        ReconError::SourceRead {
            source_name,
            message,
        } => {
            assert_eq!(source_name, "uatp.xlsx");
            assert_eq!(message, "file is truncated");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(sink.last().is_none());
}

#[test]
fn test_csv_directory_end_to_end() {
    let input = tempfile::tempdir().unwrap();
    std::fs::write(
        input.path().join("uatp_january.csv"),
        "TRANSACTION NUMBER,CUSTOMER REFERENCE,TRANSACTION TYPE,BILLING VALUE\n\
         83123456789,ABC123,SALES,100.00\n\
         83123456789,ABC123,REFUND,-100.00\n\
         1250000000001,XYZ,SALES,50.00\n",
    )
    .unwrap();
    std::fs::write(
        input.path().join("uatp_february.csv"),
        "TRANSACTION NUMBER,CUSTOMER REFERENCE,TRANSACTION TYPE,BILLING VALUE\n\
         1250000000002,XYZ,REFUND,-50.00\n\
         1250000000003,,SALES,19.99\n\
         1250000000004,QRS,CR_NOTE,-4.00\n",
    )
    .unwrap();

    let output = input.path().join("results");
    let engine = ReconciliationEngine::new();
    let mut source = CsvDirectorySource::new(input.path());
    let mut writer = CsvReportWriter::new(ReportConfig::new(&output));

    let report = engine.run(&mut source, &mut writer).unwrap();
    assert_eq!(report.summary.records_read, 6);
    assert_eq!(report.summary.records_dropped, 1);
    assert_eq!(report.summary.tickets_settled, 1);
    assert_eq!(report.summary.tickets_outstanding, 3);
    assert_eq!(report.summary.bookings_settled, 1);
    assert_eq!(report.summary.bookings_outstanding, 1);
    assert_eq!(writer.written_files().len(), 6);

    let outstanding = writer
        .written_files()
        .iter()
        .find(|p| p.to_string_lossy().ends_with("outstanding_bookings.csv"))
        .unwrap();
    assert_eq!(
        std::fs::read_to_string(outstanding).unwrap(),
        "CUSTOMER REFERENCE,Total\nNIL,19.99\n"
    );

    // Results land in a sub-directory, so a second run reads the same records.
    let mut again = CsvDirectorySource::new(input.path());
    let second = engine.reconcile_source(&mut again).unwrap();
    assert_eq!(second.summary.records_read, 6);
}

#[test]
fn test_repeat_runs_skip_reports_written_with_a_custom_prefix() {
    let input = tempfile::tempdir().unwrap();
    std::fs::write(
        input.path().join("uatp.csv"),
        "TRANSACTION NUMBER,CUSTOMER REFERENCE,TRANSACTION TYPE,BILLING VALUE\n\
         1250000000001,XYZ,SALES,50.00\n\
         1250000000002,XYZ,REFUND,-45.00\n",
    )
    .unwrap();

    let report_config = ReportConfig {
        file_prefix: "recon".to_string(),
        ..ReportConfig::new(input.path())
    };
    let engine = ReconciliationEngine::new();

    for _ in 0..2 {
        let mut source = CsvDirectorySource::new(input.path())
            .skip_reports_with_prefix(&report_config.file_prefix);
        let mut writer = CsvReportWriter::new(report_config.clone());
        let report = engine.run(&mut source, &mut writer).unwrap();
        assert_eq!(report.summary.records_read, 2);
    }

    let reports = std::fs::read_dir(input.path())
        .unwrap()
        .filter(|entry| {
            entry
                .as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .starts_with("recon_")
        })
        .count();
    assert_eq!(reports, 12);
}

#[test]
fn test_report_serializes_to_json() {
    let report = ReconciliationEngine::new().reconcile(&[record("1", "A", "SALES", "1.50")]);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["summary"]["records_read"], 1);
    assert_eq!(json["bookings"]["outstanding"][0]["key"]["booking_reference"], "A");
}
