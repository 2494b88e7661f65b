//! Reconcile a CSV export and write the result files

use ticket_reconciliation::io::{read_csv_records, CsvReportWriter};
use ticket_reconciliation::{ReconciliationEngine, ReportConfig, ReportSink};

const EXPORT: &str = "\
TRANSACTION NUMBER,CUSTOMER REFERENCE,TRANSACTION TYPE,BILLING VALUE,AGENT
83123456789,ABC123,SALES,100.00,LHR01
83123456789,ABC123,REFUND,-100.00,LHR01
1250000000001,XYZ789,SALES,50.00,MAN02
1250000000002,XYZ789,REFUND,-50.00,MAN02
1250000000003,,SALES,75.10,MAN02
1250000000004,,DB_NOTE,5.00,MAN02
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let records = read_csv_records(EXPORT.as_bytes(), "inline export")?;
    let report = ReconciliationEngine::new().reconcile(&records);

    let output_dir = std::env::temp_dir().join("uatp-recon-demo");
    let mut writer = CsvReportWriter::new(ReportConfig::new(&output_dir));
    writer.write_report(&report)?;

    println!("Summary: {:?}", report.summary);
    for path in writer.written_files() {
        println!("Wrote {}", path.display());
    }

    Ok(())
}
