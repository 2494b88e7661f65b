//! `uatp-recon` command line tool.
//!
//! Reads transaction exports, reconciles sales against refunds and writes
//! the result sets next to the input.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticket_reconciliation::io::{CsvDirectorySource, CsvReportWriter};
use ticket_reconciliation::{AppConfig, ReconciliationEngine};

#[derive(Parser)]
#[command(name = "uatp-recon")]
#[command(version, about = "Reconcile airline ticket sales against refunds", long_about = None)]
struct Cli {
    /// Directory of CSV exports, or a single CSV file
    #[arg(short, long, default_value = ".")]
    input: PathBuf,

    /// Directory the result files are written to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML file with [recon] and [report] sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Leading part of every result file name
    #[arg(long)]
    prefix: Option<String>,

    /// Do not write the normalized source result set
    #[arg(long)]
    no_source_sheet: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(output) = cli.output {
        config.report.output_dir = output;
    }
    if let Some(prefix) = cli.prefix {
        config.report.file_prefix = prefix;
    }
    if cli.no_source_sheet {
        config.report.include_source = false;
    }

    let engine = ReconciliationEngine::with_config(config.recon);
    let mut source =
        CsvDirectorySource::new(&cli.input).skip_reports_with_prefix(&config.report.file_prefix);
    let mut writer = CsvReportWriter::new(config.report);

    let report = engine
        .run(&mut source, &mut writer)
        .with_context(|| format!("reconciliation of {} aborted", cli.input.display()))?;

    let summary = &report.summary;
    println!("Run {}", report.run_id);
    println!(
        "  Records read:          {} ({} dropped by type, {} without value)",
        summary.records_read, summary.records_dropped, summary.records_without_value
    );
    println!(
        "  Tickets settled:       {}   outstanding: {}",
        summary.tickets_settled, summary.tickets_outstanding
    );
    println!(
        "  Bookings settled:      {}   outstanding: {}",
        summary.bookings_settled, summary.bookings_outstanding
    );
    println!(
        "  Outstanding total:     {}",
        report.bookings.outstanding_total()
    );
    println!("  Bookings without a reference are pooled under '{}'", report.nil_sentinel);

    let integrity = report.validate_integrity();
    if integrity.is_valid {
        println!("  Integrity check:       passed");
    } else {
        println!("  Integrity check:       FAILED");
        for issue in &integrity.issues {
            println!("    - {}", issue);
        }
    }

    for path in writer.written_files() {
        println!("  Wrote {}", path.display());
    }

    Ok(())
}
