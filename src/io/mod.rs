//! File-based record sources and report writers

pub mod csv_report;
pub mod csv_source;

pub use csv_report::*;
pub use csv_source::*;
