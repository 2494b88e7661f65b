//! # Ticket Reconciliation
//!
//! Reconciles airline ticket sales against refunds and reports which tickets
//! and which bookings still carry a non-zero balance.
//!
//! ## Features
//!
//! - **Normalization**: canonical `CCC-SSSSSSSSSS` ticket numbers and sentinel-filled fields
//! - **Ticket netting**: per (booking reference, ticket number) sums by transaction type
//! - **Booking netting**: outstanding tickets re-netted per booking to absorb exchanges
//! - **Decimal arithmetic**: every amount is a `BigDecimal`, so totals never drift
//! - **Pluggable I/O**: trait-based record sources and report sinks, with CSV implementations
//!
//! ## Quick Start
//!
//! ```rust
//! use ticket_reconciliation::{ReconciliationEngine, TransactionRecord};
//! use bigdecimal::BigDecimal;
//!
//! let engine = ReconciliationEngine::new();
//! let report = engine.reconcile(&[
//!     TransactionRecord::new("83123456789", "ABC123", "SALES", BigDecimal::from(100)),
//!     TransactionRecord::new("83123456789", "ABC123", "REFUND", BigDecimal::from(-100)),
//! ]);
//!
//! assert_eq!(report.tickets.settled.len(), 1);
//! assert!(report.tickets.outstanding.is_empty());
//! ```

pub mod config;
pub mod io;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
