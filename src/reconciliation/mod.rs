//! Ticket and booking reconciliation
//!
//! The pipeline runs strictly forward: normalize, filter by type, aggregate
//! per ticket, classify tickets, then net the outstanding tickets per booking
//! and classify bookings. Every stage builds a new collection from the
//! previous one.

pub mod booking;
pub mod classify;
pub mod engine;
pub mod filter;
pub mod normalize;
pub mod report;
pub mod ticket;

pub use booking::*;
pub use classify::*;
pub use engine::*;
pub use filter::*;
pub use normalize::*;
pub use report::*;
pub use ticket::*;
