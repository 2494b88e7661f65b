//! Utility modules

pub mod decimal;
pub mod memory;
pub mod validation;

pub use memory::*;
pub use validation::*;
