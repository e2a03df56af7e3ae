//! Loan calculations for chama (group savings) lending.
//!
//! All money is `rust_decimal::Decimal`. Public entry points take a typed
//! input struct and return a [`ComputationOutput`] envelope.

pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "lending")]
pub mod lending;

#[cfg(feature = "affordability")]
pub mod affordability;

pub use error::LoanError;
pub use types::*;

/// Standard result type for all chama-loans operations
pub type LoanResult<T> = Result<T, LoanError>;
