//! Diagnostics for SQL semantic analysis
//!
//! This crate provides the error handling infrastructure shared by the
//! validator crates: structured error codes, source spans and the
//! user-facing [`Diagnostic`] representation.

mod error;
mod error_code;
mod span;

pub use error::*;
pub use error_code::*;
pub use span::*;

/// Result type for validator operations surfaced to a host
pub type Result<T> = std::result::Result<T, SqlError>;
