//! SQL type system and semantic analysis core
//!
//! This crate contains the two subsystems the validator drives:
//! - Operand type checking against per-position type families, with one
//!   implicit-coercion attempt per call ([`operand`], [`coercion`])
//! - Lexical scopes for query blocks and WITH items, including the
//!   self-referencing scope of a recursive WITH item ([`semantic`])

pub mod binding;
pub mod coercion;
pub mod error;
pub mod family;
pub mod operand;
pub mod semantic;
pub mod type_system;

pub use binding::*;
pub use coercion::*;
pub use error::*;
pub use family::*;
pub use operand::*;
pub use type_system::*;

pub use sqlsema_ast::SqlTypeName;
