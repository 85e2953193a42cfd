//! SQL semantic validation for Rust
//!
//! This crate drives the semantic analysis core over an arena AST:
//! - Name resolution through query, WITH and recursive WITH scopes
//! - Operand type checking of calls against per-position type families
//! - Implicit coercion, inserting CAST nodes into the AST in place
//!
//! # Example
//!
//! ```ignore
//! use sqlsema::{Validator, ValidatorConfig};
//!
//! let mut validator = Validator::new(ValidatorConfig::default());
//! validator.add_table(["EMP"], emp_row_type)?;
//!
//! let ast = validator.ast_mut();
//! let ename = ast.identifier("ENAME");
//! let three = ast.literal(Literal::String("3".into()));
//! let left = ast.call("LEFT", vec![ename, three]);
//! let emp = ast.table_ref("EMP", None);
//! let query = ast.select(vec![SelectItem::expr(left)], vec![emp]);
//!
//! let row_type = validator.validate_query(query)?;
//! ```

pub mod config;
pub mod operators;
mod validator;

// Re-export the component crates
pub use sqlsema_ast as ast;
pub use sqlsema_diagnostics as diagnostics;
pub use sqlsema_types as types;

// Convenience re-exports
pub use config::ValidatorConfig;
pub use operators::{ReturnTypeRule, SqlOperator, SqlOperatorTable};
pub use sqlsema_types::{SqlType, ValidationError, ValidationResult};
pub use validator::Validator;
