//! Semantic Analysis for SQL
//!
//! This module provides name resolution for the validator:
//! - Namespaces (tables, subqueries, WITH items) and their registry
//! - The scope tree of a statement, including WITH and recursive WITH scopes
//! - Resolution paths and sinks for table lookups
//! - Name matching with configurable case sensitivity

mod namespace;
mod path;
mod resolver;
mod scope;

pub use namespace::*;
pub use path::*;
pub use resolver::*;
pub use scope::*;
